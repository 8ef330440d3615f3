//! `esi-typegen`: plan ESI type declarations and their namespaces.

mod cli;

use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::OsString;

#[derive(Parser)]
#[command(
    name = "esi-typegen",
    version,
    about = "Plans deduplicated, namespaced type declarations for an ESI client"
)]
struct Cli {
    #[arg(short, long, global = true, help = "Log pipeline progress at debug level")]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the type plan and write it as JSON
    Plan(cli::plan::PlanArgs),
    /// Print the namespace tree
    Tree(cli::tree::TreeArgs),
}

fn main() {
    std::process::exit(run_cli(std::env::args_os()));
}

fn run_cli<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => {
            esi_typegen_common::init_tracing(cli.verbose);
            match cli.command {
                Some(Commands::Plan(args)) => cli::plan::run(args),
                Some(Commands::Tree(args)) => cli::tree::run(args),
                None => {
                    let mut cmd = Cli::command();
                    let _ = cmd.print_help();
                    println!();
                    0
                }
            }
        }
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}
