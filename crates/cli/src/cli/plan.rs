use clap::Args;
use console::style;
use similar::{ChangeTag, TextDiff};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::common::{InputArgs, load_plan};
use crate::cli::run_command;

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write the report to this file instead of stdout"
    )]
    pub out: Option<PathBuf>,
    #[arg(
        long,
        requires = "out",
        help = "Compare with the existing --out file and fail if it is out of date"
    )]
    pub check: bool,
}

pub fn run(args: PlanArgs) -> i32 {
    run_command(|| run_inner(args))
}

fn run_inner(args: PlanArgs) -> Result<(), String> {
    let plan = load_plan(&args.input)?;
    let mut json = serde_json::to_string_pretty(&plan.report())
        .map_err(|err| format!("Failed to serialize plan: {err}"))?;
    json.push('\n');

    match args.out {
        Some(out) if args.check => {
            let existing = if out.exists() {
                esi_typegen_common::read_text(&out, "plan")?
            } else {
                String::new()
            };
            let label = out.display().to_string();
            match render_diff(&label, &existing, &json) {
                None => {
                    println!("{label} is up to date");
                    Ok(())
                }
                Some(diff) => {
                    eprint!("{diff}");
                    Err(format!("{label} is out of date; rerun without --check to update it"))
                }
            }
        }
        Some(out) => {
            esi_typegen_common::write_text(&out, &json)?;
            debug!(out = %out.display(), bytes = json.len(), "Plan written.");
            Ok(())
        }
        None => {
            print!("{json}");
            Ok(())
        }
    }
}

/// Unified diff between the current and the new report, `None` when equal.
fn render_diff(label: &str, existing: &str, new: &str) -> Option<String> {
    if existing == new {
        return None;
    }

    let diff = TextDiff::from_lines(existing, new);
    let mut output = String::new();
    output.push_str(&format!("{}\n", style(format!("--- {label} (current)")).bold()));
    output.push_str(&format!("{}\n", style(format!("+++ {label} (new)")).bold()));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let mut line = change.value().to_string();
                if change.missing_newline() {
                    line.push('\n');
                }
                let styled = match change.tag() {
                    ChangeTag::Delete => style(format!("-{line}")).red().to_string(),
                    ChangeTag::Insert => style(format!("+{line}")).green().to_string(),
                    ChangeTag::Equal => format!(" {line}"),
                };
                output.push_str(&styled);
            }
        }
    }

    Some(output)
}
