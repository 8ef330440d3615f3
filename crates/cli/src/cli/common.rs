//! Input options and plan loading shared by every command.

use clap::Args;
use std::path::PathBuf;
use tracing::debug;

use esi_typegen_core::config::CONFIG_FILENAME;
use esi_typegen_core::{ApiSpec, Overrides, TypePlan, TypegenConfig};

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    #[arg(value_name = "INPUT", help = "API description to plan (JSON, or YAML by extension)")]
    pub input: PathBuf,
    #[arg(
        long,
        value_name = "FILE",
        help = "Config file. Defaults to typegen.toml next to the input when present"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Namespace override table, replacing the configured or built-in one"
    )]
    pub namespaces: Option<PathBuf>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Name override table, replacing the configured or built-in one"
    )]
    pub names: Option<PathBuf>,
}

/// Load config, overrides and the API description, then run the planner.
pub fn load_plan(args: &InputArgs) -> Result<TypePlan, String> {
    let config = load_config(args)?;
    let namespaces = args
        .namespaces
        .as_deref()
        .or(config.overrides.namespaces.as_deref());
    let names = args.names.as_deref().or(config.overrides.names.as_deref());
    let overrides = Overrides::load(namespaces, names).map_err(|e| e.to_string())?;

    let spec = ApiSpec::load(&args.input).map_err(|e| e.to_string())?;
    debug!(
        input = %args.input.display(),
        operations = spec.operations.len(),
        definitions = spec.definitions.len(),
        "API description loaded."
    );
    TypePlan::build(&spec, &overrides, &config.namespace).map_err(|e| e.to_string())
}

fn load_config(args: &InputArgs) -> Result<TypegenConfig, String> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => {
            let Some(candidate) = args
                .input
                .parent()
                .map(|dir| dir.join(CONFIG_FILENAME))
                .filter(|path| path.is_file())
            else {
                return Ok(TypegenConfig::default());
            };
            candidate
        }
    };
    debug!(config = %path.display(), "Loading config.");
    TypegenConfig::load(&path).map_err(|e| e.to_string())
}
