pub mod init;
pub mod list;
pub mod run;

pub use init::init_command;
pub use list::list_command;
pub use run::run_command;

use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tfcheck_core::{Config, config::validate_config};
use tracing::debug;

/// Load the given config file, or the nearest one above the current directory
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let cwd = env::current_dir().context("Failed to get current directory")?;
            Config::load(&cwd).context("Run `tfcheck init` to generate a config")?
        }
    };

    validate_config(&config).context("Invalid configuration")?;
    debug!("Loaded {} target(s)", config.targets.len());
    Ok(config)
}
