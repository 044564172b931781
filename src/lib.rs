//! Shared fixtures for the workspace integration tests in `tests/`

use std::fs;
use std::path::Path;
use tfcheck_core::{CommandOutput, Config, Result, ToolCommand};

/// Fake terraform keyed on marker files in the working directory:
/// `FLAKY_INIT` fails `init` once with a transient error, `UNFORMATTED`
/// fails `fmt -check` and `BROKEN` fails `validate`.
pub fn marker_executor(command: &ToolCommand) -> Result<CommandOutput> {
    let dir = command.working_dir().unwrap_or(Path::new("."));
    let output = match command.subcommand() {
        Some("init") if dir.join("FLAKY_INIT").exists() => {
            fs::remove_file(dir.join("FLAKY_INIT"))?;
            CommandOutput::failed(1, "Error: registry service is unreachable")
        }
        Some("fmt") if dir.join("UNFORMATTED").exists() => CommandOutput::new(3, "main.tf\n", ""),
        Some("validate") if dir.join("BROKEN").exists() => {
            CommandOutput::failed(1, "Error: Reference to undeclared input variable")
        }
        _ => CommandOutput::succeeded("Success!"),
    };
    Ok(output)
}

/// Create `root/dir` with a `main.tf` and the given marker files
pub fn setup_module(root: &Path, dir: &str, markers: &[&str]) -> Result<()> {
    let dir = root.join(dir);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("main.tf"), "")?;
    for marker in markers {
        fs::write(dir.join(marker), "")?;
    }
    Ok(())
}

/// Write `json` as `root/tfcheck.json` and load it back
pub fn write_config(root: &Path, json: &str) -> Result<Config> {
    let path = root.join("tfcheck.json");
    fs::write(&path, json)?;
    Config::load_from_file(&path)
}
