use anyhow::Result;
use std::path::Path;

use super::load_config;

pub fn list_command(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let targets = config.resolved_targets();

    if json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    println!("📋 {} target(s):", targets.len());
    for (i, target) in targets.iter().enumerate() {
        let backend = if target.backend_disabled {
            "backend disabled"
        } else {
            "backend enabled"
        };
        match target.name {
            Some(ref name) => println!(
                "{}. {} ({}, {})",
                i + 1,
                name,
                target.dir.display(),
                backend
            ),
            None => println!("{}. {} ({})", i + 1, target.dir.display(), backend),
        }
    }

    Ok(())
}
