use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::env;
use tfcheck_core::{Config, ValidationTarget, config::CONFIG_FILE_NAMES};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

pub fn init_command(cwd: Option<&Path>, force: bool) -> Result<()> {
    // Determine the project root
    let project_root = match cwd {
        Some(cwd) => cwd.to_path_buf(),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let project_root = project_root
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize {}", project_root.display()))?;

    let config_path = project_root.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    println!("🚀 Scanning for Terraform directories in: {}", project_root.display());

    let dirs = discover_terraform_dirs(&project_root);
    if dirs.is_empty() {
        println!("⚠️  No .tf files found; writing a config with no targets");
    }

    let targets = dirs
        .iter()
        .map(|dir| ValidationTarget::offline(dir.clone()))
        .collect();
    Config::new(targets)
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    for dir in &dirs {
        println!("   • {}", dir.display());
    }
    println!("✅ Created config: {} ({} target(s))", config_path.display(), dirs.len());
    println!("\n📌 Targets start with backend_disabled: true.");
    println!("   Set it to false for root modules whose backend should be initialized.");

    info!("Wrote {}", config_path.display());
    Ok(())
}

/// Directories under `root` containing at least one `.tf` file, relative to
/// `root` and sorted. Hidden directories (including `.terraform`) are skipped.
pub fn discover_terraform_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs = BTreeSet::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "tf") {
            continue;
        }

        let Some(parent) = path.parent() else {
            continue;
        };
        let relative = parent.strip_prefix(root).unwrap_or(parent);
        let relative = if relative.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            relative.to_path_buf()
        };

        debug!("Found Terraform directory: {}", relative.display());
        dirs.insert(relative);
    }

    dirs.into_iter().collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
