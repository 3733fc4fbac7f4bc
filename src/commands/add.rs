use crate::core::Repository;
use anyhow::Context;
use colored::*;
use std::path::PathBuf;

/// Stages each path. Relative paths are resolved against the process's
/// working directory, not the repository root.
pub fn run(repo: &Repository, files: &[PathBuf]) -> anyhow::Result<()> {
    if files.is_empty() {
        println!("{}", "Nothing specified, nothing added".yellow());
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    for file in files {
        let path = if file.is_absolute() {
            file.clone()
        } else {
            cwd.join(file)
        };
        let id = repo
            .add(&path)
            .with_context(|| format!("failed to stage {}", file.display()))?;
        println!("{} {} {}", "staged".green(), id.short().yellow(), file.display());
    }

    Ok(())
}
