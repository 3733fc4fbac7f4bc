use crate::core::{Error, Repository};
use colored::*;
use std::path::Path;

pub fn run(root: &Path, branch: &str) -> anyhow::Result<()> {
    match Repository::init(root, branch) {
        Ok(repo) => {
            println!(
                "{} {}",
                "Initialized empty repository in".green(),
                repo.git_dir.display()
            );
            Ok(())
        }
        Err(Error::AlreadyInitialized(git_dir)) => {
            println!(
                "{} {}",
                "Repository already initialized at".yellow(),
                git_dir.display()
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
