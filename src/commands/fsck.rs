use crate::core::{Object, Repository};
use colored::*;

pub fn run(repo: &Repository) -> anyhow::Result<()> {
    let total = Object::list(repo)?.len();
    let corrupted = repo.fsck()?;

    for (id, error) in &corrupted {
        println!("{} {}: {}", "corrupt".red(), id, error);
    }

    if corrupted.is_empty() {
        println!("{} {} objects", "checked".green(), total);
        Ok(())
    } else {
        anyhow::bail!("{} of {} objects failed verification", corrupted.len(), total)
    }
}
