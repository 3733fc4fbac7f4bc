use crate::core::Repository;
use colored::*;

pub fn run(repo: &Repository) -> anyhow::Result<()> {
    let current = repo.current_branch()?;
    let branches = repo.branches()?;

    if !branches.contains_key(&current) {
        println!("* {} {}", current.green(), "(no commits yet)".bright_black());
    }
    for (name, id) in &branches {
        if *name == current {
            println!("* {} {}", name.green(), id.short().yellow());
        } else {
            println!("  {} {}", name, id.short().yellow());
        }
    }
    Ok(())
}
