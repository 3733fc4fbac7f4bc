use crate::core::{Config, Repository};
use colored::*;

pub fn run(repo: &Repository, message: &str, author: Option<String>) -> anyhow::Result<()> {
    let author = match author {
        Some(author) => author,
        None => Config::load_merged(repo)?.get_author_string(),
    };

    let branch = repo.current_branch()?;
    let id = repo.commit(&author, message)?;
    let summary = message.lines().next().unwrap_or("");

    println!("[{} {}] {}", branch.cyan(), id.short().bright_yellow(), summary);
    Ok(())
}
