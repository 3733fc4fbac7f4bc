use crate::core::{Commit, Object, ObjectId, ObjectType, Repository, Tree};
use std::io::Write;

/// Prints any stored object, commits included.
pub fn run(repo: &Repository, id: &str, show_type: bool) -> anyhow::Result<()> {
    let id: ObjectId = id.parse()?;
    let raw = Object::read(repo, &id)?;

    if show_type {
        println!("{}", raw.kind);
        return Ok(());
    }

    match raw.kind {
        ObjectType::Blob => {
            std::io::stdout().write_all(&raw.body)?;
        }
        ObjectType::Tree => {
            for entry in Tree::parse(&raw.body)?.entries {
                println!("{}", entry);
            }
        }
        ObjectType::Commit => {
            println!("{}", Commit::parse(&raw.body)?);
        }
    }
    Ok(())
}
