use crate::core::{Blob, Object, ObjectType, Repository};
use crate::utils::validate::validate_file;
use std::path::Path;

/// Prints a file's blob id, storing it only when `write` is set.
pub fn run(repo: Option<&Repository>, file: &Path, write: bool) -> anyhow::Result<()> {
    let id = match (write, repo) {
        (true, Some(repo)) => Blob::store(repo, file)?,
        (true, None) => anyhow::bail!("not inside a repository; cannot write objects"),
        (false, _) => {
            validate_file(file)?;
            Object::hash_only(ObjectType::Blob, &std::fs::read(file)?)
        }
    };
    println!("{}", id);
    Ok(())
}
