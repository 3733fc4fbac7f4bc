use crate::core::{Error, ObjectId, Repository, Result};
use crate::utils::fs::write_atomic;
use std::collections::BTreeMap;
use std::fs;
use tracing::info;

const HEAD_PREFIX: &str = "ref: ";

/// Branch tips under `refs/heads`.
pub struct Refs {
    pub heads: BTreeMap<String, ObjectId>,
}

impl Refs {
    pub fn load(repo: &Repository) -> Result<Self> {
        let mut refs = Refs {
            heads: BTreeMap::new(),
        };

        let heads_dir = repo.heads_dir();
        if heads_dir.exists() {
            for entry in fs::read_dir(&heads_dir)? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                if name.starts_with('.') {
                    continue;
                }
                if let Some(id) = Self::read_ref(repo, &format!("refs/heads/{}", name))? {
                    refs.heads.insert(name, id);
                }
            }
        }

        Ok(refs)
    }

    /// Follows HEAD to the ref it names, e.g. `refs/heads/master`.
    pub fn head_ref(repo: &Repository) -> Result<String> {
        let head_path = repo.head_file();
        let content = match fs::read_to_string(&head_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MissingHead(format!(
                    "{} does not exist",
                    head_path.display()
                )))
            }
            Err(e) => return Err(e.into()),
        };

        let target = content
            .trim()
            .strip_prefix(HEAD_PREFIX)
            .ok_or_else(|| Error::MissingHead(format!("HEAD is not symbolic: '{}'", content.trim())))?
            .trim();
        validate_ref_name(target)?;
        Ok(target.to_string())
    }

    pub fn current_branch(repo: &Repository) -> Result<String> {
        let head_ref = Self::head_ref(repo)?;
        head_ref
            .strip_prefix("refs/heads/")
            .map(str::to_string)
            .ok_or_else(|| Error::MissingHead(format!("HEAD points outside refs/heads: {}", head_ref)))
    }

    /// Reads a ref file; an absent or empty file means the branch is unborn.
    pub fn read_ref(repo: &Repository, name: &str) -> Result<Option<ObjectId>> {
        validate_ref_name(name)?;
        let ref_path = repo.git_dir.join(name);
        let content = match fs::read_to_string(&ref_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let hash = content.trim();
        if hash.is_empty() {
            return Ok(None);
        }
        ObjectId::from_hex(hash)
            .map(Some)
            .map_err(|_| Error::MissingHead(format!("{} does not hold a valid commit id", name)))
    }

    pub fn resolve_head(repo: &Repository) -> Result<Option<ObjectId>> {
        let head_ref = Self::head_ref(repo)?;
        Self::read_ref(repo, &head_ref)
    }

    pub fn update_ref(repo: &Repository, name: &str, id: &ObjectId) -> Result<()> {
        validate_ref_name(name)?;
        write_atomic(&repo.git_dir.join(name), id.to_hex().as_bytes())?;
        info!(reference = name, %id, "updated ref");
        Ok(())
    }

    pub fn set_head(repo: &Repository, branch: &str) -> Result<()> {
        validate_branch_name(branch)?;
        let content = format!("{}refs/heads/{}", HEAD_PREFIX, branch);
        write_atomic(&repo.head_file(), content.as_bytes())?;
        Ok(())
    }
}

pub fn validate_branch_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.chars().any(|c| c.is_whitespace() || c.is_control());
    if !valid {
        return Err(Error::InvalidInput(format!("invalid branch name '{}'", name)));
    }
    Ok(())
}

fn validate_ref_name(name: &str) -> Result<()> {
    let mut parts = name.split('/');
    let rest: Vec<&str> = match parts.next() {
        Some("refs") => parts.collect(),
        _ => Vec::new(),
    };
    let valid = !rest.is_empty()
        && rest
            .iter()
            .all(|part| !part.is_empty() && *part != "." && *part != "..");
    if !valid {
        return Err(Error::MissingHead(format!("invalid ref name '{}'", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_names() {
        assert!(validate_ref_name("refs/heads/master").is_ok());
        assert!(validate_ref_name("refs").is_err());
        assert!(validate_ref_name("refs/../HEAD").is_err());
        assert!(validate_ref_name("heads/master").is_err());
        assert!(validate_ref_name("refs//master").is_err());
    }

    #[test]
    fn branch_names() {
        assert!(validate_branch_name("master").is_ok());
        assert!(validate_branch_name("feature-1").is_ok());
        assert!(validate_branch_name("").is_err());
        assert!(validate_branch_name("a/b").is_err());
        assert!(validate_branch_name("has space").is_err());
        assert!(validate_branch_name(".hidden").is_err());
    }
}
