use crate::core::{Object, ObjectId, ObjectType, Repository, Result};
use crate::utils::validate::validate_file;
use std::path::Path;

/// Raw file content stored as an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub id: ObjectId,
    pub data: Vec<u8>,
}

impl Blob {
    /// Stores the content of a non-empty regular file.
    pub fn store(repo: &Repository, file_path: &Path) -> Result<ObjectId> {
        validate_file(file_path)?;
        let data = std::fs::read(file_path)?;
        Object::create(repo, ObjectType::Blob, &data)
    }

    pub fn load(repo: &Repository, id: &ObjectId) -> Result<Self> {
        let data = Object::read_as(repo, id, ObjectType::Blob)?;
        Ok(Self { id: *id, data })
    }
}
