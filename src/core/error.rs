use std::path::PathBuf;
use thiserror::Error;

use crate::core::object::{ObjectId, ObjectType};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Repository already exists at {}", .0.display())]
    AlreadyInitialized(PathBuf),
    #[error("Object {0} not found")]
    ObjectNotFound(ObjectId),
    #[error("Corrupt object: {0}")]
    CorruptObject(String),
    #[error("Corrupt index at line {line}: {reason}")]
    CorruptIndex { line: usize, reason: String },
    #[error("Expected {expected} object, found {found}")]
    WrongObjectKind {
        expected: ObjectType,
        found: ObjectType,
    },
    #[error("Unknown object kind: {0}")]
    UnknownObjectKind(String),
    #[error("No index file; nothing has been staged yet")]
    IndexMissing,
    #[error("Nothing staged to commit")]
    NothingStaged,
    #[error("Cannot resolve HEAD: {0}")]
    MissingHead(String),
    #[error("Commit is missing required field '{0}'")]
    MissingRequiredField(&'static str),
    #[error("Directory cycle detected at {}", .0.display())]
    CyclicPath(PathBuf),
    #[error("Unsupported filesystem entry: {}", .0.display())]
    UnsupportedEntryKind(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
