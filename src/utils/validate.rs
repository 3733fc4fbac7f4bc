//! Path checks run before the core reads a file or lists a directory.

use crate::core::{Error, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Ensures `path` exists, is a regular file (after following symlinks),
/// is non-empty and can be opened for reading.
pub fn validate_file(path: &Path) -> Result<()> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_file() {
        return Err(Error::InvalidInput(format!(
            "not a regular file: {}",
            path.display()
        )));
    }

    let mut file = File::open(path)?;
    let mut first = [0u8; 1];
    if file.read(&mut first)? == 0 {
        return Err(Error::InvalidInput(format!("file is empty: {}", path.display())));
    }

    Ok(())
}

/// Ensures `path` exists and is a directory.
pub fn validate_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(Error::InvalidInput(format!(
            "not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}
