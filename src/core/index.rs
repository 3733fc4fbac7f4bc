use crate::core::{Error, ObjectId, ObjectType, Repository, Result};
use crate::utils::fs::write_atomic;
use std::fmt;
use tracing::debug;

/// One staged row: `<kind> <path> <id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub kind: ObjectType,
    pub path: String,
    pub id: ObjectId,
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.path, self.id)
    }
}

/// The staging area. Rows keep their staging order and the file is always
/// rewritten whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    pub entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the index; fails with `IndexMissing` if nothing was ever staged.
    pub fn load(repo: &Repository) -> Result<Self> {
        let index_path = repo.index_file();
        match std::fs::read_to_string(&index_path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::IndexMissing),
            Err(e) => Err(e.into()),
        }
    }

    pub fn load_or_default(repo: &Repository) -> Result<Self> {
        match Self::load(repo) {
            Err(Error::IndexMissing) => Ok(Self::new()),
            other => other,
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let corrupt = |reason: &str| Error::CorruptIndex {
                line: i + 1,
                reason: reason.to_string(),
            };

            let (kind, rest) = line.split_once(' ').ok_or_else(|| corrupt("missing fields"))?;
            let (path, id) = rest.rsplit_once(' ').ok_or_else(|| corrupt("missing fields"))?;

            let kind = match ObjectType::parse(kind) {
                Some(kind @ (ObjectType::Blob | ObjectType::Tree)) => kind,
                _ => return Err(corrupt(&format!("unexpected kind '{}'", kind))),
            };
            if path.is_empty() {
                return Err(corrupt("empty path"));
            }
            let id = ObjectId::from_hex(id).map_err(|_| corrupt("invalid object id"))?;

            entries.push(IndexEntry {
                kind,
                path: path.to_string(),
                id,
            });
        }

        Ok(Self { entries })
    }

    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}\n", entry))
            .collect()
    }

    pub fn save(&self, repo: &Repository) -> Result<()> {
        write_atomic(&repo.index_file(), self.serialize().as_bytes())?;
        debug!(entries = self.entries.len(), "saved index");
        Ok(())
    }

    pub fn add_entry(&mut self, kind: ObjectType, path: String, id: ObjectId) {
        self.entries.push(IndexEntry { kind, path, id });
    }

    /// Truncates the on-disk index to empty.
    pub fn clear(&mut self, repo: &Repository) -> Result<()> {
        self.entries.clear();
        write_atomic(&repo.index_file(), b"")?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
