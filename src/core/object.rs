use crate::core::{Error, Repository, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// A SHA-256 object identifier, displayed as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != 64 {
            return Err(Error::InvalidInput(format!(
                "object id must be 64 hex characters, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::InvalidInput(format!("invalid object id '{}': {}", s, e)))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "blob" => Some(ObjectType::Blob),
            "tree" => Some(ObjectType::Tree),
            "commit" => Some(ObjectType::Commit),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `"<kind> <body_length>\0"`
pub fn make_header(obj_type: ObjectType, body: &[u8]) -> Vec<u8> {
    format!("{} {}\0", obj_type.as_str(), body.len()).into_bytes()
}

pub fn object_id(header: &[u8], body: &[u8]) -> ObjectId {
    sha256(&[header, body])
}

fn sha256(parts: &[&[u8]]) -> ObjectId {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    ObjectId(bytes)
}

/// Fan-out location of an object: `<objects>/<id[0:2]>/<id[2:]>`.
pub fn object_path(objects_dir: &Path, id: &ObjectId) -> PathBuf {
    let hex = id.to_hex();
    let (dir, file) = hex.split_at(2);
    objects_dir.join(dir).join(file)
}

/// Writes `header || body` under `id` unless the object is already present.
/// Returns whether a new file was written.
pub fn persist(objects_dir: &Path, id: &ObjectId, header: &[u8], body: &[u8]) -> Result<bool> {
    let obj_path = object_path(objects_dir, id);
    if obj_path.exists() {
        debug!(%id, "object already stored");
        return Ok(false);
    }

    if let Some(parent) = obj_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut full_content = Vec::with_capacity(header.len() + body.len());
    full_content.extend_from_slice(header);
    full_content.extend_from_slice(body);
    fs::write(&obj_path, &full_content)?;
    set_object_permissions(&obj_path)?;

    debug!(%id, size = body.len(), "stored object");
    Ok(true)
}

/// A framed object split into its kind and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub kind: ObjectType,
    pub body: Vec<u8>,
}

pub fn decode(bytes: &[u8]) -> Result<RawObject> {
    let null_pos = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::CorruptObject("no header terminator found".to_string()))?;

    let header = std::str::from_utf8(&bytes[..null_pos])
        .map_err(|_| Error::CorruptObject("header is not valid UTF-8".to_string()))?;
    let (kind, length) = header
        .split_once(' ')
        .ok_or_else(|| Error::CorruptObject(format!("malformed header '{}'", header)))?;

    let kind = ObjectType::parse(kind).ok_or_else(|| Error::UnknownObjectKind(kind.to_string()))?;

    if length.is_empty() || !length.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::CorruptObject(format!("invalid size '{}' in header", length)));
    }
    let expected_size: usize = length
        .parse()
        .map_err(|_| Error::CorruptObject(format!("invalid size '{}' in header", length)))?;

    let body = &bytes[null_pos + 1..];
    if body.len() != expected_size {
        return Err(Error::CorruptObject(format!(
            "size mismatch: header says {}, body has {}",
            expected_size,
            body.len()
        )));
    }

    Ok(RawObject {
        kind,
        body: body.to_vec(),
    })
}

pub struct Object;

impl Object {
    /// Frames, hashes and persists `content` as an object of `obj_type`.
    pub fn create(repo: &Repository, obj_type: ObjectType, content: &[u8]) -> Result<ObjectId> {
        let header = make_header(obj_type, content);
        let id = object_id(&header, content);
        persist(&repo.objects_dir(), &id, &header, content)?;
        Ok(id)
    }

    /// Computes the id `content` would have without touching the store.
    pub fn hash_only(obj_type: ObjectType, content: &[u8]) -> ObjectId {
        object_id(&make_header(obj_type, content), content)
    }

    pub fn load_raw(repo: &Repository, id: &ObjectId) -> Result<Vec<u8>> {
        let obj_path = object_path(&repo.objects_dir(), id);
        match fs::read(&obj_path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::ObjectNotFound(*id)),
            Err(e) => Err(e.into()),
        }
    }

    pub fn read(repo: &Repository, id: &ObjectId) -> Result<RawObject> {
        decode(&Self::load_raw(repo, id)?)
    }

    /// Reads an object and fails unless it has the `expected` kind.
    pub fn read_as(repo: &Repository, id: &ObjectId, expected: ObjectType) -> Result<Vec<u8>> {
        let raw = Self::read(repo, id)?;
        if raw.kind != expected {
            return Err(Error::WrongObjectKind {
                expected,
                found: raw.kind,
            });
        }
        Ok(raw.body)
    }

    pub fn exists(repo: &Repository, id: &ObjectId) -> bool {
        object_path(&repo.objects_dir(), id).is_file()
    }

    pub fn list(repo: &Repository) -> Result<Vec<ObjectId>> {
        let mut objects = Vec::new();
        let objects_dir = repo.objects_dir();

        if !objects_dir.exists() {
            return Ok(objects);
        }

        for entry in fs::read_dir(&objects_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(prefix) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if prefix.len() != 2 {
                continue;
            }
            for obj_entry in fs::read_dir(entry.path())? {
                let obj_entry = obj_entry?;
                if let Some(suffix) = obj_entry.file_name().to_str() {
                    if let Ok(id) = ObjectId::from_hex(&format!("{}{}", prefix, suffix)) {
                        objects.push(id);
                    }
                }
            }
        }

        objects.sort();
        Ok(objects)
    }

    /// Re-hashes the stored bytes and decodes the frame.
    pub fn verify(repo: &Repository, id: &ObjectId) -> Result<RawObject> {
        let bytes = Self::load_raw(repo, id)?;
        let actual = sha256(&[&bytes[..]]);
        if actual != *id {
            return Err(Error::CorruptObject(format!(
                "object {} hashes to {}",
                id, actual
            )));
        }
        decode(&bytes)
    }
}

fn set_object_permissions(obj_path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(obj_path)?.permissions();
        perms.set_mode(0o644);
        fs::set_permissions(obj_path, perms)?;
    }
    Ok(())
}
