use crate::core::{Error, Object, ObjectId, ObjectType, Refs, Repository, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use std::fmt;
use tracing::info;

/// A point in history: a tree snapshot plus its parent and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: ObjectId,
    pub parent: Option<ObjectId>,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub message: String,
}

impl Commit {
    pub fn new(tree: ObjectId, parent: Option<ObjectId>, author: &str, message: &str) -> Result<Self> {
        validate_fields(author, message)?;
        Ok(Self {
            tree,
            parent,
            timestamp: Utc::now().trunc_subsecs(6),
            author: author.to_string(),
            message: message.to_string(),
        })
    }

    /// Records `tree` on the current branch and advances the branch ref.
    pub fn store(repo: &Repository, tree: ObjectId, author: &str, message: &str) -> Result<ObjectId> {
        let head_ref = Refs::head_ref(repo)?;
        let parent = Refs::read_ref(repo, &head_ref)?;

        if !Object::exists(repo, &tree) {
            return Err(Error::ObjectNotFound(tree));
        }
        if let Some(parent) = parent {
            Object::read_as(repo, &parent, ObjectType::Commit)?;
        }

        let commit = Self::new(tree, parent, author, message)?;
        let id = commit.write(repo)?;
        Refs::update_ref(repo, &head_ref, &id)?;

        info!(%id, branch = %head_ref, root = commit.is_root(), "created commit");
        Ok(id)
    }

    pub fn write(&self, repo: &Repository) -> Result<ObjectId> {
        Object::create(repo, ObjectType::Commit, &self.serialize())
    }

    pub fn load(repo: &Repository, id: &ObjectId) -> Result<Self> {
        let body = Object::read_as(repo, id, ObjectType::Commit)?;
        Self::parse(&body)
    }

    /// `Tree:`, optional `Parent:`, `Date:`, `Author:`, then `Message:` which
    /// runs to the end of the body.
    pub fn serialize(&self) -> Vec<u8> {
        let mut lines = vec![format!("Tree:{}", self.tree)];
        if let Some(parent) = &self.parent {
            lines.push(format!("Parent:{}", parent));
        }
        lines.push(format!(
            "Date:{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
        ));
        lines.push(format!("Author:{}", self.author));
        lines.push(format!("Message:{}", self.message));
        lines.join("\n").into_bytes()
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|_| Error::CorruptObject("commit body is not valid UTF-8".to_string()))?;

        let mut tree = None;
        let mut parent = None;
        let mut date = None;
        let mut author = None;
        let mut message = None;

        let mut rest = text;
        while !rest.is_empty() {
            if let Some(value) = rest.strip_prefix("Message:") {
                message = Some(value.to_string());
                break;
            }

            let (line, remainder) = rest.split_once('\n').unwrap_or((rest, ""));
            rest = remainder;

            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| Error::CorruptObject(format!("malformed commit line '{}'", line)))?;
            match key {
                "Tree" => tree = Some(parse_id(value)?),
                "Parent" => parent = Some(parse_id(value)?),
                "Date" => date = Some(value),
                "Author" => author = Some(value.to_string()),
                _ => {}
            }
        }

        let tree = tree.ok_or(Error::MissingRequiredField("Tree"))?;
        let date = date.ok_or(Error::MissingRequiredField("Date"))?;
        let author = author.ok_or(Error::MissingRequiredField("Author"))?;
        let message = message.ok_or(Error::MissingRequiredField("Message"))?;

        let timestamp = DateTime::parse_from_rfc3339(date)
            .map_err(|e| Error::CorruptObject(format!("invalid commit date '{}': {}", date, e)))?
            .with_timezone(&Utc);

        Ok(Self {
            tree,
            parent,
            timestamp,
            author,
            message,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.serialize()))
    }
}

fn parse_id(value: &str) -> Result<ObjectId> {
    ObjectId::from_hex(value.trim())
        .map_err(|_| Error::CorruptObject(format!("invalid object id '{}' in commit", value)))
}

pub(crate) fn validate_fields(author: &str, message: &str) -> Result<()> {
    if author.trim().is_empty() {
        return Err(Error::InvalidInput("author cannot be empty".to_string()));
    }
    if author.contains('\n') || author.contains('\r') {
        return Err(Error::InvalidInput("author must be a single line".to_string()));
    }
    if message.trim().is_empty() {
        return Err(Error::InvalidInput("commit message cannot be empty".to_string()));
    }
    Ok(())
}
