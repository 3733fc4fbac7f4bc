use crate::core::{Blob, Error, IndexEntry, Object, ObjectId, ObjectType, Repository, Result, CONTROL_DIR};
use crate::utils::validate::validate_directory;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub kind: ObjectType,
    pub name: String,
    pub id: ObjectId,
}

impl fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.name, self.id)
    }
}

/// The direct children of one directory, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots `dir` recursively and returns the id of its tree object.
    pub fn store(repo: &Repository, dir: &Path) -> Result<ObjectId> {
        validate_directory(dir)?;
        let mut visited = HashSet::new();
        Self::store_dir(repo, dir, &mut visited)
    }

    fn store_dir(repo: &Repository, dir: &Path, visited: &mut HashSet<PathBuf>) -> Result<ObjectId> {
        // Holds only the directories on the current recursion stack. Any error
        // aborts the whole snapshot, so the early returns below skip the pop.
        let real_path = fs::canonicalize(dir)?;
        if !visited.insert(real_path.clone()) {
            return Err(Error::CyclicPath(dir.to_path_buf()));
        }

        let mut tree = Tree::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_str().ok_or_else(|| {
                Error::InvalidInput(format!("file name is not valid UTF-8: {}", path.display()))
            })?;
            if name == CONTROL_DIR {
                continue;
            }
            validate_entry_name(name)?;

            let metadata = match fs::metadata(path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(Error::NotFound(path.to_path_buf()))
                }
                Err(e) => return Err(e.into()),
            };

            let (kind, id) = if metadata.is_file() {
                (ObjectType::Blob, Blob::store(repo, path)?)
            } else if metadata.is_dir() {
                (ObjectType::Tree, Self::store_dir(repo, path, visited)?)
            } else {
                return Err(Error::UnsupportedEntryKind(path.to_path_buf()));
            };
            tree.entries.push(TreeEntry {
                kind,
                name: name.to_string(),
                id,
            });
        }

        visited.remove(&real_path);
        let id = tree.write(repo)?;
        debug!(dir = %dir.display(), %id, entries = tree.entries.len(), "stored tree");
        Ok(id)
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.entries
            .iter()
            .map(TreeEntry::to_string)
            .collect::<Vec<_>>()
            .join("\n")
            .into_bytes()
    }

    pub fn write(&self, repo: &Repository) -> Result<ObjectId> {
        Object::create(repo, ObjectType::Tree, &self.serialize())
    }

    /// Loads the direct children of a stored tree. Subtrees are not expanded.
    pub fn load(repo: &Repository, id: &ObjectId) -> Result<Self> {
        let body = Object::read_as(repo, id, ObjectType::Tree)?;
        Self::parse(&body)
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(body)
            .map_err(|_| Error::CorruptObject("tree body is not valid UTF-8".to_string()))?;

        let mut entries = Vec::new();
        if text.is_empty() {
            return Ok(Self { entries });
        }

        for line in text.split('\n') {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [kind, name, id] = fields[..] else {
                return Err(Error::CorruptObject(format!("malformed tree entry '{}'", line)));
            };
            let kind = match ObjectType::parse(kind) {
                Some(kind @ (ObjectType::Blob | ObjectType::Tree)) => kind,
                _ => {
                    return Err(Error::CorruptObject(format!(
                        "invalid tree entry kind '{}'",
                        kind
                    )))
                }
            };
            let id = ObjectId::from_hex(id)
                .map_err(|_| Error::CorruptObject(format!("invalid object id in tree entry '{}'", line)))?;
            entries.push(TreeEntry {
                kind,
                name: name.to_string(),
                id,
            });
        }

        Ok(Self { entries })
    }

    /// Builds the root tree for a set of staged rows. Intermediate directories
    /// are written as tree objects; the root itself is returned unwritten.
    pub fn from_index(repo: &Repository, entries: &[IndexEntry]) -> Result<Self> {
        let mut root: BTreeMap<String, Node> = BTreeMap::new();

        for entry in entries {
            let components = split_staged_path(&entry.path)?;
            insert_node(repo, &mut root, &components, entry.kind, entry.id)?;
        }

        build_tree(repo, root)
    }

    pub fn get_entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Every blob reachable from this tree, as `(path, id)` pairs.
    pub fn list_files(&self, repo: &Repository, prefix: &str) -> Result<Vec<(String, ObjectId)>> {
        let mut files = Vec::new();

        for entry in &self.entries {
            let full_path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                format!("{}/{}", prefix, entry.name)
            };

            match entry.kind {
                ObjectType::Blob => files.push((full_path, entry.id)),
                ObjectType::Tree => {
                    let subtree = Tree::load(repo, &entry.id)?;
                    files.extend(subtree.list_files(repo, &full_path)?);
                }
                ObjectType::Commit => {}
            }
        }

        Ok(files)
    }
}

enum Node {
    Leaf(ObjectType, ObjectId),
    Dir(BTreeMap<String, Node>),
}

impl Node {
    /// Opens a node up as a directory. A staged tree is expanded one level so
    /// deeper rows merge into it; a staged blob gives way to a fresh directory.
    fn into_children(self, repo: &Repository) -> Result<BTreeMap<String, Node>> {
        match self {
            Node::Dir(children) => Ok(children),
            Node::Leaf(ObjectType::Tree, id) => Ok(Tree::load(repo, &id)?
                .entries
                .into_iter()
                .map(|entry| (entry.name, Node::Leaf(entry.kind, entry.id)))
                .collect()),
            Node::Leaf(_, _) => Ok(BTreeMap::new()),
        }
    }
}

fn insert_node(
    repo: &Repository,
    dir: &mut BTreeMap<String, Node>,
    components: &[&str],
    kind: ObjectType,
    id: ObjectId,
) -> Result<()> {
    let Some((first, rest)) = components.split_first() else {
        return Ok(());
    };

    if rest.is_empty() {
        dir.insert(first.to_string(), Node::Leaf(kind, id));
        return Ok(());
    }

    let node = dir
        .remove(*first)
        .unwrap_or_else(|| Node::Dir(BTreeMap::new()));
    let mut children = node.into_children(repo)?;
    insert_node(repo, &mut children, rest, kind, id)?;
    dir.insert(first.to_string(), Node::Dir(children));
    Ok(())
}

fn build_tree(repo: &Repository, children: BTreeMap<String, Node>) -> Result<Tree> {
    let mut tree = Tree::new();
    for (name, node) in children {
        let (kind, id) = match node {
            Node::Leaf(kind, id) => (kind, id),
            Node::Dir(grandchildren) => {
                let subtree = build_tree(repo, grandchildren)?;
                (ObjectType::Tree, subtree.write(repo)?)
            }
        };
        tree.entries.push(TreeEntry { kind, name, id });
    }
    Ok(tree)
}

pub(crate) fn split_staged_path(path: &str) -> Result<Vec<&str>> {
    let components: Vec<&str> = path
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();

    if components.is_empty() {
        return Err(Error::InvalidInput(format!("staged path '{}' is empty", path)));
    }
    for part in &components {
        if *part == ".." || *part == CONTROL_DIR {
            return Err(Error::InvalidInput(format!(
                "staged path '{}' is not allowed",
                path
            )));
        }
        validate_entry_name(part)?;
    }
    Ok(components)
}

/// Tree lines are whitespace separated, so names must not contain any.
pub(crate) fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidInput(format!(
            "'{}' cannot be stored as a tree entry name",
            name
        )));
    }
    Ok(())
}
