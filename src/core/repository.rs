use crate::core::refs::validate_branch_name;
use crate::core::tree::split_staged_path;
use crate::core::{
    commit, Blob, Commit, Error, History, Index, Object, ObjectId, ObjectType, Refs, Result, Tree,
    CONTROL_DIR,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_BRANCH: &str = "master";

/// A working root and its `.minigit` control directory.
#[derive(Debug, Clone)]
pub struct Repository {
    pub path: PathBuf,
    pub git_dir: PathBuf,
}

/// What `read_object` can hand back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredObject {
    Blob(Blob),
    Tree(Tree),
}

impl Repository {
    /// Creates the control directory under `path` with HEAD on `branch`.
    pub fn init<P: AsRef<Path>>(path: P, branch: &str) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            return Err(Error::InvalidInput(format!(
                "path is a file, not a directory: {}",
                path.display()
            )));
        }
        validate_branch_name(branch)?;

        fs::create_dir_all(path)?;
        let path = fs::canonicalize(path)?;
        let git_dir = path.join(CONTROL_DIR);

        if git_dir.join("HEAD").exists() {
            return Err(Error::AlreadyInitialized(git_dir));
        }

        for dir in [git_dir.join("objects"), git_dir.join("refs").join("heads")] {
            fs::create_dir_all(&dir)?;
            set_dir_permissions(&dir)?;
        }

        let repo = Repository { path, git_dir };
        Refs::set_head(&repo, branch)?;

        info!(root = %repo.path.display(), branch, "initialized repository");
        Ok(repo)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path = fs::canonicalize(path).map_err(|_| Error::NotFound(path.to_path_buf()))?;
        let git_dir = path.join(CONTROL_DIR);

        if !Self::is_valid_repo(&git_dir) {
            return Err(Error::NotFound(git_dir));
        }
        Ok(Repository { path, git_dir })
    }

    /// Opens the nearest repository at or above `start`.
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = start.as_ref();
        let start = fs::canonicalize(start).map_err(|_| Error::NotFound(start.to_path_buf()))?;

        for dir in start.ancestors() {
            if Self::is_valid_repo(&dir.join(CONTROL_DIR)) {
                return Self::open(dir);
            }
        }
        Err(Error::NotFound(start.join(CONTROL_DIR)))
    }

    fn is_valid_repo(git_dir: &Path) -> bool {
        git_dir.join("HEAD").is_file()
            && git_dir.join("objects").is_dir()
            && git_dir.join("refs").is_dir()
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.git_dir.join("objects")
    }

    pub fn refs_dir(&self) -> PathBuf {
        self.git_dir.join("refs")
    }

    pub fn heads_dir(&self) -> PathBuf {
        self.refs_dir().join("heads")
    }

    pub fn head_file(&self) -> PathBuf {
        self.git_dir.join("HEAD")
    }

    pub fn index_file(&self) -> PathBuf {
        self.git_dir.join("index")
    }

    pub fn config_file(&self) -> PathBuf {
        self.git_dir.join("config.json")
    }

    /// Stores a file or directory and appends it to the index.
    ///
    /// Relative paths are taken from the working root. Staging the root
    /// itself stages each of its top-level children.
    pub fn add<P: AsRef<Path>>(&self, path: P) -> Result<ObjectId> {
        let (full_path, relative) = self.resolve_in_worktree(path.as_ref())?;
        let mut index = Index::load_or_default(self)?;

        let metadata = match fs::metadata(&full_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(full_path))
            }
            Err(e) => return Err(e.into()),
        };

        let id = if metadata.is_dir() {
            let id = Tree::store(self, &full_path)?;
            if relative.is_empty() {
                for entry in Tree::load(self, &id)?.entries {
                    index.add_entry(entry.kind, entry.name, entry.id);
                }
            } else {
                index.add_entry(ObjectType::Tree, relative.clone(), id);
            }
            id
        } else if metadata.is_file() {
            let id = Blob::store(self, &full_path)?;
            index.add_entry(ObjectType::Blob, relative.clone(), id);
            id
        } else {
            return Err(Error::UnsupportedEntryKind(full_path));
        };

        index.save(self)?;
        debug!(path = %relative, %id, "staged");
        Ok(id)
    }

    /// Turns the staged rows into one tree, commits it on the current
    /// branch and empties the index.
    pub fn commit(&self, author: &str, message: &str) -> Result<ObjectId> {
        let mut index = Index::load(self)?;
        if index.is_empty() {
            return Err(Error::NothingStaged);
        }
        commit::validate_fields(author, message)?;

        let tree = Tree::from_index(self, &index.entries)?;
        let tree_id = tree.write(self)?;
        let commit_id = Commit::store(self, tree_id, author, message)?;

        index.clear(self)?;
        Ok(commit_id)
    }

    /// History of the current branch, newest first. The branch tip is read
    /// when this is called.
    pub fn log(&self, limit: Option<usize>) -> Result<History<'_>> {
        let tip = Refs::resolve_head(self)?;
        Ok(History::new(self, tip, limit))
    }

    pub fn read_commit(&self, id: &ObjectId) -> Result<Commit> {
        Commit::load(self, id)
    }

    /// Loads a blob or tree, deciding which from the stored header.
    pub fn read_object(&self, id: &ObjectId) -> Result<StoredObject> {
        let raw = Object::read(self, id)?;
        match raw.kind {
            ObjectType::Blob => Ok(StoredObject::Blob(Blob {
                id: *id,
                data: raw.body,
            })),
            ObjectType::Tree => Ok(StoredObject::Tree(Tree::parse(&raw.body)?)),
            other => Err(Error::UnknownObjectKind(other.to_string())),
        }
    }

    pub fn head_commit(&self) -> Result<Option<ObjectId>> {
        Refs::resolve_head(self)
    }

    pub fn current_branch(&self) -> Result<String> {
        Refs::current_branch(self)
    }

    pub fn branches(&self) -> Result<BTreeMap<String, ObjectId>> {
        Ok(Refs::load(self)?.heads)
    }

    /// Rows currently staged; empty when nothing was ever staged.
    pub fn staged(&self) -> Result<Index> {
        Index::load_or_default(self)
    }

    /// Re-hashes every stored object and returns the ones that fail.
    pub fn fsck(&self) -> Result<Vec<(ObjectId, Error)>> {
        let mut corrupted = Vec::new();
        for id in Object::list(self)? {
            if let Err(e) = Object::verify(self, &id) {
                corrupted.push((id, e));
            }
        }
        Ok(corrupted)
    }

    /// Maps `path` to an absolute path inside the working root and its
    /// `/`-separated form relative to that root. The relative form must be
    /// a path a commit can group into trees.
    fn resolve_in_worktree(&self, path: &Path) -> Result<(PathBuf, String)> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.path.join(path)
        };
        let normalized = normalize(&absolute);

        let relative = match normalized.strip_prefix(&self.path) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => {
                let canonical = fs::canonicalize(&normalized)
                    .map_err(|_| Error::NotFound(normalized.clone()))?;
                canonical
                    .strip_prefix(&self.path)
                    .map_err(|_| {
                        Error::InvalidInput(format!(
                            "{} is outside the repository at {}",
                            path.display(),
                            self.path.display()
                        ))
                    })?
                    .to_path_buf()
            }
        };

        let mut parts = Vec::new();
        for component in relative.components() {
            let part = component.as_os_str().to_str().ok_or_else(|| {
                Error::InvalidInput(format!("path is not valid UTF-8: {}", path.display()))
            })?;
            parts.push(part);
        }
        let relative = parts.join("/");
        if !relative.is_empty() {
            split_staged_path(&relative)?;
        }

        Ok((normalized, relative))
    }
}

/// Resolves `.` and `..` lexically, without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn set_dir_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_lexical() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/b/")), PathBuf::from("/a/b"));
    }
}
