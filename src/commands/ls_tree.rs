use crate::core::{Error, ObjectId, ObjectType, Repository, StoredObject, Tree};
use anyhow::bail;
use colored::*;

/// Lists a tree, or the tree of a commit.
pub fn run(repo: &Repository, id: &str, recursive: bool) -> anyhow::Result<()> {
    let id: ObjectId = id.parse()?;
    let tree_id = match repo.read_commit(&id) {
        Ok(commit) => commit.tree,
        Err(Error::WrongObjectKind { .. }) => id,
        Err(e) => return Err(e.into()),
    };

    let tree = match repo.read_object(&tree_id)? {
        StoredObject::Tree(tree) => tree,
        StoredObject::Blob(_) => bail!("{} is a blob, not a tree", tree_id),
    };

    if recursive {
        for (path, blob_id) in tree.list_files(repo, "")? {
            println!("blob {} {}", blob_id, path);
        }
    } else {
        print_entries(&tree);
    }
    Ok(())
}

fn print_entries(tree: &Tree) {
    for entry in &tree.entries {
        let name = match entry.kind {
            ObjectType::Tree => format!("{}/", entry.name).blue().bold(),
            _ => entry.name.normal(),
        };
        println!("{} {} {}", entry.kind, entry.id, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Object;

    #[test]
    fn damaged_commit_error_is_not_masked() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path(), "master").unwrap();
        let id = Object::create(&repo, ObjectType::Commit, b"garbage").unwrap();

        let err = run(&repo, &id.to_string(), false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn accepts_tree_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path(), "master").unwrap();
        let id = Tree::new().write(&repo).unwrap();

        assert!(run(&repo, &id.to_string(), true).is_ok());
    }
}
