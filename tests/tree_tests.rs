use minigit::core::{IndexEntry, CONTROL_DIR};
use minigit::{Blob, Error, Object, ObjectType, Repository, Tree};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup() -> (TempDir, Repository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path(), "master").unwrap();
    (dir, repo)
}

fn populate(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

#[test]
fn test_tree_store_and_load() {
    let (_dir, repo) = setup();
    let project = repo.path.join("project");
    populate(
        &project,
        &[
            ("file1.txt", "this is file 1"),
            ("file2.txt", "this is file 2"),
            ("nested/nested_file.txt", "nested file"),
        ],
    );

    let id = Tree::store(&repo, &project).unwrap();
    let tree = Tree::load(&repo, &id).unwrap();

    assert_eq!(tree.entries.len(), 3);
    let rows: Vec<_> = tree
        .entries
        .iter()
        .map(|e| (e.kind, e.name.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (ObjectType::Blob, "file1.txt"),
            (ObjectType::Blob, "file2.txt"),
            (ObjectType::Tree, "nested"),
        ]
    );

    let file1 = Blob::load(&repo, &tree.entries[0].id).unwrap();
    assert_eq!(file1.data, b"this is file 1");

    let nested = Tree::load(&repo, &tree.entries[2].id).unwrap();
    assert_eq!(nested.entries.len(), 1);
    assert_eq!(nested.entries[0].name, "nested_file.txt");
}

#[test]
fn test_tree_body_format() {
    let (_dir, repo) = setup();
    let project = repo.path.join("p");
    populate(&project, &[("b.txt", "b"), ("a.txt", "a")]);

    let id = Tree::store(&repo, &project).unwrap();
    let raw = Object::read(&repo, &id).unwrap();
    assert_eq!(raw.kind, ObjectType::Tree);

    let a = Object::hash_only(ObjectType::Blob, b"a");
    let b = Object::hash_only(ObjectType::Blob, b"b");
    let expected = format!("blob a.txt {}\nblob b.txt {}", a, b);
    assert_eq!(raw.body, expected.into_bytes());
}

#[test]
fn test_canonical_ordering() {
    let (_dir, repo) = setup();
    let first = repo.path.join("first");
    let second = repo.path.join("second");
    populate(&first, &[("zeta", "z"), ("alpha", "a"), ("Mid", "m"), ("sub/x", "x")]);
    populate(&second, &[("sub/x", "x"), ("Mid", "m"), ("alpha", "a"), ("zeta", "z")]);

    let first_id = Tree::store(&repo, &first).unwrap();
    let second_id = Tree::store(&repo, &second).unwrap();
    assert_eq!(first_id, second_id);

    let names: Vec<_> = Tree::load(&repo, &first_id)
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["Mid", "alpha", "sub", "zeta"]);
}

#[test]
fn test_control_directory_is_excluded() {
    let (_dir, repo) = setup();
    populate(&repo.path, &[("a.txt", "a")]);
    populate(&repo.path.join("inner"), &[(".minigit/junk", "j"), ("b.txt", "b")]);

    let id = Tree::store(&repo, &repo.path).unwrap();
    let root = Tree::load(&repo, &id).unwrap();
    assert!(root.get_entry(CONTROL_DIR).is_none());

    let inner = Tree::load(&repo, &root.get_entry("inner").unwrap().id).unwrap();
    assert!(inner.get_entry(CONTROL_DIR).is_none());
    assert!(inner.get_entry("b.txt").is_some());
}

#[test]
fn test_empty_directory_is_empty_tree() {
    let (_dir, repo) = setup();
    let empty = repo.path.join("empty");
    fs::create_dir_all(&empty).unwrap();

    let id = Tree::store(&repo, &empty).unwrap();
    assert_eq!(id, Object::hash_only(ObjectType::Tree, b""));
    assert!(Tree::load(&repo, &id).unwrap().entries.is_empty());
}

#[test]
fn test_empty_file_fails_snapshot() {
    let (_dir, repo) = setup();
    let project = repo.path.join("p");
    populate(&project, &[("ok.txt", "ok"), ("empty.txt", "")]);

    assert!(matches!(
        Tree::store(&repo, &project),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_whitespace_names_are_rejected() {
    let (_dir, repo) = setup();
    let project = repo.path.join("p");
    populate(&project, &[("has space.txt", "x")]);

    assert!(matches!(
        Tree::store(&repo, &project),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_store_requires_directory() {
    let (_dir, repo) = setup();
    populate(&repo.path, &[("file.txt", "x")]);

    assert!(matches!(
        Tree::store(&repo, &repo.path.join("file.txt")),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        Tree::store(&repo, &repo.path.join("nope")),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_corrupt_tree_body() {
    let (_dir, repo) = setup();
    let id = Object::create(&repo, ObjectType::Tree, b"blob only-two-fields").unwrap();
    assert!(matches!(Tree::load(&repo, &id), Err(Error::CorruptObject(_))));

    let bad_kind = format!("commit x {}", Object::hash_only(ObjectType::Blob, b"x"));
    let id = Object::create(&repo, ObjectType::Tree, bad_kind.as_bytes()).unwrap();
    assert!(matches!(Tree::load(&repo, &id), Err(Error::CorruptObject(_))));
}

#[test]
fn test_from_index_groups_by_prefix() {
    let (_dir, repo) = setup();
    let a = Object::create(&repo, ObjectType::Blob, b"a").unwrap();
    let b = Object::create(&repo, ObjectType::Blob, b"b").unwrap();
    let c = Object::create(&repo, ObjectType::Blob, b"c").unwrap();

    let rows = vec![
        IndexEntry {
            kind: ObjectType::Blob,
            path: "x/y/c".to_string(),
            id: c,
        },
        IndexEntry {
            kind: ObjectType::Blob,
            path: "top".to_string(),
            id: a,
        },
        IndexEntry {
            kind: ObjectType::Blob,
            path: "x/b".to_string(),
            id: b,
        },
    ];
    let root = Tree::from_index(&repo, &rows).unwrap();

    let names: Vec<_> = root.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["top", "x"]);

    let x = Tree::load(&repo, &root.get_entry("x").unwrap().id).unwrap();
    assert_eq!(x.get_entry("b").unwrap().id, b);
    let y = Tree::load(&repo, &x.get_entry("y").unwrap().id).unwrap();
    assert_eq!(y.get_entry("c").unwrap().id, c);

    let reordered: Vec<_> = rows.iter().rev().cloned().collect();
    let again = Tree::from_index(&repo, &reordered).unwrap();
    assert_eq!(again.serialize(), root.serialize());
}

#[test]
fn test_from_index_blob_replaced_by_directory() {
    let (_dir, repo) = setup();
    let a = Object::create(&repo, ObjectType::Blob, b"a").unwrap();
    let rows = vec![
        IndexEntry {
            kind: ObjectType::Blob,
            path: "name".to_string(),
            id: a,
        },
        IndexEntry {
            kind: ObjectType::Blob,
            path: "name/inner".to_string(),
            id: a,
        },
    ];

    let root = Tree::from_index(&repo, &rows).unwrap();
    assert_eq!(root.entries.len(), 1);
    assert_eq!(root.entries[0].kind, ObjectType::Tree);
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_is_detected() {
    let (_dir, repo) = setup();
    let project = repo.path.join("p");
    populate(&project, &[("sub/file.txt", "x")]);
    std::os::unix::fs::symlink(&project, project.join("sub").join("loop")).unwrap();

    assert!(matches!(
        Tree::store(&repo, &project),
        Err(Error::CyclicPath(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_followed() {
    let (_dir, repo) = setup();
    let project = repo.path.join("p");
    populate(&project, &[("real/file.txt", "x"), ("target.txt", "t")]);
    std::os::unix::fs::symlink(project.join("real"), project.join("alias")).unwrap();
    std::os::unix::fs::symlink(project.join("target.txt"), project.join("link.txt")).unwrap();

    let tree = Tree::load(&repo, &Tree::store(&repo, &project).unwrap()).unwrap();
    assert_eq!(
        tree.get_entry("alias").unwrap().id,
        tree.get_entry("real").unwrap().id
    );
    assert_eq!(
        tree.get_entry("link.txt").unwrap().id,
        tree.get_entry("target.txt").unwrap().id
    );
}

#[cfg(unix)]
#[test]
fn test_unsupported_entry_kind() {
    let (_dir, repo) = setup();
    let project = repo.path.join("p");
    populate(&project, &[("a.txt", "a")]);
    let _listener = std::os::unix::net::UnixListener::bind(project.join("sock")).unwrap();

    assert!(matches!(
        Tree::store(&repo, &project),
        Err(Error::UnsupportedEntryKind(_))
    ));
}
