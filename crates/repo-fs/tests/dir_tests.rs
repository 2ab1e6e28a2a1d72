use repo_fs::{NormalizedPath, dir};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_empty_dir_is_empty() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path());
    assert!(dir::is_effectively_empty(&path).unwrap());
}

#[test]
fn test_idea_only_dir_counts_as_empty() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join(".idea")).unwrap();
    fs::write(temp.path().join(".idea/workspace.xml"), "<project/>").unwrap();

    let path = NormalizedPath::new(temp.path());
    assert!(dir::is_effectively_empty(&path).unwrap());
}

#[test]
fn test_hidden_git_dir_is_not_empty() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join(".git")).unwrap();

    let path = NormalizedPath::new(temp.path());
    assert!(!dir::is_effectively_empty(&path).unwrap());
}

#[test]
fn test_plain_file_is_not_empty() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("README.md"), "# readme").unwrap();

    let path = NormalizedPath::new(temp.path());
    assert!(!dir::is_effectively_empty(&path).unwrap());
}

#[test]
fn test_ensure_dir_creates_nested() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("a/b/c"));

    dir::ensure_dir(&path).unwrap();
    assert!(path.is_dir());

    // Idempotent
    dir::ensure_dir(&path).unwrap();
}

#[test]
fn test_remove_dir_force_deletes_tree() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("checkout");
    fs::create_dir_all(root.join(".git/objects/pack")).unwrap();
    fs::write(root.join(".git/objects/pack/pack-1.pack"), b"PACK").unwrap();
    fs::write(root.join("model.bin"), b"\0\0").unwrap();

    let path = NormalizedPath::new(&root);
    dir::remove_dir_force(&path).unwrap();
    assert!(!root.exists());
}

#[test]
fn test_remove_dir_force_handles_readonly_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("checkout");
    fs::create_dir_all(&root).unwrap();
    let file = root.join("locked.pack");
    fs::write(&file, b"PACK").unwrap();

    let mut permissions = fs::metadata(&file).unwrap().permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&file, permissions).unwrap();

    dir::remove_dir_force(&NormalizedPath::new(&root)).unwrap();
    assert!(!root.exists());
}
