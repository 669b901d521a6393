use crate::error::{Error, Result};
use crate::object::{blob_size, read_blob, read_commit};
use crate::ops::changeset::seed_commit;
use crate::ops::path::normalize_path;
use crate::ops::resolve::{file_type_at, find_entry, lookup_entry, read_tree_at};
use crate::refs::read_ref;
use crate::repo::Repo;
use crate::types::{ObjectKind, Tree, TreeEntry};

/// kind of object at `path` on `branch`
///
/// PathNotFound (or RefNotFound for a branch that does not exist yet) means
/// the path is not tracked.
pub fn file_type(repo: &Repo, branch: &str, path: &str) -> Result<ObjectKind> {
    let path = normalize_path(path)?;
    let tip = read_ref(repo, branch)?;
    file_type_at(repo, &tip, &path)
}

/// listing of the directory at `path` on `branch`
pub fn read_dir(repo: &Repo, branch: &str, path: &str) -> Result<Tree> {
    let path = normalize_path(path)?;
    let tip = read_ref(repo, branch)?;
    read_tree_at(repo, &tip, &path)
}

/// content of the file at `path` on `branch`
pub fn read_file(repo: &Repo, branch: &str, path: &str) -> Result<Vec<u8>> {
    let entry = file_entry(repo, branch, path)?;
    read_blob(repo, &entry.hash)
}

/// size in bytes of the file at `path` on `branch`
pub fn file_size(repo: &Repo, branch: &str, path: &str) -> Result<u64> {
    let entry = file_entry(repo, branch, path)?;
    blob_size(repo, &entry.hash)
}

fn file_entry(repo: &Repo, branch: &str, path: &str) -> Result<TreeEntry> {
    let path = normalize_path(path)?;
    if path.is_empty() {
        return Err(Error::IsADirectory("/".to_string()));
    }

    let tip = read_ref(repo, branch)?;
    let entry = lookup_entry(repo, &tip, &path)?;
    if entry.is_tree() {
        return Err(Error::IsADirectory(path));
    }
    Ok(entry)
}

/// was `path` captured from the working tree when `branch` was seeded
///
/// such a path missing from the tip was deleted on the branch, it is not an
/// untracked file.
pub fn was_seeded(repo: &Repo, branch: &str, path: &str) -> Result<bool> {
    let path = normalize_path(path)?;
    let seed = seed_commit(repo, branch)?;
    if path.is_empty() {
        return Ok(true);
    }
    let root = read_commit(repo, &seed)?.tree;
    Ok(find_entry(repo, &root, &path)?.is_some())
}

/// is `path` kept out of the object store
pub fn is_ignored(repo: &Repo, path: &str) -> Result<bool> {
    let path = normalize_path(path)?;
    Ok(repo.ignore().is_ignored(&path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::changeset::finalize;
    use crate::ops::edit::{mk_dir, unlink, write_file};
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_queries() {
        let (_dir, repo) = test_repo();
        write_file(&repo, "cs1", "a/b.txt", b"hello").unwrap();
        mk_dir(&repo, "cs1", "a/sub").unwrap();

        assert_eq!(file_type(&repo, "cs1", "a").unwrap(), ObjectKind::Tree);
        assert_eq!(file_type(&repo, "cs1", "/a/b.txt").unwrap(), ObjectKind::Blob);
        assert_eq!(file_type(&repo, "cs1", "").unwrap(), ObjectKind::Tree);

        let listing = read_dir(&repo, "cs1", "a").unwrap();
        let names: Vec<_> = listing.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "sub"]);

        assert_eq!(read_file(&repo, "cs1", "a/b.txt").unwrap(), b"hello");
        assert_eq!(file_size(&repo, "cs1", "a/b.txt").unwrap(), 5);
    }

    #[test]
    fn test_untracked_paths_are_not_found() {
        let (_dir, repo) = test_repo();

        // no branch yet
        assert!(file_type(&repo, "cs1", "x").unwrap_err().is_not_found());

        write_file(&repo, "cs1", "a", b"").unwrap();
        assert!(file_type(&repo, "cs1", "b").unwrap_err().is_not_found());
        assert!(read_file(&repo, "cs1", "b").unwrap_err().is_not_found());
        assert!(read_dir(&repo, "cs1", "b").unwrap_err().is_not_found());
    }

    #[test]
    fn test_reading_directories_as_files() {
        let (_dir, repo) = test_repo();
        mk_dir(&repo, "cs1", "d").unwrap();

        assert!(matches!(read_file(&repo, "cs1", "d"), Err(Error::IsADirectory(_))));
        assert!(matches!(file_size(&repo, "cs1", ""), Err(Error::IsADirectory(_))));
    }

    #[test]
    fn test_is_ignored() {
        let (_dir, repo) = test_repo();
        assert!(is_ignored(&repo, "node_modules/x/index.js").unwrap());
        assert!(is_ignored(&repo, "/.git/HEAD").unwrap());
        assert!(!is_ignored(&repo, "src/index.js").unwrap());
    }

    #[test]
    fn test_was_seeded() {
        let (dir, repo) = test_repo();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("a/b.txt"), "b").unwrap();

        write_file(&repo, "cs1", "new.txt", b"n").unwrap();
        unlink(&repo, "cs1", "a").unwrap();
        finalize(&repo, "cs1", "drop a", None).unwrap();

        assert!(was_seeded(&repo, "cs1", "a").unwrap());
        assert!(was_seeded(&repo, "cs1", "a/b.txt").unwrap());
        assert!(!was_seeded(&repo, "cs1", "new.txt").unwrap());
        assert!(!was_seeded(&repo, "cs1", "a/b.txt/x").unwrap());
        assert!(was_seeded(&repo, "missing", "a").unwrap_err().is_not_found());
    }
}
