use std::collections::HashSet;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hash::{compute_blob_hash, Hash};
use crate::object::{read_blob, read_commit, read_tree};
use crate::refs::{list_refs, read_ref};
use crate::repo::Repo;

/// fsck report
#[derive(Debug, Default)]
pub struct FsckReport {
    /// objects checked
    pub objects_checked: usize,
    /// corrupt objects (hash mismatch or unreadable)
    pub corrupt_objects: Vec<CorruptObject>,
    /// missing objects referenced by other objects
    pub missing_objects: Vec<MissingObject>,
    /// objects not reachable from any branch, e.g. superseded pending commits
    pub dangling_objects: Vec<Hash>,
}

impl FsckReport {
    pub fn is_ok(&self) -> bool {
        self.corrupt_objects.is_empty() && self.missing_objects.is_empty()
    }
}

#[derive(Debug)]
pub struct CorruptObject {
    pub hash: Hash,
    pub object_type: ObjectType,
    pub message: String,
}

#[derive(Debug)]
pub struct MissingObject {
    pub hash: Hash,
    pub object_type: ObjectType,
    pub referenced_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectType::Blob => write!(f, "blob"),
            ObjectType::Tree => write!(f, "tree"),
            ObjectType::Commit => write!(f, "commit"),
        }
    }
}

#[derive(Default)]
struct Reachable {
    blobs: HashSet<Hash>,
    trees: HashSet<Hash>,
    commits: HashSet<Hash>,
}

/// verify that every branch's history is complete and intact
pub fn fsck(repo: &Repo) -> Result<FsckReport> {
    let mut report = FsckReport::default();
    let mut reachable = Reachable::default();

    for branch in list_refs(repo)? {
        let tip = read_ref(repo, &branch)?;
        check_history(repo, tip, &branch, &mut reachable, &mut report)?;
    }

    for (dir, set) in [
        (repo.blobs_path(), &reachable.blobs),
        (repo.trees_path(), &reachable.trees),
        (repo.commits_path(), &reachable.commits),
    ] {
        for hash in list_objects(&dir)? {
            report.objects_checked += 1;
            if !set.contains(&hash) {
                report.dangling_objects.push(hash);
            }
        }
    }

    tracing::debug!(
        checked = report.objects_checked,
        corrupt = report.corrupt_objects.len(),
        missing = report.missing_objects.len(),
        "fsck finished"
    );
    Ok(report)
}

fn check_history(
    repo: &Repo,
    tip: Hash,
    branch: &str,
    reachable: &mut Reachable,
    report: &mut FsckReport,
) -> Result<()> {
    let mut next = Some((tip, format!("branch {}", branch)));

    while let Some((hash, referenced_by)) = next.take() {
        if !reachable.commits.insert(hash) {
            break;
        }

        match read_commit(repo, &hash) {
            Ok(commit) => {
                check_tree(repo, &commit.tree, &format!("commit {}", hash), reachable, report)?;
                next = commit.parent.map(|parent| (parent, format!("commit {}", hash)));
            }
            Err(e) => record(report, hash, ObjectType::Commit, &referenced_by, e)?,
        }
    }

    Ok(())
}

fn check_tree(
    repo: &Repo,
    tree_hash: &Hash,
    referenced_by: &str,
    reachable: &mut Reachable,
    report: &mut FsckReport,
) -> Result<()> {
    if !reachable.trees.insert(*tree_hash) {
        return Ok(());
    }

    let tree = match read_tree(repo, tree_hash) {
        Ok(tree) => tree,
        Err(e) => return record(report, *tree_hash, ObjectType::Tree, referenced_by, e),
    };

    for entry in tree.entries() {
        let from = format!("tree {} entry {}", tree_hash, entry.name);
        if entry.is_tree() {
            check_tree(repo, &entry.hash, &from, reachable, report)?;
        } else if reachable.blobs.insert(entry.hash) {
            match read_blob(repo, &entry.hash) {
                Ok(content) if compute_blob_hash(&content) == entry.hash => {}
                Ok(_) => report.corrupt_objects.push(CorruptObject {
                    hash: entry.hash,
                    object_type: ObjectType::Blob,
                    message: "hash mismatch".to_string(),
                }),
                Err(e) => record(report, entry.hash, ObjectType::Blob, &from, e)?,
            }
        }
    }

    Ok(())
}

/// file a read failure under missing or corrupt; anything else aborts
fn record(
    report: &mut FsckReport,
    hash: Hash,
    object_type: ObjectType,
    referenced_by: &str,
    err: Error,
) -> Result<()> {
    match err {
        Error::ObjectNotFound(_) => report.missing_objects.push(MissingObject {
            hash,
            object_type,
            referenced_by: referenced_by.to_string(),
        }),
        Error::CorruptObject(_) => report.corrupt_objects.push(CorruptObject {
            hash,
            object_type,
            message: "hash mismatch".to_string(),
        }),
        Error::Unparseable(message) => report.corrupt_objects.push(CorruptObject {
            hash,
            object_type,
            message,
        }),
        Error::CborDecode(e) => report.corrupt_objects.push(CorruptObject {
            hash,
            object_type,
            message: e.to_string(),
        }),
        other => return Err(other),
    }
    Ok(())
}

fn list_objects(dir: &Path) -> Result<Vec<Hash>> {
    let mut hashes = Vec::new();

    if !dir.exists() {
        return Ok(hashes);
    }

    for entry in WalkDir::new(dir).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|e| Error::StorageUnavailable {
            path: dir.to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("walkdir error")),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let parent_name = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("");

        if let Ok(hash) = Hash::from_hex(&format!("{}{}", parent_name, file_name)) {
            hashes.push(hash);
        }
    }

    Ok(hashes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{blob_path, commit_path};
    use crate::ops::edit::write_file;
    use crate::ops::resolve::lookup_entry;
    use std::fs;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_fsck_healthy_repo() {
        let (dir, repo) = test_repo();
        fs::write(dir.path().join("file.txt"), "content").unwrap();
        write_file(&repo, "cs1", "a/b.txt", b"hello").unwrap();

        let report = fsck(&repo).unwrap();
        assert!(report.is_ok(), "{:?}", report);
        assert!(report.objects_checked > 0);
    }

    #[test]
    fn test_superseded_pending_commit_dangles() {
        let (_dir, repo) = test_repo();
        let first = write_file(&repo, "cs1", "a", b"1").unwrap();
        write_file(&repo, "cs1", "b", b"2").unwrap();

        let report = fsck(&repo).unwrap();
        assert!(report.is_ok());
        assert!(report.dangling_objects.contains(&first));
    }

    #[test]
    fn test_fsck_missing_blob() {
        let (_dir, repo) = test_repo();
        let tip = write_file(&repo, "cs1", "gone.txt", b"soon gone").unwrap();
        let blob = lookup_entry(&repo, &tip, "gone.txt").unwrap().hash;
        fs::remove_file(blob_path(&repo, &blob)).unwrap();

        let report = fsck(&repo).unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.missing_objects.len(), 1);
        assert_eq!(report.missing_objects[0].hash, blob);
        assert_eq!(report.missing_objects[0].object_type, ObjectType::Blob);
    }

    #[test]
    fn test_fsck_corrupt_blob() {
        let (_dir, repo) = test_repo();
        let tip = write_file(&repo, "cs1", "f", b"original").unwrap();
        let blob = lookup_entry(&repo, &tip, "f").unwrap().hash;
        fs::write(blob_path(&repo, &blob), b"tampered").unwrap();

        let report = fsck(&repo).unwrap();
        assert_eq!(report.corrupt_objects.len(), 1);
        assert_eq!(report.corrupt_objects[0].hash, blob);
        assert_eq!(report.corrupt_objects[0].object_type, ObjectType::Blob);
    }

    #[test]
    fn test_fsck_unreadable_commit() {
        let (_dir, repo) = test_repo();
        let tip = write_file(&repo, "cs1", "f", b"original").unwrap();
        fs::write(commit_path(&repo, &tip), b"not zstd").unwrap();

        let report = fsck(&repo).unwrap();
        let corrupt: Vec<_> = report.corrupt_objects.iter().map(|c| c.object_type).collect();
        assert_eq!(corrupt, vec![ObjectType::Commit]);

        // nothing below an unreadable commit is visited
        assert!(report.missing_objects.is_empty());
    }
}
