use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::fs::disk;
use crate::fs::node::{Backing, Directory, File, Node};
use crate::fs::policy::check_write;
use crate::ops;
use crate::repo::Repo;
use crate::types::ObjectKind;

/// a working tree seen through one changeset branch
///
/// tracked paths are served from the branch; everything else (ignored
/// files, files the branch does not know) comes from the real filesystem.
#[derive(Debug)]
pub struct VersionedTree {
    repo: Repo,
    branch: Option<String>,
}

impl VersionedTree {
    /// view `repo` through `branch`; `None` reads the default branch and
    /// leaves writes to the lock policy
    pub fn new(repo: Repo, branch: Option<&str>) -> Self {
        Self {
            repo,
            branch: branch.map(str::to_string),
        }
    }

    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    /// the selected branch, if any
    pub fn selected_branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// branch used for reads and writes
    pub fn branch(&self) -> &str {
        self.branch
            .as_deref()
            .unwrap_or(&self.repo.config().default_branch)
    }

    /// node at `path`, from the branch if tracked, else from disk
    ///
    /// the first lookup seeds the branch from the working tree. a seeded
    /// path the branch has since deleted is not found, whatever is on disk.
    pub fn node(&self, path: &str) -> Result<Node<'_>> {
        let path = ops::normalize_path(path)?;
        ops::ensure_branch(&self.repo, self.branch())?;

        match ops::file_type(&self.repo, self.branch(), &path) {
            Ok(ObjectKind::Tree) => Ok(Node::Directory(Directory::new(self, path, Backing::Store))),
            Ok(ObjectKind::Blob) => Ok(Node::File(File::new(self, path, Backing::Store))),
            Err(e) if e.is_not_found() => {
                if ops::was_seeded(&self.repo, self.branch(), &path)? {
                    return Err(Error::PathNotFound(path));
                }
                self.disk_node(path)
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn disk_node(&self, path: String) -> Result<Node<'_>> {
        let is_dir = disk::is_dir(&self.disk_path(&path), &path)?;
        tracing::debug!(branch = %self.branch(), path = %path, "serving from working tree");

        Ok(if is_dir {
            Node::Directory(Directory::new(self, path, Backing::Disk))
        } else {
            Node::File(File::new(self, path, Backing::Disk))
        })
    }

    /// copy `source` to `destination`
    ///
    /// a tracked source is copied inside the branch, anything else on disk.
    pub fn copy(&self, source: &str, destination: &str) -> Result<()> {
        let from = ops::normalize_path(source)?;
        let to = ops::normalize_path(destination)?;
        self.check_write(&to)?;

        if self.is_tracked(&from)? {
            ops::copy(&self.repo, self.branch(), &from, &to)?;
        } else {
            disk::copy(&self.disk_path(&from), &self.disk_path(&to), &from)?;
        }
        Ok(())
    }

    /// move `source` to `destination`
    ///
    /// inside the branch this is a copy and an unlink, published separately.
    pub fn rename(&self, source: &str, destination: &str) -> Result<()> {
        let from = ops::normalize_path(source)?;
        let to = ops::normalize_path(destination)?;
        self.check_write(&from)?;
        self.check_write(&to)?;

        if self.is_tracked(&from)? {
            ops::rename(&self.repo, self.branch(), &from, &to)?;
        } else {
            disk::rename(&self.disk_path(&from), &self.disk_path(&to), &from)?;
        }
        Ok(())
    }

    /// does `path` live on the branch; PathNotFound if the branch deleted it
    fn is_tracked(&self, path: &str) -> Result<bool> {
        ops::ensure_branch(&self.repo, self.branch())?;
        match ops::file_type(&self.repo, self.branch(), path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => {
                if ops::was_seeded(&self.repo, self.branch(), path)? {
                    return Err(Error::PathNotFound(path.to_string()));
                }
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) fn check_write(&self, path: &str) -> Result<()> {
        check_write(&self.repo, self.selected_branch(), path)
    }

    pub(crate) fn disk_path(&self, path: &str) -> PathBuf {
        self.repo.root().join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn test_tree(branch: Option<&str>) -> (tempfile::TempDir, VersionedTree) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, VersionedTree::new(repo, branch))
    }

    #[test]
    fn test_node_resolution() {
        let (root, tree) = test_tree(Some("cs1"));
        fs::write(root.path().join("x.txt"), "x").unwrap();
        fs::create_dir(root.path().join("node_modules")).unwrap();
        fs::write(root.path().join("node_modules/a.js"), "a").unwrap();

        let x = tree.node("x.txt").unwrap();
        assert_eq!(x.backing(), Backing::Store);
        assert!(!x.is_directory());

        let modules = tree.node("node_modules").unwrap();
        assert_eq!(modules.backing(), Backing::Disk);
        assert!(modules.is_directory());
        assert_eq!(tree.node("node_modules/a.js").unwrap().backing(), Backing::Disk);

        assert!(tree.node("missing").unwrap_err().is_not_found());
        assert!(matches!(tree.node("../escape"), Err(Error::InvalidEntryName(_))));
    }

    #[test]
    fn test_branch_defaults_to_config() {
        let (_root, tree) = test_tree(None);
        assert_eq!(tree.selected_branch(), None);
        assert_eq!(tree.branch(), "master");

        let (_root, tree) = test_tree(Some("cs1"));
        assert_eq!(tree.branch(), "cs1");
    }

    #[test]
    fn test_copy_and_rename_tracked() {
        let (root, tree) = test_tree(Some("cs1"));
        ops::write_file(tree.repo(), "cs1", "f.txt", b"content").unwrap();

        tree.copy("f.txt", "g.txt").unwrap();
        assert_eq!(ops::read_file(tree.repo(), "cs1", "g.txt").unwrap(), b"content");
        assert_eq!(ops::read_file(tree.repo(), "cs1", "f.txt").unwrap(), b"content");

        tree.rename("g.txt", "h.txt").unwrap();
        assert!(ops::read_file(tree.repo(), "cs1", "g.txt").unwrap_err().is_not_found());
        assert_eq!(ops::read_file(tree.repo(), "cs1", "h.txt").unwrap(), b"content");

        assert!(!root.path().join("h.txt").exists());
    }

    #[test]
    fn test_copy_and_rename_untracked() {
        let (root, tree) = test_tree(Some("cs1"));
        fs::create_dir(root.path().join("node_modules")).unwrap();
        fs::write(root.path().join("node_modules/a.js"), "a").unwrap();

        tree.copy("node_modules/a.js", "node_modules/b.js").unwrap();
        tree.rename("node_modules/a.js", "node_modules/c.js").unwrap();

        let modules = root.path().join("node_modules");
        assert!(!modules.join("a.js").exists());
        assert_eq!(fs::read(modules.join("b.js")).unwrap(), b"a");
        assert_eq!(fs::read(modules.join("c.js")).unwrap(), b"a");
    }

    #[test]
    fn test_rename_locked_on_default_branch() {
        let (root, tree) = test_tree(Some("master"));
        fs::write(root.path().join("a.txt"), "a").unwrap();

        assert!(matches!(tree.rename("a.txt", "b.txt"), Err(Error::Locked(_))));
        assert!(matches!(tree.copy("a.txt", "b.txt"), Err(Error::Locked(_))));

        let (_root, tree) = test_tree(None);
        assert!(matches!(tree.rename("a.txt", "b.txt"), Err(Error::Locked(_))));
    }
}
