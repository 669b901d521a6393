use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::fs::disk;
use crate::fs::tree::VersionedTree;
use crate::ops::{self, join_path, split_parent};
use crate::repo::STORE_DIR;
use crate::types::{Encoding, ObjectKind};

/// where a node's content lives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backing {
    /// tracked on the branch
    Store,
    /// plain file or directory in the working tree
    Disk,
}

/// a file or directory in a [`VersionedTree`]
#[derive(Debug)]
pub enum Node<'a> {
    Directory(Directory<'a>),
    File(File<'a>),
}

impl<'a> Node<'a> {
    pub fn path(&self) -> &str {
        match self {
            Node::Directory(dir) => dir.path(),
            Node::File(file) => file.path(),
        }
    }

    pub fn name(&self) -> &str {
        split_parent(self.path()).1
    }

    pub fn backing(&self) -> Backing {
        match self {
            Node::Directory(dir) => dir.backing,
            Node::File(file) => file.backing,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    pub fn get_last_modified(&self) -> Result<i64> {
        match self {
            Node::Directory(dir) => dir.get_last_modified(),
            Node::File(file) => file.get_last_modified(),
        }
    }

    pub fn delete(&self) -> Result<()> {
        match self {
            Node::Directory(dir) => dir.delete(),
            Node::File(file) => file.delete(),
        }
    }

    pub fn into_file(self) -> Option<File<'a>> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }

    pub fn into_directory(self) -> Option<Directory<'a>> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct File<'a> {
    tree: &'a VersionedTree,
    path: String,
    backing: Backing,
}

impl<'a> File<'a> {
    pub(crate) fn new(tree: &'a VersionedTree, path: String, backing: Backing) -> Self {
        Self { tree, path, backing }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn backing(&self) -> Backing {
        self.backing
    }

    pub fn get(&self) -> Result<Vec<u8>> {
        match self.backing {
            Backing::Store => ops::read_file(self.tree.repo(), self.tree.branch(), &self.path),
            Backing::Disk => disk::read(&self.tree.disk_path(&self.path), &self.path),
        }
    }

    pub fn get_size(&self) -> Result<u64> {
        match self.backing {
            Backing::Store => ops::file_size(self.tree.repo(), self.tree.branch(), &self.path),
            Backing::Disk => disk::size(&self.tree.disk_path(&self.path), &self.path),
        }
    }

    /// seconds since the epoch
    pub fn get_last_modified(&self) -> Result<i64> {
        match self.backing {
            Backing::Store => ops::last_modified(self.tree.repo(), self.tree.branch(), &self.path),
            Backing::Disk => disk::modified(&self.tree.disk_path(&self.path), &self.path),
        }
    }

    pub fn put(&self, content: &[u8]) -> Result<()> {
        self.tree.check_write(&self.path)?;
        match self.backing {
            Backing::Store => {
                ops::write_file(self.tree.repo(), self.tree.branch(), &self.path, content)?;
            }
            Backing::Disk => disk::write(&self.tree.disk_path(&self.path), content)?,
        }
        Ok(())
    }

    pub fn put_encoded(&self, text: &str, encoding: Encoding) -> Result<()> {
        self.put(&encoding.decode(text)?)
    }

    pub fn delete(&self) -> Result<()> {
        self.tree.check_write(&self.path)?;
        match self.backing {
            Backing::Store => {
                ops::unlink(self.tree.repo(), self.tree.branch(), &self.path)?;
            }
            Backing::Disk => disk::remove(&self.tree.disk_path(&self.path), &self.path)?,
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Directory<'a> {
    tree: &'a VersionedTree,
    path: String,
    backing: Backing,
}

impl<'a> Directory<'a> {
    pub(crate) fn new(tree: &'a VersionedTree, path: String, backing: Backing) -> Self {
        Self { tree, path, backing }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn backing(&self) -> Backing {
        self.backing
    }

    /// create or overwrite the file `name` in this directory
    ///
    /// ignored names and files in untracked directories are written to disk.
    pub fn create_file(&self, name: &str, content: &[u8]) -> Result<()> {
        let path = self.child_path(name)?;
        self.tree.check_write(&path)?;

        if self.backing == Backing::Disk || self.tree.repo().ignore().is_ignored(&path) {
            disk::write(&self.tree.disk_path(&path), content)
        } else {
            ops::write_file(self.tree.repo(), self.tree.branch(), &path, content)?;
            Ok(())
        }
    }

    pub fn create_directory(&self, name: &str) -> Result<()> {
        let path = self.child_path(name)?;
        self.tree.check_write(&path)?;

        if self.backing == Backing::Disk || self.tree.repo().ignore().is_ignored(&path) {
            disk::create_dir(&self.tree.disk_path(&path), &path)
        } else {
            ops::mk_dir(self.tree.repo(), self.tree.branch(), &path)?;
            Ok(())
        }
    }

    pub fn child(&self, name: &str) -> Result<Node<'a>> {
        let path = self.child_path(name)?;
        match self.backing {
            Backing::Store => self.tree.node(&path),
            Backing::Disk => self.tree.disk_node(path),
        }
    }

    /// entries of this directory sorted by path
    ///
    /// for a tracked directory, on-disk entries the branch does not list
    /// are added as disk nodes.
    pub fn children(&self) -> Result<Vec<Node<'a>>> {
        let mut nodes = Vec::new();
        let mut seen = HashSet::new();

        if self.backing == Backing::Store {
            let repo = self.tree.repo();
            let listing = ops::read_dir(repo, self.tree.branch(), &self.path)?;
            for entry in listing.into_entries() {
                let path = join_path(&self.path, &entry.name);
                seen.insert(entry.name);
                nodes.push(match entry.kind {
                    ObjectKind::Tree => Node::Directory(Directory::new(self.tree, path, Backing::Store)),
                    ObjectKind::Blob => Node::File(File::new(self.tree, path, Backing::Store)),
                });
            }

            // seeded entries missing from the listing were deleted on the branch
            let seed = ops::seed_commit(repo, self.tree.branch())?;
            match ops::read_tree_at(repo, &seed, &self.path) {
                Ok(seeded) => seen.extend(seeded.into_entries().into_iter().map(|e| e.name)),
                Err(e) if e.is_not_found() || matches!(e, Error::NotADirectory(_)) => {}
                Err(e) => return Err(e),
            }
        }

        for (name, is_dir) in disk::list(&self.tree.disk_path(&self.path))? {
            if seen.contains(&name) || (self.path.is_empty() && name == STORE_DIR) {
                continue;
            }
            let path = join_path(&self.path, &name);
            nodes.push(if is_dir {
                Node::Directory(Directory::new(self.tree, path, Backing::Disk))
            } else {
                Node::File(File::new(self.tree, path, Backing::Disk))
            });
        }

        nodes.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(nodes)
    }

    pub fn delete(&self) -> Result<()> {
        if self.path.is_empty() {
            return Err(Error::InvalidEntryName("cannot delete the root".to_string()));
        }
        self.tree.check_write(&self.path)?;

        match self.backing {
            Backing::Store => {
                ops::unlink(self.tree.repo(), self.tree.branch(), &self.path)?;
            }
            Backing::Disk => disk::remove(&self.tree.disk_path(&self.path), &self.path)?,
        }
        Ok(())
    }

    /// seconds since the epoch; a tracked directory unchanged since the
    /// branch started reports the branch's first commit
    pub fn get_last_modified(&self) -> Result<i64> {
        match self.backing {
            Backing::Store => ops::last_modified(self.tree.repo(), self.tree.branch(), &self.path),
            Backing::Disk => disk::modified(&self.tree.disk_path(&self.path), &self.path),
        }
    }

    fn child_path(&self, name: &str) -> Result<String> {
        ops::normalize_path(&join_path(&self.path, name))
    }
}
