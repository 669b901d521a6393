use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{write_commit, write_tree};
use crate::ops::resolve::PathChain;
use crate::refs::update_ref;
use crate::repo::Repo;
use crate::types::{Commit, CommitKind, Signature, TreeEntry};

/// edit applied to the leaf of a path chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryChange {
    /// insert or replace the leaf; the entry's own name is ignored
    Put(TreeEntry),
    /// remove the leaf
    Remove,
}

/// tree ids written while rebuilding a path
#[derive(Clone, Debug)]
pub struct RebuiltPath {
    /// innermost first, root last
    pub trees: Vec<Hash>,
    pub root: Hash,
}

/// apply `change` to the leaf and rewrite every tree up to the root
///
/// one tree is written per directory level, the root last.
pub fn apply_entry_change(repo: &Repo, chain: PathChain, change: EntryChange) -> Result<RebuiltPath> {
    let (path, leaf, mut parent, ancestors) = chain.into_parts();

    match change {
        EntryChange::Put(entry) => {
            parent.insert(TreeEntry::new(leaf, entry.mode, entry.hash))?;
        }
        EntryChange::Remove => {
            if parent.remove(&leaf).is_none() {
                return Err(Error::PathNotFound(path));
            }
        }
    }

    let mut id = write_tree(repo, &parent)?;
    let mut trees = Vec::with_capacity(ancestors.len() + 1);
    trees.push(id);

    for (child, mut tree) in ancestors {
        tree.insert(TreeEntry::directory(child, id))?;
        id = write_tree(repo, &tree)?;
        trees.push(id);
    }

    tracing::debug!(path = %path, root = %id.short(), levels = trees.len(), "rebuilt trees");
    Ok(RebuiltPath { trees, root: id })
}

/// write a pending commit for `root_tree` on top of `parent`
///
/// `author` defaults to the configured author.
pub fn create_commit(
    repo: &Repo,
    root_tree: &Hash,
    parent: Option<&Hash>,
    author: Option<&Signature>,
) -> Result<Hash> {
    let config = repo.config();
    let commit = Commit::new(
        *root_tree,
        parent.copied(),
        CommitKind::Pending,
        author.cloned().unwrap_or_else(|| config.author.clone()),
        config.committer.clone(),
        "",
    );
    write_commit(repo, &commit)
}

/// point `branch` at `commit`, provided it still points at `expected`
///
/// this is the only step that makes a mutation visible. a tip that moved
/// since `expected` was read fails with ReferenceConflict and nothing changes.
pub fn publish(repo: &Repo, branch: &str, commit: &Hash, expected: &Hash) -> Result<()> {
    update_ref(repo, branch, commit, Some(expected))?;
    tracing::info!(branch = %branch, commit = %commit.short(), "published");
    Ok(())
}
