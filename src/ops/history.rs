use std::fmt;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::read_commit;
use crate::ops::path::normalize_path;
use crate::ops::resolve::find_entry;
use crate::refs::resolve_ref;
use crate::repo::Repo;
use crate::types::Commit;

/// commit with its hash for log output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// history of a branch, newest first
///
/// follows parent pointers from the tip; the history is linear so this is
/// every commit reachable from the branch.
pub fn log(repo: &Repo, branch: &str, max_count: Option<usize>) -> Result<Vec<LogEntry>> {
    let mut entries = Vec::new();
    let mut next = Some(resolve_ref(repo, branch)?);

    while let Some(hash) = next {
        if max_count.is_some_and(|max| entries.len() >= max) {
            break;
        }
        let commit = read_commit(repo, &hash)?;
        next = commit.parent;
        entries.push(LogEntry { hash, commit });
    }

    Ok(entries)
}

/// timestamp of the most recent commit on `branch` that changed `path`
///
/// a commit changes a path when the object at that path differs from its
/// parent's. a path unchanged since the root commit reports the root
/// commit's timestamp, since that commit added it.
pub fn last_modified(repo: &Repo, branch: &str, path: &str) -> Result<i64> {
    let path = normalize_path(path)?;
    let mut hash = resolve_ref(repo, branch)?;
    let mut commit = read_commit(repo, &hash)?;

    let mut current = object_at(repo, &commit.tree, &path)?;
    if current.is_none() {
        return Err(Error::PathNotFound(path));
    }

    while let Some(parent_hash) = commit.parent {
        let parent = read_commit(repo, &parent_hash)?;
        let previous = if parent.tree == commit.tree {
            current
        } else {
            object_at(repo, &parent.tree, &path)?
        };

        if previous != current {
            tracing::debug!(path = %path, commit = %hash.short(), "last change found");
            return Ok(commit.timestamp);
        }

        hash = parent_hash;
        commit = parent;
        current = previous;
    }

    Ok(commit.timestamp)
}

/// object id at `path` below the tree `root`; the root path is the tree itself
fn object_at(repo: &Repo, root: &Hash, path: &str) -> Result<Option<Hash>> {
    if path.is_empty() {
        return Ok(Some(*root));
    }
    Ok(find_entry(repo, root, path)?.map(|entry| entry.hash))
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "commit {} ({})", self.hash, self.commit.kind)?;
        writeln!(f, "Author: {}", self.commit.author)?;
        writeln!(f, "Date:   {}", self.commit.timestamp)?;

        if !self.commit.message.is_empty() {
            writeln!(f)?;
            for line in self.commit.message.lines() {
                writeln!(f, "    {}", line)?;
            }
        }

        Ok(())
    }
}
