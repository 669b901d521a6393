use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::object::{read_commit, write_blob, write_commit, write_tree};
use crate::ops::assemble::publish;
use crate::ops::path::join_path;
use crate::refs::{read_ref, try_read_ref, update_ref, validate_ref_name};
use crate::repo::Repo;
use crate::types::{validate_entry_name, Commit, CommitKind, FileMode, Signature, Tree, TreeEntry};

/// make sure `branch` exists, seeding it from the working tree
///
/// a new branch starts with a `Start` commit holding a snapshot of the
/// working tree, on top of the default branch tip when there is one.
/// returns the branch tip.
pub fn ensure_branch(repo: &Repo, branch: &str) -> Result<Hash> {
    validate_ref_name(branch)?;

    if let Some(tip) = try_read_ref(repo, branch)? {
        return Ok(tip);
    }

    let default_branch = repo.config().default_branch.as_str();
    let parent = if branch != default_branch {
        try_read_ref(repo, default_branch)?
    } else {
        None
    };

    let tree = snapshot_dir(repo, repo.root(), "")?;
    let config = repo.config();
    let commit = Commit::new(
        tree,
        parent,
        CommitKind::Start,
        config.author.clone(),
        config.committer.clone(),
        format!("start changeset {}", branch),
    );
    let id = write_commit(repo, &commit)?;

    match update_ref(repo, branch, &id, None) {
        Ok(()) => {
            tracing::info!(branch = %branch, commit = %id.short(), "seeded branch from working tree");
            Ok(id)
        }
        // someone else seeded it first; theirs wins
        Err(Error::ReferenceConflict { .. }) => read_ref(repo, branch),
        Err(e) => Err(e),
    }
}

/// store the working tree below `dir` and return its tree id
///
/// ignored paths, symlinks and special files are left out.
fn snapshot_dir(repo: &Repo, dir: &Path, prefix: &str) -> Result<Hash> {
    let mut dir_entries: Vec<_> = fs::read_dir(dir)
        .with_path(dir)?
        .collect::<std::io::Result<Vec<_>>>()
        .with_path(dir)?;
    dir_entries.sort_by_key(|e| e.file_name());

    let mut entries = Vec::new();
    for entry in dir_entries {
        let path = entry.path();
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                tracing::warn!(path = %path.display(), name = ?raw, "skipping non-utf-8 name");
                continue;
            }
        };

        let rel = join_path(prefix, &name);
        if validate_entry_name(&name).is_err() || repo.ignore().is_ignored(&rel) {
            continue;
        }

        let file_type = entry.file_type().with_path(&path)?;
        if file_type.is_dir() {
            let id = snapshot_dir(repo, &path, &rel)?;
            entries.push(TreeEntry::directory(name, id));
        } else if file_type.is_file() {
            let content = fs::read(&path).with_path(&path)?;
            let id = write_blob(repo, &content)?;
            let meta = entry.metadata().with_path(&path)?;
            let mode = if meta.permissions().mode() & 0o111 != 0 {
                FileMode::Executable
            } else {
                FileMode::Regular
            };
            entries.push(TreeEntry::new(name, mode, id));
        }
    }

    write_tree(repo, &Tree::new(entries)?)
}

/// where the next commit on a branch attaches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildPoint {
    /// branch tip at resolution time; trees are read from here and the
    /// publish must find the branch still pointing at it
    pub tip: Hash,
    /// parent of the commit about to be created
    pub parent: Option<Hash>,
    /// the pending tip being replaced, if any
    pub pending: Option<Hash>,
}

impl BuildPoint {
    /// will the next commit replace the tip instead of stacking on it
    pub fn amends(&self) -> bool {
        self.pending.is_some()
    }
}

/// decide whether the next commit amends the tip or builds on it
///
/// a `Pending` tip is replaced: the new commit takes the tip's parent.
/// `Start` and `Final` tips are built upon.
pub fn resolve_build_point(repo: &Repo, branch: &str) -> Result<BuildPoint> {
    let tip = read_ref(repo, branch)?;
    let commit = read_commit(repo, &tip)?;

    let point = if commit.kind == CommitKind::Pending {
        BuildPoint {
            tip,
            parent: commit.parent,
            pending: Some(tip),
        }
    } else {
        BuildPoint {
            tip,
            parent: Some(tip),
            pending: None,
        }
    };

    tracing::debug!(
        branch = %branch,
        tip = %tip.short(),
        amend = point.amends(),
        "resolved build point"
    );
    Ok(point)
}

/// the `Start` commit `branch` was seeded with
///
/// follows first parents from the tip; a history without a `Start` commit
/// yields its root.
pub fn seed_commit(repo: &Repo, branch: &str) -> Result<Hash> {
    let mut hash = read_ref(repo, branch)?;
    loop {
        let commit = read_commit(repo, &hash)?;
        match commit.parent {
            Some(parent) if commit.kind != CommitKind::Start => hash = parent,
            _ => return Ok(hash),
        }
    }
}

/// settle a pending tip as a `Final` commit with `message`
///
/// the final commit keeps the pending commit's tree and parent. a tip that
/// is not pending is returned unchanged.
pub fn finalize(
    repo: &Repo,
    branch: &str,
    message: &str,
    author: Option<&Signature>,
) -> Result<Hash> {
    let tip = read_ref(repo, branch)?;
    let pending = read_commit(repo, &tip)?;
    if pending.kind != CommitKind::Pending {
        return Ok(tip);
    }

    let commit = Commit::new(
        pending.tree,
        pending.parent,
        CommitKind::Final,
        author.cloned().unwrap_or(pending.author),
        repo.config().committer.clone(),
        message,
    );
    let id = write_commit(repo, &commit)?;
    publish(repo, branch, &id, &tip)?;

    tracing::info!(branch = %branch, commit = %id.short(), "finalized changeset");
    Ok(id)
}
