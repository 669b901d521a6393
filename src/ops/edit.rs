use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{write_blob, write_tree};
use crate::ops::assemble::{apply_entry_change, create_commit, publish, EntryChange};
use crate::ops::changeset::{ensure_branch, resolve_build_point, BuildPoint};
use crate::ops::path::normalize_path;
use crate::ops::resolve::{lookup_entry, resolve_path_chain};
use crate::repo::Repo;
use crate::types::{Encoding, FileMode, Tree, TreeEntry};

/// run one mutation against the current build point of `branch`
///
/// `decide` sees the entry currently at `path` and picks the change.
/// returns the published commit.
fn mutate<F>(repo: &Repo, branch: &str, path: &str, decide: F) -> Result<Hash>
where
    F: FnOnce(&BuildPoint, Option<&TreeEntry>) -> Result<EntryChange>,
{
    ensure_branch(repo, branch)?;
    let point = resolve_build_point(repo, branch)?;
    mutate_at(repo, branch, &point, path, decide)
}

fn mutate_at<F>(repo: &Repo, branch: &str, point: &BuildPoint, path: &str, decide: F) -> Result<Hash>
where
    F: FnOnce(&BuildPoint, Option<&TreeEntry>) -> Result<EntryChange>,
{
    let chain = resolve_path_chain(repo, &point.tip, path)?;
    let change = decide(point, chain.current())?;
    let rebuilt = apply_entry_change(repo, chain, change)?;
    let commit = create_commit(repo, &rebuilt.root, point.parent.as_ref(), None)?;
    publish(repo, branch, &commit, &point.tip)?;
    Ok(commit)
}

/// write `content` to the file at `path` on `branch`
///
/// missing parent directories are created. an executable file stays
/// executable; writing over a directory fails.
pub fn write_file(repo: &Repo, branch: &str, path: &str, content: &[u8]) -> Result<Hash> {
    let path = normalize_path(path)?;
    let blob = write_blob(repo, content)?;
    tracing::debug!(branch = %branch, path = %path, blob = %blob.short(), "write file");

    mutate(repo, branch, &path, |_, current| {
        let mode = match current {
            Some(entry) if entry.is_tree() => return Err(Error::IsADirectory(path.clone())),
            Some(entry) => entry.mode,
            None => FileMode::Regular,
        };
        Ok(EntryChange::Put(TreeEntry::new("", mode, blob)))
    })
}

/// write text decoded with `encoding` to the file at `path`
pub fn write_file_encoded(
    repo: &Repo,
    branch: &str,
    path: &str,
    text: &str,
    encoding: Encoding,
) -> Result<Hash> {
    let content = encoding.decode(text)?;
    write_file(repo, branch, path, &content)
}

/// create an empty directory at `path`
pub fn mk_dir(repo: &Repo, branch: &str, path: &str) -> Result<Hash> {
    let path = normalize_path(path)?;
    let empty = write_tree(repo, &Tree::empty())?;
    tracing::debug!(branch = %branch, path = %path, "create directory");

    mutate(repo, branch, &path, |_, current| match current {
        Some(_) => Err(Error::AlreadyExists(path.clone())),
        None => Ok(EntryChange::Put(TreeEntry::directory("", empty))),
    })
}

/// remove the file or directory at `path`
///
/// a directory goes with everything below it. the parent directory stays,
/// even when it becomes empty.
pub fn unlink(repo: &Repo, branch: &str, path: &str) -> Result<Hash> {
    let path = normalize_path(path)?;
    tracing::debug!(branch = %branch, path = %path, "unlink");

    mutate(repo, branch, &path, |_, current| match current {
        Some(_) => Ok(EntryChange::Remove),
        None => Err(Error::PathNotFound(path.clone())),
    })
}

/// copy the entry at `source` to `destination`, replacing what is there
///
/// the destination shares the source's object id; nothing is re-hashed.
pub fn copy(repo: &Repo, branch: &str, source: &str, destination: &str) -> Result<Hash> {
    let source = normalize_path(source)?;
    let destination = normalize_path(destination)?;
    tracing::debug!(branch = %branch, from = %source, to = %destination, "copy");

    ensure_branch(repo, branch)?;
    let point = resolve_build_point(repo, branch)?;
    let entry = lookup_entry(repo, &point.tip, &source)?;

    mutate_at(repo, branch, &point, &destination, |_, current| {
        if let Some(existing) = current {
            if existing.is_tree() != entry.is_tree() {
                return Err(Error::AlreadyExists(destination.clone()));
            }
        }
        Ok(EntryChange::Put(entry))
    })
}

/// move `source` to `destination`
///
/// a copy followed by an unlink, each published on its own. if the unlink
/// fails the entry is left at both paths.
pub fn rename(repo: &Repo, branch: &str, source: &str, destination: &str) -> Result<Hash> {
    let from = normalize_path(source)?;
    let to = normalize_path(destination)?;

    if from == to {
        return ensure_branch(repo, branch);
    }
    if to.starts_with(&format!("{}/", from)) {
        return Err(Error::InvalidEntryName(format!(
            "cannot move {} into itself ({})",
            from, to
        )));
    }

    copy(repo, branch, &from, &to)?;
    unlink(repo, branch, &from)
}
