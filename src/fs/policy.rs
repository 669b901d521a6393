use crate::error::{Error, Result};
use crate::repo::Repo;

/// refuse writes that would bypass a changeset branch
///
/// with `lock_default_branch` set, a write needs a selected branch, and a
/// write to the default branch is only allowed for ignored paths.
pub fn check_write(repo: &Repo, branch: Option<&str>, path: &str) -> Result<()> {
    let config = repo.config();
    if !config.lock_default_branch {
        return Ok(());
    }

    let locked = match branch {
        None => true,
        Some(branch) => branch == config.default_branch && !repo.ignore().is_ignored(path),
    };

    if locked {
        tracing::debug!(path = %path, branch = ?branch, "write refused by lock policy");
        return Err(Error::Locked(path.to_string()));
    }
    Ok(())
}
