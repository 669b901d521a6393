use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::write_atomic;
use crate::repo::Repo;

/// point `ref_name` at `hash` whatever it held before
///
/// names may be hierarchical, like "user/alice/cs1".
pub fn write_ref(repo: &Repo, ref_name: &str, hash: &Hash) -> Result<()> {
    validate_ref_name(ref_name)?;
    let line = format!("{}\n", hash.to_hex());
    write_atomic(repo, &ref_path(repo, ref_name), line.as_bytes())
}

/// point `ref_name` at `new` only if it currently points at `expected`
///
/// `expected == None` means the ref must not exist yet. the check and the
/// write happen under the repository lock, so two writers that built on the
/// same tip cannot both succeed.
pub fn update_ref(
    repo: &Repo,
    ref_name: &str,
    new: &Hash,
    expected: Option<&Hash>,
) -> Result<()> {
    validate_ref_name(ref_name)?;

    let _lock = repo.lock()?;
    let current = try_read_ref(repo, ref_name)?;

    if current.as_ref() != expected {
        tracing::warn!(
            branch = ref_name,
            expected = %describe(expected),
            actual = %describe(current.as_ref()),
            "branch moved during update"
        );
        return Err(Error::ReferenceConflict {
            branch: ref_name.to_string(),
            expected: describe(expected),
            actual: describe(current.as_ref()),
        });
    }

    write_ref(repo, ref_name, new)
}

fn describe(hash: Option<&Hash>) -> String {
    match hash {
        Some(h) => h.to_hex(),
        None => "(none)".to_string(),
    }
}

pub fn read_ref(repo: &Repo, ref_name: &str) -> Result<Hash> {
    let path = ref_path(repo, ref_name);
    let content = fs::read_to_string(&path).map_err(|e| ref_error(ref_name, path, e))?;
    Hash::from_hex(content.trim())
}

/// like [`read_ref`], with a missing ref as `None`
pub fn try_read_ref(repo: &Repo, ref_name: &str) -> Result<Option<Hash>> {
    match read_ref(repo, ref_name) {
        Ok(hash) => Ok(Some(hash)),
        Err(Error::RefNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn delete_ref(repo: &Repo, ref_name: &str) -> Result<()> {
    let path = ref_path(repo, ref_name);
    fs::remove_file(&path).map_err(|e| ref_error(ref_name, path, e))
}

/// a 64-char hex string is taken as a commit id, anything else as a branch
pub fn resolve_ref(repo: &Repo, ref_or_hash: &str) -> Result<Hash> {
    if ref_or_hash.len() == 64 && ref_or_hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Hash::from_hex(ref_or_hash);
    }
    read_ref(repo, ref_or_hash)
}

/// every branch name, sorted
pub fn list_refs(repo: &Repo) -> Result<Vec<String>> {
    let refs_dir = repo.refs_path();
    if !refs_dir.exists() {
        return Ok(Vec::new());
    }

    let mut refs = Vec::new();
    for entry in WalkDir::new(&refs_dir).min_depth(1) {
        let entry = entry.map_err(|e| Error::StorageUnavailable {
            path: refs_dir.clone(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("walkdir error")),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = branch_name(&refs_dir, entry.path()) {
            refs.push(name);
        }
    }

    refs.sort();
    Ok(refs)
}

pub fn ref_exists(repo: &Repo, ref_name: &str) -> bool {
    ref_path(repo, ref_name).is_file()
}

fn ref_path(repo: &Repo, ref_name: &str) -> PathBuf {
    repo.refs_path().join(ref_name)
}

fn branch_name(refs_dir: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(refs_dir).ok()?;
    let parts: Vec<&str> = rel.iter().map(|c| c.to_str()).collect::<Option<_>>()?;
    Some(parts.join("/"))
}

fn ref_error(ref_name: &str, path: PathBuf, e: std::io::Error) -> Error {
    if e.kind() == ErrorKind::NotFound {
        Error::RefNotFound(ref_name.to_string())
    } else {
        Error::StorageUnavailable { path, source: e }
    }
}

/// branch names are `/`-separated components; none may be empty, `.`, `..`
/// or contain a NUL
pub(crate) fn validate_ref_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Err(Error::InvalidRef(format!("{:?}: {}", name, reason)));

    if name.is_empty() {
        return invalid("empty name");
    }
    if name.contains('\0') {
        return invalid("contains a NUL byte");
    }
    for component in name.split('/') {
        match component {
            "" => return invalid("empty path component"),
            "." | ".." => return invalid("relative path component"),
            _ => {}
        }
    }
    Ok(())
}
