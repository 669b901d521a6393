//! plain working-tree operations for paths the store does not track

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::UNIX_EPOCH;

use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};

/// map a missing path to PathNotFound, anything else to StorageUnavailable
fn io_err(path: &Path, rel: &str, e: std::io::Error) -> Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        Error::PathNotFound(rel.to_string())
    } else {
        Error::StorageUnavailable {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

/// is the path a directory (following symlinks); PathNotFound if absent
pub(crate) fn is_dir(path: &Path, rel: &str) -> Result<bool> {
    fs::metadata(path)
        .map(|meta| meta.is_dir())
        .map_err(|e| io_err(path, rel, e))
}

pub(crate) fn read(path: &Path, rel: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| io_err(path, rel, e))
}

pub(crate) fn size(path: &Path, rel: &str) -> Result<u64> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|e| io_err(path, rel, e))
}

/// modification time in seconds since the epoch
pub(crate) fn modified(path: &Path, rel: &str) -> Result<i64> {
    let meta = fs::metadata(path).map_err(|e| io_err(path, rel, e))?;
    let mtime = meta.modified().with_path(path)?;
    Ok(mtime
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0))
}

/// write a file, creating it or truncating it
pub(crate) fn write(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).with_path(path)?;
    file.write_all(content).with_path(path)?;
    file.sync_all().with_path(path)?;
    Ok(())
}

pub(crate) fn create_dir(path: &Path, rel: &str) -> Result<()> {
    fs::create_dir(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(rel.to_string()),
        _ => io_err(path, rel, e),
    })
}

/// remove a file, or a directory with everything in it
pub(crate) fn remove(path: &Path, rel: &str) -> Result<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| io_err(path, rel, e))?;
    if meta.is_dir() {
        fs::remove_dir_all(path).with_path(path)
    } else {
        fs::remove_file(path).with_path(path)
    }
}

/// copy a file or a directory tree
pub(crate) fn copy(from: &Path, to: &Path, rel: &str) -> Result<()> {
    if !is_dir(from, rel)? {
        fs::copy(from, to).with_path(to)?;
        return Ok(());
    }

    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| Error::StorageUnavailable {
            path: from.to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("walkdir error")),
        })?;
        let Ok(suffix) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(suffix);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).with_path(&target)?;
        } else {
            fs::copy(entry.path(), &target).with_path(&target)?;
        }
    }
    Ok(())
}

pub(crate) fn rename(from: &Path, to: &Path, rel: &str) -> Result<()> {
    fs::rename(from, to).map_err(|e| io_err(from, rel, e))
}

/// names in a directory with whether each is a directory; empty if absent
pub(crate) fn list(path: &Path) -> Result<Vec<(String, bool)>> {
    let read_dir = match fs::read_dir(path) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_path(path),
    };

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.with_path(path)?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        // follow symlinks; dangling links are skipped
        let Ok(meta) = fs::metadata(entry.path()) else {
            continue;
        };
        names.push((name, meta.is_dir()));
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_paths_are_not_found() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing");

        assert!(read(&missing, "missing").unwrap_err().is_not_found());
        assert!(is_dir(&missing, "missing").unwrap_err().is_not_found());
        assert!(remove(&missing, "missing").unwrap_err().is_not_found());
        assert!(list(&missing).unwrap().is_empty());
    }

    #[test]
    fn test_copy_tree() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("inner")).unwrap();
        fs::write(src.join("inner/f.txt"), "f").unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();

        let dst = dir.path().join("dst");
        copy(&src, &dst, "src").unwrap();
        assert_eq!(fs::read(dst.join("inner/f.txt")).unwrap(), b"f");
        assert_eq!(fs::read(dst.join("top.txt")).unwrap(), b"top");
    }

    #[test]
    fn test_create_dir_twice() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("d");
        create_dir(&path, "d").unwrap();
        assert!(matches!(create_dir(&path, "d"), Err(Error::AlreadyExists(_))));
    }
}
