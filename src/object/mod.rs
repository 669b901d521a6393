pub mod blob;
pub mod commit;
pub mod tree;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::repo::Repo;

pub use blob::{blob_exists, blob_path, blob_size, read_blob, write_blob, write_blob_encoded};
pub use commit::{commit_exists, commit_path, read_commit, write_commit};
pub use tree::{read_tree, tree_exists, tree_path, write_tree};

/// store `bytes` under `dir/xx/yyyy…` unless an object with that id exists
///
/// returns false when the object was already present.
pub(crate) fn store_object(repo: &Repo, dir: &Path, hash: &Hash, bytes: &[u8]) -> Result<bool> {
    let object_path = object_path(dir, hash);
    if object_path.exists() {
        return Ok(false);
    }
    write_atomic(repo, &object_path, bytes)?;
    Ok(true)
}

/// replace `path` with `bytes`: temp file, fsync, rename, fsync parent
///
/// readers see either the old file or the complete new one.
pub(crate) fn write_atomic(repo: &Repo, path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(path);
    fs::create_dir_all(parent).with_path(parent)?;

    let tmp_path = repo.tmp_path().join(uuid::Uuid::new_v4().to_string());
    {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        tmp_file.write_all(bytes).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_path(path);
    }
    fsync_dir(parent)
}

/// read a stored object, mapping a missing file to ObjectNotFound
pub(crate) fn load_object(path: &Path, hash: &Hash) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ObjectNotFound(*hash)
        } else {
            Error::StorageUnavailable {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

pub(crate) fn object_path(dir: &Path, hash: &Hash) -> PathBuf {
    let (prefix, file) = hash.to_path_components();
    dir.join(prefix).join(file)
}

/// zstd level 3 - fast, reasonable ratio
pub(crate) fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    zstd::encode_all(bytes, 3).with_path("<zstd>")
}

pub(crate) fn decompress(bytes: &[u8], hash: &Hash) -> Result<Vec<u8>> {
    zstd::decode_all(bytes)
        .map_err(|e| Error::Unparseable(format!("object {}: {}", hash, e)))
}

/// fsync a directory
fn fsync_dir(path: &Path) -> Result<()> {
    let dir = File::open(path).with_path(path)?;
    dir.sync_all().with_path(path)?;
    Ok(())
}
