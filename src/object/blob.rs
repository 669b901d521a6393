use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::hash::{compute_blob_hash, Hash};
use crate::object::{load_object, object_path, store_object};
use crate::repo::Repo;
use crate::types::Encoding;

/// write a blob to the object store
///
/// writing identical content twice returns the same id and stores it once.
pub fn write_blob(repo: &Repo, content: &[u8]) -> Result<Hash> {
    let hash = compute_blob_hash(content);
    if store_object(repo, &repo.blobs_path(), &hash, content)? {
        tracing::debug!(blob = %hash.short(), size = content.len(), "stored blob");
    }
    Ok(hash)
}

/// decode textual content with `encoding` and write it as a blob
pub fn write_blob_encoded(repo: &Repo, text: &str, encoding: Encoding) -> Result<Hash> {
    let bytes = encoding.decode(text)?;
    write_blob(repo, &bytes)
}

/// get the filesystem path to a blob
pub fn blob_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(&repo.blobs_path(), hash)
}

/// check if a blob exists in the object store
pub fn blob_exists(repo: &Repo, hash: &Hash) -> bool {
    blob_path(repo, hash).exists()
}

/// read blob content
pub fn read_blob(repo: &Repo, hash: &Hash) -> Result<Vec<u8>> {
    load_object(&blob_path(repo, hash), hash)
}

/// blob size in bytes, without reading the content
pub fn blob_size(repo: &Repo, hash: &Hash) -> Result<u64> {
    let path = blob_path(repo, hash);
    match fs::metadata(&path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::ObjectNotFound(*hash)),
        Err(e) => Err(Error::StorageUnavailable { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use walkdir::WalkDir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn count_blobs(repo: &Repo) -> usize {
        WalkDir::new(repo.blobs_path())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count()
    }

    #[test]
    fn test_write_and_read_blob() {
        let (_dir, repo) = test_repo();

        let content = b"hello, world!";
        let hash = write_blob(&repo, content).unwrap();

        assert!(blob_exists(&repo, &hash));
        assert_eq!(read_blob(&repo, &hash).unwrap(), content);
        assert_eq!(blob_size(&repo, &hash).unwrap(), content.len() as u64);
    }

    #[test]
    fn test_blob_deduplication() {
        let (_dir, repo) = test_repo();

        let h1 = write_blob(&repo, b"duplicate content").unwrap();
        let count = count_blobs(&repo);
        let h2 = write_blob(&repo, b"duplicate content").unwrap();

        assert_eq!(h1, h2);
        assert_eq!(count_blobs(&repo), count);
    }

    #[test]
    fn test_empty_blob() {
        let (_dir, repo) = test_repo();
        let hash = write_blob(&repo, b"").unwrap();
        assert_eq!(read_blob(&repo, &hash).unwrap(), b"");
        assert_eq!(blob_size(&repo, &hash).unwrap(), 0);
    }

    #[test]
    fn test_blob_path_structure() {
        let (_dir, repo) = test_repo();

        let hash = write_blob(&repo, b"test").unwrap();
        let path = blob_path(&repo, &hash);

        // path should be blobs/XX/YYYY...
        let hex = hash.to_hex();
        assert!(path.ends_with(format!("{}/{}", &hex[..2], &hex[2..])));
    }

    #[test]
    fn test_read_nonexistent_blob() {
        let (_dir, repo) = test_repo();

        let result = read_blob(&repo, &Hash::ZERO);
        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
        assert!(matches!(blob_size(&repo, &Hash::ZERO), Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_encoded_write_matches_raw() {
        let (_dir, repo) = test_repo();

        let raw = write_blob(&repo, b"hello").unwrap();
        let utf8 = write_blob_encoded(&repo, "hello", Encoding::Utf8).unwrap();
        let hex = write_blob_encoded(&repo, "68656c6c6f", Encoding::Hex).unwrap();
        assert_eq!(raw, utf8);
        assert_eq!(raw, hex);
    }

    #[test]
    fn test_unavailable_store() {
        let (dir, repo) = test_repo();
        fs::remove_dir_all(dir.path().join(".cset/tmp")).unwrap();

        let result = write_blob(&repo, b"cannot land");
        assert!(matches!(result, Err(Error::StorageUnavailable { .. })));
    }
}
