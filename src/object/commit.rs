use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::hash::{compute_object_hash, Hash};
use crate::object::{compress, decompress, load_object, object_path, store_object};
use crate::repo::Repo;
use crate::types::Commit;

/// write a commit to the object store
///
/// commits are serialized as CBOR; the id covers the CBOR bytes and the
/// stored file is the zstd-compressed CBOR.
pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<Hash> {
    let mut cbor_bytes = Vec::new();
    ciborium::into_writer(commit, &mut cbor_bytes)?;

    let hash = compute_object_hash("commit", &cbor_bytes);
    if commit_exists(repo, &hash) {
        return Ok(hash);
    }

    let compressed = compress(&cbor_bytes)?;
    store_object(repo, &repo.commits_path(), &hash, &compressed)?;
    tracing::debug!(commit = %hash.short(), kind = %commit.kind, "stored commit");

    Ok(hash)
}

/// read a commit from the object store
pub fn read_commit(repo: &Repo, hash: &Hash) -> Result<Commit> {
    let compressed = load_object(&commit_path(repo, hash), hash)?;
    let cbor_bytes = decompress(&compressed, hash)?;

    // verify hash
    if compute_object_hash("commit", &cbor_bytes) != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    let commit: Commit = ciborium::from_reader(&cbor_bytes[..])?;
    Ok(commit)
}

/// get the filesystem path to a commit object
pub fn commit_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(&repo.commits_path(), hash)
}

/// check if a commit exists in the object store
pub fn commit_exists(repo: &Repo, hash: &Hash) -> bool {
    commit_path(repo, hash).exists()
}
