use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::{compress, decompress, load_object, object_path, store_object};
use crate::repo::Repo;
use crate::types::Tree;

/// write a tree to the object store
///
/// the id is computed over the canonical listing; the stored bytes are the
/// listing compressed with zstd.
pub fn write_tree(repo: &Repo, tree: &Tree) -> Result<Hash> {
    let canonical = tree.to_canonical();
    let hash = tree.hash();

    if tree_exists(repo, &hash) {
        return Ok(hash);
    }

    let compressed = compress(canonical.as_bytes())?;
    if store_object(repo, &repo.trees_path(), &hash, &compressed)? {
        tracing::debug!(tree = %hash.short(), entries = tree.len(), "stored tree");
    }
    Ok(hash)
}

/// read a tree from the object store
pub fn read_tree(repo: &Repo, hash: &Hash) -> Result<Tree> {
    let compressed = load_object(&tree_path(repo, hash), hash)?;
    let bytes = decompress(&compressed, hash)?;

    let listing = String::from_utf8(bytes)
        .map_err(|_| Error::Unparseable(format!("tree {} is not utf-8", hash)))?;
    let tree = Tree::parse(&listing)?;

    // verify hash
    if tree.hash() != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    Ok(tree)
}

/// get the filesystem path to a tree object
pub fn tree_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(&repo.trees_path(), hash)
}

/// check if a tree exists in the object store
pub fn tree_exists(repo: &Repo, hash: &Hash) -> bool {
    tree_path(repo, hash).exists()
}
