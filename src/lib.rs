//! cset - content-addressed changesets over a working tree
//!
//! every edit to a file becomes a new commit on a changeset branch. the
//! working tree itself is never touched; it only seeds the first commit of
//! each branch and serves paths the store does not track.
//!
//! # Core concepts
//!
//! - **Blob**: file content, stored once per distinct byte sequence (zstd)
//! - **Tree**: a directory listing in canonical text form (zstd)
//! - **Commit**: a root tree, an optional parent and a kind (CBOR + zstd)
//! - **Branch**: a named pointer to a commit, moved with compare-and-swap
//!
//! # Hash format
//!
//! object id = SHA256(type | ' ' | payload_len | '\0' | payload)
//!
//! where a tree payload is its sorted entries, one
//! `mode kind id\tname` line each.
//!
//! # Example usage
//!
//! ```no_run
//! use cset::{ops, Repo};
//! use std::path::Path;
//!
//! let repo = Repo::init(Path::new("/path/to/workspace")).unwrap();
//!
//! // edit on a changeset branch
//! ops::write_file(&repo, "cs1", "a/b.txt", b"hello").unwrap();
//! let listing = ops::read_dir(&repo, "cs1", "a").unwrap();
//! assert_eq!(listing.len(), 1);
//!
//! // settle the pending commit
//! ops::finalize(&repo, "cs1", "add greeting", None).unwrap();
//! ```

mod config;
mod error;
mod hash;
mod ignore;
mod object;
mod refs;
mod repo;

pub mod fs;
pub mod ops;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use hash::{compute_blob_hash, Hash};
pub use ignore::{IgnoreRules, IGNORE_FILE};
pub use object::{
    blob_exists, blob_size, commit_exists, read_blob, read_commit, read_tree, tree_exists,
    write_blob, write_blob_encoded, write_commit, write_tree,
};
pub use refs::{
    delete_ref, list_refs, read_ref, ref_exists, resolve_ref, try_read_ref, update_ref, write_ref,
};
pub use repo::{Repo, STORE_DIR};
pub use types::{
    Commit, CommitKind, Encoding, FileMode, ObjectKind, Signature, Tree, TreeEntry,
};
