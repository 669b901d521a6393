//! the changeset engine
//!
//! every mutation runs the same pipeline: make sure the branch exists,
//! resolve the build point, load the trees on the path, apply the edit,
//! rewrite the trees bottom-up, write a pending commit and publish it with a
//! compare-and-swap on the branch ref.

mod assemble;
mod changeset;
mod edit;
mod fsck;
mod history;
mod path;
mod query;
mod resolve;

pub use assemble::{apply_entry_change, create_commit, publish, EntryChange, RebuiltPath};
pub use changeset::{ensure_branch, finalize, resolve_build_point, seed_commit, BuildPoint};
pub use edit::{copy, mk_dir, rename, unlink, write_file, write_file_encoded};
pub use fsck::{fsck, CorruptObject, FsckReport, MissingObject, ObjectType};
pub use history::{last_modified, log, LogEntry};
pub use path::normalize_path;
pub use query::{file_size, file_type, is_ignored, read_dir, read_file, was_seeded};
pub use resolve::{file_type_at, lookup_entry, read_tree_at, resolve_path_chain, PathChain};

pub(crate) use path::{join_path, split_parent};
