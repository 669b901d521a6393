mod commit;
mod encoding;
mod tree;

pub use commit::{Commit, CommitKind, Signature};
pub use encoding::Encoding;
pub(crate) use tree::validate_entry_name;
pub use tree::{FileMode, ObjectKind, Tree, TreeEntry};
