//! filesystem adapter
//!
//! presents a working tree as files and directories. paths tracked on the
//! selected branch are read and written through [`crate::ops`]; ignored and
//! untracked paths fall through to the real filesystem.

mod disk;
mod node;
mod policy;
mod tree;

pub use node::{Backing, Directory, File, Node};
pub use policy::check_write;
pub use tree::VersionedTree;
