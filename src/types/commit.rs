use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// role of a commit in a changeset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitKind {
    /// first commit of a branch, seeded from the working tree; never amended
    Start,
    /// provisional; the next mutation replaces it instead of stacking on it
    Pending,
    /// settled history
    Final,
}

impl fmt::Display for CommitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitKind::Start => write!(f, "start"),
            CommitKind::Pending => write!(f, "pending"),
            CommitKind::Final => write!(f, "final"),
        }
    }
}

/// identity recorded on commits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
}

impl Signature {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// a commit object pointing to a root tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// root tree hash
    pub tree: Hash,
    /// parent commit (none for a root commit)
    pub parent: Option<Hash>,
    pub kind: CommitKind,
    pub author: Signature,
    pub committer: Signature,
    /// unix timestamp (seconds since epoch)
    pub timestamp: i64,
    pub message: String,
}

impl Commit {
    /// create a new commit stamped with the current time
    pub fn new(
        tree: Hash,
        parent: Option<Hash>,
        kind: CommitKind,
        author: Signature,
        committer: Signature,
        message: impl Into<String>,
    ) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self::with_timestamp(tree, parent, kind, author, committer, timestamp, message)
    }

    /// create a new commit with explicit timestamp
    pub fn with_timestamp(
        tree: Hash,
        parent: Option<Hash>,
        kind: CommitKind,
        author: Signature,
        committer: Signature,
        timestamp: i64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parent,
            kind,
            author,
            committer,
            timestamp,
            message: message.into(),
        }
    }

    /// is this an initial commit (no parent)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// can this commit be replaced by the next mutation
    pub fn is_pending(&self) -> bool {
        self.kind == CommitKind::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig() -> Signature {
        Signature::new("Jane", "jane@example.org")
    }

    #[test]
    fn test_commit_new() {
        let c = Commit::new(Hash::ZERO, None, CommitKind::Start, sig(), sig(), "start");
        assert_eq!(c.tree, Hash::ZERO);
        assert!(c.is_root());
        assert!(!c.is_pending());
        assert!(c.timestamp > 0);
    }

    #[test]
    fn test_pending_commit() {
        let c = Commit::new(Hash::ZERO, Some(Hash::ZERO), CommitKind::Pending, sig(), sig(), "");
        assert!(c.is_pending());
        assert!(!c.is_root());
    }

    #[test]
    fn test_signature_display() {
        assert_eq!(sig().to_string(), "Jane <jane@example.org>");
    }

    #[test]
    fn test_commit_cbor_determinism() {
        let c1 = Commit::with_timestamp(Hash::ZERO, None, CommitKind::Final, sig(), sig(), 7, "m");
        let c2 = c1.clone();

        let mut bytes1 = Vec::new();
        let mut bytes2 = Vec::new();
        ciborium::into_writer(&c1, &mut bytes1).unwrap();
        ciborium::into_writer(&c2, &mut bytes2).unwrap();
        assert_eq!(bytes1, bytes2);

        let parsed: Commit = ciborium::from_reader(&bytes1[..]).unwrap();
        assert_eq!(parsed, c1);
    }
}
