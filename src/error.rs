use std::path::PathBuf;

use crate::Hash;

/// error type for changeset operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("repository not found at {0}")]
    NoRepo(PathBuf),

    #[error("repository already exists at {0}")]
    RepoExists(PathBuf),

    #[error("branch not found: {0}")]
    RefNotFound(String),

    #[error("invalid branch name: {0}")]
    InvalidRef(String),

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("path already exists: {0}")]
    AlreadyExists(String),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("corrupt object: hash mismatch for {0}")]
    CorruptObject(Hash),

    #[error("unparseable object data: {0}")]
    Unparseable(String),

    #[error("branch {branch} moved: expected {expected}, found {actual}")]
    ReferenceConflict {
        branch: String,
        expected: String,
        actual: String,
    },

    #[error("write locked: {0}")]
    Locked(String),

    #[error("lock contention on repository")]
    LockContention,

    #[error("invalid tree entry name: {0}")]
    InvalidEntryName(String),

    #[error("duplicate tree entry name: {0}")]
    DuplicateEntryName(String),

    #[error("invalid ignore pattern {pattern}: {message}")]
    InvalidIgnorePattern { pattern: String, message: String },

    #[error("content does not match encoding {encoding}: {message}")]
    InvalidEncoding {
        encoding: &'static str,
        message: String,
    },

    #[error("storage unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cbor serialization error: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("cbor deserialization error: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// true when the requested path, branch or object does not exist.
    ///
    /// the filesystem adapter treats these as "not tracked" and falls back
    /// to the real filesystem.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::PathNotFound(_) | Error::RefNotFound(_) | Error::ObjectNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::StorageUnavailable {
            path: path.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::PathNotFound("a/b".into()).is_not_found());
        assert!(Error::RefNotFound("cs1".into()).is_not_found());
        assert!(Error::ObjectNotFound(Hash::ZERO).is_not_found());
        assert!(!Error::Unparseable("junk".into()).is_not_found());
        assert!(!Error::Locked("a".into()).is_not_found());
    }

    #[test]
    fn test_with_path_maps_to_storage_unavailable() {
        let res: std::io::Result<()> = Err(std::io::Error::other("disk gone"));
        let err = res.with_path("/store/objects").unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
        assert!(err.to_string().contains("/store/objects"));
    }
}
