use std::fs::File;
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::ignore::IgnoreRules;

/// name of the store directory inside the working tree
pub const STORE_DIR: &str = ".cset";

/// a working tree plus its object store
///
/// the working tree at `root` is the real filesystem that untracked and
/// ignored paths fall back to. the store lives in `root/.cset`.
#[derive(Debug)]
pub struct Repo {
    root: PathBuf,
    path: PathBuf,
    config: Config,
    ignore: IgnoreRules,
}

impl Repo {
    /// initialize a new store for the working tree at `root`
    pub fn init(root: &Path) -> Result<Self> {
        Self::init_with_config(root, Config::default())
    }

    /// initialize with an explicit configuration
    pub fn init_with_config(root: &Path, config: Config) -> Result<Self> {
        let path = root.join(STORE_DIR);
        let config_path = path.join("config.toml");
        if config_path.exists() {
            return Err(Error::RepoExists(root.to_path_buf()));
        }

        // create directory structure
        std::fs::create_dir_all(path.join("objects/blobs")).with_path(&path)?;
        std::fs::create_dir_all(path.join("objects/trees")).with_path(&path)?;
        std::fs::create_dir_all(path.join("objects/commits")).with_path(&path)?;
        std::fs::create_dir_all(path.join("refs/heads")).with_path(&path)?;
        std::fs::create_dir_all(path.join("tmp")).with_path(&path)?;

        config.save(&config_path)?;
        tracing::info!(root = %root.display(), "initialized changeset store");

        Self::from_parts(root, path, config)
    }

    /// open an existing store
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(STORE_DIR);
        let config_path = path.join("config.toml");
        if !config_path.exists() {
            return Err(Error::NoRepo(root.to_path_buf()));
        }

        let config = Config::load(&config_path)?;
        Self::from_parts(root, path, config)
    }

    fn from_parts(root: &Path, path: PathBuf, config: Config) -> Result<Self> {
        let ignore = IgnoreRules::load(root, &config.ignore)?;
        Ok(Self {
            root: root.to_path_buf(),
            path,
            config,
            ignore,
        })
    }

    /// working tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// store directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// repository configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// ignore policy for this working tree
    pub fn ignore(&self) -> &IgnoreRules {
        &self.ignore
    }

    /// replace the configuration, persist it and reload the ignore policy
    pub fn set_config(&mut self, config: Config) -> Result<()> {
        config.save(&self.config_path())?;
        self.ignore = IgnoreRules::load(&self.root, &config.ignore)?;
        self.config = config;
        Ok(())
    }

    /// path to config.toml
    pub fn config_path(&self) -> PathBuf {
        self.path.join("config.toml")
    }

    /// path to objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.path.join("objects")
    }

    /// path to blobs directory
    pub fn blobs_path(&self) -> PathBuf {
        self.objects_path().join("blobs")
    }

    /// path to trees directory
    pub fn trees_path(&self) -> PathBuf {
        self.objects_path().join("trees")
    }

    /// path to commits directory
    pub fn commits_path(&self) -> PathBuf {
        self.objects_path().join("commits")
    }

    /// path to branch refs directory
    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs/heads")
    }

    /// path to tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.path.join("tmp")
    }

    /// path to lock file
    pub fn lock_path(&self) -> PathBuf {
        self.path.join(".lock")
    }

    /// acquire exclusive lock on repository, waiting for other holders
    /// returns a guard that releases the lock on drop
    pub fn lock(&self) -> Result<RepoLock> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        let flock = Flock::lock(file, FlockArg::LockExclusive)
            .map_err(|_| Error::LockContention)?;

        Ok(RepoLock { flock })
    }

    /// try to acquire exclusive lock, returning None if already locked
    pub fn try_lock(&self) -> Result<Option<RepoLock>> {
        let lock_path = self.lock_path();
        let file = File::create(&lock_path).with_path(&lock_path)?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(flock) => Ok(Some(RepoLock { flock })),
            Err((_, nix::errno::Errno::EWOULDBLOCK)) => Ok(None),
            Err(_) => Err(Error::LockContention),
        }
    }
}

/// guard that holds repository lock until dropped
pub struct RepoLock {
    #[allow(dead_code)]
    flock: Flock<File>,
}
// lock is released automatically when Flock is dropped

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_repo_init() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        let store = dir.path().join(STORE_DIR);
        assert!(store.join("objects/blobs").is_dir());
        assert!(store.join("objects/trees").is_dir());
        assert!(store.join("objects/commits").is_dir());
        assert!(store.join("refs/heads").is_dir());
        assert!(store.join("tmp").is_dir());
        assert!(store.join("config.toml").is_file());
        assert_eq!(repo.root(), dir.path());
        assert_eq!(repo.path(), store);
    }

    #[test]
    fn test_repo_init_already_exists() {
        let dir = tempdir().unwrap();
        Repo::init(dir.path()).unwrap();
        let result = Repo::init(dir.path());
        assert!(matches!(result, Err(Error::RepoExists(_))));
    }

    #[test]
    fn test_repo_open() {
        let dir = tempdir().unwrap();
        Repo::init(dir.path()).unwrap();
        let repo = Repo::open(dir.path()).unwrap();
        assert_eq!(repo.root(), dir.path());
        assert_eq!(repo.config().default_branch, "master");
    }

    #[test]
    fn test_repo_open_not_found() {
        let dir = tempdir().unwrap();
        let result = Repo::open(&dir.path().join("nonexistent"));
        assert!(matches!(result, Err(Error::NoRepo(_))));
    }

    #[test]
    fn test_store_dir_is_ignored() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();
        assert!(repo.ignore().is_ignored(".cset/config.toml"));
    }

    #[test]
    fn test_repo_lock() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        let lock = repo.lock().unwrap();
        assert!(repo.try_lock().unwrap().is_none());
        drop(lock);
        assert!(repo.try_lock().unwrap().is_some());
    }

    #[test]
    fn test_set_config_persists() {
        let dir = tempdir().unwrap();
        let mut repo = Repo::init(dir.path()).unwrap();

        let mut config = repo.config().clone();
        config.default_branch = "published".to_string();
        config.ignore.push("*.log".to_string());
        repo.set_config(config).unwrap();
        assert!(repo.ignore().is_ignored("debug.log"));

        let reopened = Repo::open(dir.path()).unwrap();
        assert_eq!(reopened.config().default_branch, "published");
    }
}
