use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};
use crate::types::Signature;

/// repository configuration stored in config.toml
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// the published branch
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// identity recorded as author when callers pass none
    #[serde(default = "default_author")]
    pub author: Signature,
    #[serde(default = "default_committer")]
    pub committer: Signature,
    /// glob patterns for paths kept out of the store
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    /// refuse tracked writes without a branch or against the default branch
    #[serde(default = "default_true")]
    pub lock_default_branch: bool,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_author() -> Signature {
    Signature::new("John Doe", "john@me.doe")
}

fn default_committer() -> Signature {
    Signature::new("Lively ChangeSets", "unknown-user@lively-web.local")
}

fn default_ignore() -> Vec<String> {
    [".svn", ".git", "node_modules", ".DS_Store"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            author: default_author(),
            committer: default_committer(),
            ignore: default_ignore(),
            lock_default_branch: true,
        }
    }
}
