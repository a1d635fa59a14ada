use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::WritePolicy;

/// Name of the per-project vault directory
pub const VAULT_DIR: &str = ".promptvault";
/// Environment variable pointing at the directory that holds `.promptvault/`
pub const HOME_ENV: &str = "PROMPTVAULT_HOME";

const CONFIG_FILE: &str = "config.json";

/// Storage settings, read from `.promptvault/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// SQLite file of the primary backend, relative to the vault directory
    pub primary_db: String,
    /// Directory of the JSON fallback backend, relative to the vault directory
    pub fallback_dir: String,
    pub write_policy: WritePolicy,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            primary_db: "vault.db".to_string(),
            fallback_dir: "fallback".to_string(),
            write_policy: WritePolicy::Concurrent,
        }
    }
}

impl VaultConfig {
    /// Load the config for a vault directory. A missing file means defaults.
    pub fn load(vault_dir: &Path) -> Result<Self> {
        let path = vault_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, vault_dir: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(vault_dir.join(CONFIG_FILE), text)?;
        Ok(())
    }

    pub fn primary_path(&self, vault_dir: &Path) -> PathBuf {
        vault_dir.join(&self.primary_db)
    }

    pub fn fallback_path(&self, vault_dir: &Path) -> PathBuf {
        vault_dir.join(&self.fallback_dir)
    }
}

/// Find the directory that owns (or should own) `.promptvault/`.
///
/// `PROMPTVAULT_HOME` wins when set; otherwise walk up from the current
/// directory, falling back to the current directory itself.
pub fn find_vault_root() -> PathBuf {
    if let Some(home) = env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(VAULT_DIR).exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}
