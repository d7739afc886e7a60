//! Configuration Store
//!
//! Owns the on-disk layout rooted at the base directory:
//!
//! ```text
//! <base>/gws_config.json            global configuration (+ accounts registry)
//! <base>/token.json                 legacy single-identity token
//! <base>/client_secret.json         OAuth client, shared by all accounts
//! <base>/accounts/<name>/config.json
//! <base>/accounts/<name>/token.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::overrides::AccountOverride;
use super::GlobalConfig;
use crate::accounts::validate_account_name;
use crate::common::fs::{read_json, remove_if_exists, write_json};
use crate::common::paths::{
    ACCOUNTS_DIR, ACCOUNT_CONFIG_FILE, CLIENT_SECRET_FILE, CONFIG_FILE, TOKEN_FILE,
};
use crate::common::{GwsError, GwsResult};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    base_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    pub fn client_secret_path(&self) -> PathBuf {
        self.base_dir.join(CLIENT_SECRET_FILE)
    }

    pub fn legacy_token_path(&self) -> PathBuf {
        self.base_dir.join(TOKEN_FILE)
    }

    /// Storage directory of a named account. The name is validated first.
    pub fn account_dir(&self, name: &str) -> GwsResult<PathBuf> {
        validate_account_name(name)?;
        Ok(self.base_dir.join(ACCOUNTS_DIR).join(name))
    }

    /// Token location for an account, or the legacy path when there is none.
    /// This is the only place token paths are derived.
    pub fn token_path(&self, account: Option<&str>) -> GwsResult<PathBuf> {
        match account {
            Some(name) => Ok(self.account_dir(name)?.join(TOKEN_FILE)),
            None => Ok(self.legacy_token_path()),
        }
    }

    fn override_path(&self, name: &str) -> GwsResult<PathBuf> {
        Ok(self.account_dir(name)?.join(ACCOUNT_CONFIG_FILE))
    }

    // ── Global configuration ────────────────────────────────────────────────

    /// Load the global configuration; defaults when the file does not exist.
    pub fn load(&self) -> GwsResult<GlobalConfig> {
        let path = self.config_path();
        let config = read_json::<GlobalConfig>(&path)?.unwrap_or_default();
        debug!(
            path = %path.display(),
            multi_account = config.is_multi_account(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn save(&self, config: &GlobalConfig) -> GwsResult<()> {
        write_json(&self.config_path(), config, false)
    }

    // ── Account storage ─────────────────────────────────────────────────────

    pub fn create_account_dir(&self, name: &str) -> GwsResult<PathBuf> {
        let dir = self.account_dir(name)?;
        fs::create_dir_all(&dir).map_err(|e| GwsError::io(&dir, e))?;
        Ok(dir)
    }

    /// Delete an account's directory with its token and override files.
    pub fn remove_account_dir(&self, name: &str) -> GwsResult<()> {
        let dir = self.account_dir(name)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                info!("Removed account directory {:?}", dir);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GwsError::io(dir, e)),
        }
    }

    // ── Overrides ───────────────────────────────────────────────────────────

    /// Load an account's overrides; an absent file is an empty override.
    pub fn load_override(&self, name: &str) -> GwsResult<AccountOverride> {
        Ok(read_json(&self.override_path(name)?)?.unwrap_or_default())
    }

    pub fn save_override(&self, name: &str, overrides: &AccountOverride) -> GwsResult<()> {
        let path = self.override_path(name)?;
        write_json(&path, overrides, false)?;
        info!("Saved overrides for account '{}'", name);
        Ok(())
    }

    /// Load an account's overrides, apply `edit`, and save the result.
    pub fn update_override<T>(
        &self,
        name: &str,
        edit: impl FnOnce(&mut AccountOverride) -> T,
    ) -> GwsResult<(AccountOverride, T)> {
        let mut overrides = self.load_override(name)?;
        let outcome = edit(&mut overrides);
        self.save_override(name, &overrides)?;
        Ok((overrides, outcome))
    }

    /// Remove an account's overrides so it inherits everything from global.
    pub fn clear_override(&self, name: &str) -> GwsResult<bool> {
        remove_if_exists(&self.override_path(name)?)
    }
}
