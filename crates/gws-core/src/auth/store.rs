//! Token file persistence.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::credential::{Credential, TokenLoad};
use crate::common::fs::{remove_if_exists, write_atomic};
use crate::common::{GwsError, GwsResult};

/// One token file. Writes replace the whole file and are owner-only.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token file. Never fails: unreadable content is reported as
    /// `Corrupt` so the caller can decide to re-authorize.
    pub fn load(&self) -> TokenLoad {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return TokenLoad::Absent,
            Err(e) => {
                warn!("Cannot read token file {:?}: {}", self.path, e);
                return TokenLoad::Corrupt(e.to_string());
            }
        };
        match Credential::from_json(&data) {
            Ok(credential) => TokenLoad::Found(credential),
            Err(reason) => {
                warn!("Ignoring unreadable token file {:?}: {}", self.path, reason);
                TokenLoad::Corrupt(reason)
            }
        }
    }

    pub fn save(&self, credential: &Credential) -> GwsResult<()> {
        let json = serde_json::to_vec_pretty(credential).map_err(|e| GwsError::Config {
            path: self.path.clone(),
            source: e,
        })?;
        write_atomic(&self.path, &json, true)?;
        debug!("Saved token to {:?}", self.path);
        Ok(())
    }

    /// Returns whether a file was removed.
    pub fn delete(&self) -> GwsResult<bool> {
        remove_if_exists(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credential::tests::credential;

    #[test]
    fn test_round_trip_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("accounts/work/token.json"));
        assert!(matches!(store.load(), TokenLoad::Absent));

        let saved = credential("ya29", Some("1//r"), 3600);
        store.save(&saved).unwrap();
        match store.load() {
            TokenLoad::Found(loaded) => assert_eq!(loaded, saved),
            other => panic!("unexpected: {other:?}"),
        }

        assert!(store.delete().unwrap());
        assert!(!store.delete().unwrap());
        assert!(matches!(store.load(), TokenLoad::Absent));
    }

    #[test]
    fn test_written_in_google_auth_shape() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        store.save(&credential("ya29", None, 3600)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["token"], "ya29");
        // kept as null so the file stays loadable
        assert!(raw["refresh_token"].is_null());
        assert!(raw["client_id"].is_string());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        store.save(&credential("ya29", None, 3600)).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(TokenStore::new(&path).load(), TokenLoad::Corrupt(_)));
    }
}
