//! Path Utilities
//!
//! Resolution of the gws base directory and the fixed files beneath it.

use std::path::PathBuf;

use super::error::GwsError;
use super::GwsResult;

/// Environment variable overriding the base directory.
pub const CONFIG_DIR_ENV: &str = "GWS_CONFIG_DIR";

pub const CONFIG_FILE: &str = "gws_config.json";
pub const TOKEN_FILE: &str = "token.json";
pub const CLIENT_SECRET_FILE: &str = "client_secret.json";
pub const ACCOUNTS_DIR: &str = "accounts";
pub const ACCOUNT_CONFIG_FILE: &str = "config.json";

/// Default base directory (`~/.claude/.google-workspace/`)
pub fn default_base_dir() -> GwsResult<PathBuf> {
    let home = dirs::home_dir().ok_or(GwsError::NoHomeDir)?;
    Ok(home.join(".claude").join(".google-workspace"))
}

/// Pick the base directory: explicit value, then `GWS_CONFIG_DIR`, then the default.
pub fn resolve_base_dir(explicit: Option<PathBuf>, env_value: Option<String>) -> GwsResult<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    match env_value {
        Some(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(dir)),
        _ => default_base_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let dir = resolve_base_dir(Some(PathBuf::from("/tmp/a")), Some("/tmp/b".into())).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/a"));
    }

    #[test]
    fn test_env_dir_used_when_no_flag() {
        let dir = resolve_base_dir(None, Some("/tmp/b".into())).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/b"));
    }

    #[test]
    fn test_blank_env_falls_back_to_default() {
        let dir = resolve_base_dir(None, Some("  ".into())).unwrap();
        assert!(dir.ends_with(".claude/.google-workspace"));
    }
}
