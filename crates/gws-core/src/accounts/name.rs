//! Account name validation.
//!
//! Account names become a single directory name under `accounts/`, so only
//! ASCII letters, digits, `-` and `_` are accepted.

use crate::common::{GwsError, GwsResult};

/// One path segment on common filesystems.
pub const MAX_ACCOUNT_NAME_LEN: usize = 255;

/// Reject names that cannot safely become one path segment.
pub fn validate_account_name(name: &str) -> GwsResult<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_ACCOUNT_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(GwsError::InvalidName(name.to_string()))
    }
}
