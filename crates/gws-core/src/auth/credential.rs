//! Credential types and the token state model.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::provider::{OAuthTokens, TOKEN_ENDPOINT};

/// Refresh this many seconds before the recorded expiry.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Keys an authorized-user token file must carry.
const REQUIRED_FIELDS: &[&str] = &["refresh_token", "client_id", "client_secret"];

/// An OAuth credential in the "authorized user" JSON shape.
///
/// Replaced wholesale on refresh or re-authorization, never edited in place.
#[derive(Clone, PartialEq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    #[serde(rename = "token", alias = "access_token", default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    #[zeroize(skip)]
    pub token_uri: String,
    #[serde(default)]
    #[zeroize(skip)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default, deserialize_with = "scopes_list")]
    #[zeroize(skip)]
    pub scopes: Vec<String>,
    /// RFC 3339 expiry of the access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[zeroize(skip)]
    pub expiry: Option<String>,
}

// Secrets never reach logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl Credential {
    /// Parse a token file. Fails when the content is not JSON or lacks the
    /// authorized-user fields.
    pub fn from_json(data: &[u8]) -> Result<Self, String> {
        let value: serde_json::Value =
            serde_json::from_slice(data).map_err(|e| format!("not valid JSON: {}", e))?;
        let object = value
            .as_object()
            .ok_or_else(|| "expected a JSON object".to_string())?;

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "authorized user info was not in the expected format, missing fields {}",
                missing.join(", ")
            ));
        }

        serde_json::from_value(value).map_err(|e| format!("malformed token: {}", e))
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }

    /// Expired, or expiring within `margin_secs`. No expiry means it never expires.
    pub fn is_expiring(&self, margin_secs: i64) -> bool {
        match &self.expiry {
            Some(expiry) => is_token_expiring(expiry, margin_secs),
            None => false,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expiring(EXPIRY_MARGIN_SECS)
    }

    /// Build the credential that replaces this one after a refresh.
    pub fn refreshed(&self, tokens: OAuthTokens) -> Credential {
        Credential {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens
                .refresh_token
                .clone()
                .or_else(|| self.refresh_token.clone()),
            token_uri: self.token_uri.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes: if tokens.scopes.is_empty() {
                self.scopes.clone()
            } else {
                tokens.scopes.clone()
            },
            expiry: Some(tokens.expiry.clone()),
        }
    }
}

/// Outcome of reading a token file. Kept distinct so callers can tell
/// "never existed" from "existed but unreadable".
#[derive(Debug)]
pub enum TokenLoad {
    Found(Credential),
    Absent,
    Corrupt(String),
}

/// Lifecycle state of the persisted credential.
#[derive(Debug)]
pub enum CredentialState {
    NoToken,
    Valid(Credential),
    ExpiredRefreshable(Credential),
    ExpiredNonRefreshable(Credential),
    Invalid(String),
}

impl From<TokenLoad> for CredentialState {
    fn from(load: TokenLoad) -> Self {
        match load {
            TokenLoad::Absent => CredentialState::NoToken,
            TokenLoad::Corrupt(reason) => CredentialState::Invalid(reason),
            TokenLoad::Found(credential) if credential.is_valid() => {
                CredentialState::Valid(credential)
            }
            TokenLoad::Found(credential) if credential.has_refresh_token() => {
                CredentialState::ExpiredRefreshable(credential)
            }
            TokenLoad::Found(credential) => CredentialState::ExpiredNonRefreshable(credential),
        }
    }
}

fn default_token_uri() -> String {
    TOKEN_ENDPOINT.to_string()
}

// Accept both a JSON list and a space-separated string.
fn scopes_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scopes {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<Scopes>::deserialize(deserializer)? {
        Some(Scopes::List(list)) => list,
        Some(Scopes::Joined(joined)) => joined.split_whitespace().map(String::from).collect(),
        None => Vec::new(),
    })
}

/// Check whether a token's expiry (RFC 3339) is within `margin_secs` of now.
pub fn is_token_expiring(expiry: &str, margin_secs: i64) -> bool {
    match chrono::DateTime::parse_from_rfc3339(expiry) {
        Ok(exp) => {
            let now = chrono::Utc::now();
            let remaining = exp.signed_duration_since(now).num_seconds();
            remaining < margin_secs
        }
        Err(_) => true, // unparseable ⇒ treat as expired
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn expiry_in(secs: i64) -> String {
        (chrono::Utc::now() + chrono::Duration::seconds(secs))
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }

    pub(crate) fn credential(access: &str, refresh: Option<&str>, expires_in: i64) -> Credential {
        Credential {
            access_token: access.to_string(),
            refresh_token: refresh.map(String::from),
            token_uri: TOKEN_ENDPOINT.to_string(),
            client_id: "client.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/documents".to_string()],
            expiry: Some(expiry_in(expires_in)),
        }
    }

    #[test]
    fn test_parse_google_auth_token_file() {
        let data = br#"{
            "token": "ya29.a0",
            "refresh_token": "1//0e",
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "shh",
            "scopes": ["https://www.googleapis.com/auth/drive"],
            "universe_domain": "googleapis.com",
            "account": "",
            "expiry": "2030-01-01T00:00:00.123456Z"
        }"#;
        let credential = Credential::from_json(data).unwrap();
        assert_eq!(credential.access_token, "ya29.a0");
        assert!(credential.has_refresh_token());
        assert!(credential.is_valid());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let err = Credential::from_json(br#"{"token": "ya29"}"#).unwrap_err();
        assert!(err.contains("refresh_token"));
        assert!(err.contains("client_secret"));
        assert!(Credential::from_json(b"garbage").is_err());
    }

    #[test]
    fn test_null_refresh_token_is_non_refreshable() {
        let data = br#"{"token": "t", "refresh_token": null, "client_id": "c",
            "client_secret": "s", "expiry": "2000-01-01T00:00:00Z"}"#;
        let state = CredentialState::from(TokenLoad::Found(Credential::from_json(data).unwrap()));
        assert!(matches!(state, CredentialState::ExpiredNonRefreshable(_)));
    }

    #[test]
    fn test_space_separated_scopes() {
        let data = br#"{"token": "t", "refresh_token": "r", "client_id": "c",
            "client_secret": "s", "scopes": "a b"}"#;
        assert_eq!(Credential::from_json(data).unwrap().scopes, vec!["a", "b"]);
    }

    #[test]
    fn test_state_classification() {
        assert!(matches!(
            CredentialState::from(TokenLoad::Absent),
            CredentialState::NoToken
        ));
        assert!(matches!(
            CredentialState::from(TokenLoad::Corrupt("bad".into())),
            CredentialState::Invalid(_)
        ));
        assert!(matches!(
            CredentialState::from(TokenLoad::Found(credential("a", Some("r"), 3600))),
            CredentialState::Valid(_)
        ));
        assert!(matches!(
            CredentialState::from(TokenLoad::Found(credential("a", Some("r"), -10))),
            CredentialState::ExpiredRefreshable(_)
        ));
        // inside the safety margin counts as expired
        assert!(matches!(
            CredentialState::from(TokenLoad::Found(credential("a", None, 30))),
            CredentialState::ExpiredNonRefreshable(_)
        ));
    }

    #[test]
    fn test_refreshed_keeps_refresh_token() {
        let old = credential("old", Some("r1"), -10);
        let new = old.refreshed(OAuthTokens {
            access_token: "new".into(),
            refresh_token: None,
            token_type: "Bearer".into(),
            expiry: expiry_in(3600),
            scopes: vec![],
        });
        assert_eq!(new.access_token, "new");
        assert_eq!(new.refresh_token.as_deref(), Some("r1"));
        assert_eq!(new.scopes, old.scopes);
        assert!(new.is_valid());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let printed = format!("{:?}", credential("ya29.secret", Some("1//refresh"), 60));
        assert!(!printed.contains("ya29.secret"));
        assert!(!printed.contains("1//refresh"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn test_expiring_unparseable_is_expired() {
        assert!(is_token_expiring("not-a-date", 0));
    }
}
