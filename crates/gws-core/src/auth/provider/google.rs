//! Google OAuth2 Provider
//!
//! PKCE authorization-code flow and refresh-token grant against Google's
//! token endpoint.

use std::collections::HashMap;

use tracing::{debug, error};

use super::{OAuthProvider, OAuthTokens};
use crate::auth::credential::Credential;
use crate::common::{create_http_client, GwsError, GwsResult};

// ── Google OAuth endpoints ──────────────────────────────────────────────────

pub const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/auth";
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Google OAuth2 provider.
///
/// Client credentials are optional for refresh: the credential being
/// refreshed carries its own.
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

impl Default for GoogleProvider {
    fn default() -> Self {
        Self::with_credentials(String::new(), String::new())
    }
}

impl GoogleProvider {
    pub fn with_credentials(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            auth_uri: AUTH_ENDPOINT.to_string(),
            token_uri: TOKEN_ENDPOINT.to_string(),
        }
    }

    /// Override the endpoints, e.g. with those from a client secret file.
    pub fn with_endpoints(mut self, auth_uri: String, token_uri: String) -> Self {
        self.auth_uri = auth_uri;
        self.token_uri = token_uri;
        self
    }

    /// Build the authorization URL for the PKCE flow.
    pub fn authorize_url(
        &self,
        scopes: &[String],
        state: &str,
        code_challenge: &str,
        redirect_uri: &str,
    ) -> String {
        let scope_str = scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&code_challenge={}&code_challenge_method=S256&access_type=offline&prompt=consent",
            self.auth_uri,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope_str),
            urlencoding::encode(state),
            urlencoding::encode(code_challenge),
        )
    }
}

impl OAuthProvider for GoogleProvider {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> GwsResult<OAuthTokens> {
        debug!("Exchanging authorization code for tokens");

        let mut params = HashMap::new();
        params.insert("client_id", self.client_id.as_str());
        params.insert("client_secret", self.client_secret.as_str());
        params.insert("code", code);
        params.insert("code_verifier", code_verifier);
        params.insert("grant_type", "authorization_code");
        params.insert("redirect_uri", redirect_uri);

        let response = post_form(&self.token_uri, &params).await?;
        parse_token_response(&response)
    }

    async fn refresh_token(&self, credential: &Credential) -> GwsResult<OAuthTokens> {
        debug!("Refreshing access token");

        let refresh_token = credential
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GwsError::Token("no refresh token available".to_string()))?;

        // Prefer the client recorded with the token, then our own.
        let cid = non_empty_or(&credential.client_id, &self.client_id);
        let csec = non_empty_or(&credential.client_secret, &self.client_secret);
        let token_uri = non_empty_or(&credential.token_uri, &self.token_uri);

        let mut params = HashMap::new();
        params.insert("client_id", cid);
        params.insert("client_secret", csec);
        params.insert("refresh_token", refresh_token);
        params.insert("grant_type", "refresh_token");

        let response = post_form(token_uri, &params).await?;
        parse_token_response(&response)
    }
}

fn non_empty_or<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

// ── HTTP utilities ──────────────────────────────────────────────────────────

/// POST a form-encoded request and return the response body.
///
/// Secrets travel in the request body, never in the URL.
async fn post_form(url: &str, params: &HashMap<&str, &str>) -> GwsResult<String> {
    let client = create_http_client()?;

    let response = client
        .post(url)
        .form(params)
        .send()
        .await
        .map_err(|e| GwsError::Token(format!("HTTP request failed: {}", e)))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GwsError::Token(format!("Failed to read response body: {}", e)))?;

    if !status.is_success() {
        error!("Token endpoint returned HTTP {}", status);
        // Google reports the reason in the JSON body; prefer that.
        return match parse_token_response(&body) {
            Err(e) => Err(e),
            Ok(_) => Err(GwsError::Token(format!("HTTP {}", status))),
        };
    }

    Ok(body)
}

/// Parse a Google OAuth2 token response.
pub(crate) fn parse_token_response(body: &str) -> GwsResult<OAuthTokens> {
    let parsed: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| GwsError::Token(format!("Invalid JSON response: {}", e)))?;

    if let Some(err) = parsed.get("error").and_then(|v| v.as_str()) {
        let desc = parsed
            .get("error_description")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error");
        return Err(GwsError::Token(format!("{}: {}", err, desc)));
    }

    let access_token = parsed
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GwsError::Token("Missing access_token in response".to_string()))?
        .to_string();

    let refresh_token = parsed
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .map(String::from);

    let token_type = parsed
        .get("token_type")
        .and_then(|v| v.as_str())
        .unwrap_or("Bearer")
        .to_string();

    let expires_in = parsed
        .get("expires_in")
        .and_then(|v| v.as_u64())
        .unwrap_or(3600);

    let expiry = (chrono::Utc::now() + chrono::Duration::seconds(expires_in as i64))
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let scopes = parsed
        .get("scope")
        .and_then(|v| v.as_str())
        .map(|s| s.split_whitespace().map(String::from).collect())
        .unwrap_or_default();

    Ok(OAuthTokens {
        access_token,
        refresh_token,
        token_type,
        expiry,
        scopes,
    })
}

// ── PKCE Utilities ──────────────────────────────────────────────────────────

/// Generate a PKCE code verifier (43-128 characters of unreserved URI characters).
pub fn generate_code_verifier() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64_url_encode(&bytes)
}

/// Derive the PKCE code challenge from a code verifier using S256.
pub fn generate_code_challenge(verifier: &str) -> String {
    use sha2::{Digest, Sha256};
    let hash = Sha256::digest(verifier.as_bytes());
    base64_url_encode(&hash)
}

/// Random state string for CSRF protection.
pub fn generate_state() -> String {
    use rand::Rng;
    let bytes: [u8; 16] = rand::rngs::OsRng.gen();
    hex::encode(bytes)
}

/// Base64url encoding (no padding) per RFC 4648 §5.
fn base64_url_encode(data: &[u8]) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    URL_SAFE_NO_PAD.encode(data)
}
