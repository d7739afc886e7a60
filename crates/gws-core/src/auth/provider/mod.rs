//! OAuth Provider Abstraction
//!
//! Token endpoint operations behind a trait so the credential lifecycle can be
//! exercised without network access.

pub mod google;

pub use google::{GoogleProvider, TOKEN_ENDPOINT};

use super::credential::Credential;
use crate::common::GwsResult;

/// Tokens returned from an OAuth token exchange or refresh.
#[derive(Clone)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    /// RFC 3339 expiry.
    pub expiry: String,
    pub scopes: Vec<String>,
}

/// Token endpoint client.
#[allow(async_fn_in_trait)]
pub trait OAuthProvider {
    /// Exchange an authorization code for tokens.
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> GwsResult<OAuthTokens>;

    /// Exchange the credential's refresh token for a new access token.
    async fn refresh_token(&self, credential: &Credential) -> GwsResult<OAuthTokens>;
}
