//! Interactive browser authorization.
//!
//! [`LoopbackAuthorizer`] runs the installed-app flow: it binds a callback
//! listener on the loopback interface, opens the consent page, waits for the
//! redirect and exchanges the code. It blocks until the browser calls back;
//! there is no timeout here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use super::credential::Credential;
use super::provider::google::{
    generate_code_challenge, generate_code_verifier, generate_state, AUTH_ENDPOINT,
    TOKEN_ENDPOINT,
};
use super::provider::{GoogleProvider, OAuthProvider};
use crate::common::{GwsError, GwsResult};

/// Callback ports tried in order. Register these redirect URIs for web clients.
pub const CALLBACK_PORTS: std::ops::Range<u16> = 8080..8100;

/// The callback listener binds here and the redirect URI names it too.
const LOOPBACK_IP: &str = "127.0.0.1";

/// Obtains a fresh credential from the user.
#[allow(async_fn_in_trait)]
pub trait InteractiveAuthorizer {
    /// `account` is only used to tell the user which identity to sign in as.
    async fn authorize(&self, scopes: &[String], account: Option<&str>) -> GwsResult<Credential>;
}

// ── Client secret ───────────────────────────────────────────────────────────

/// OAuth client descriptor from `client_secret.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

fn default_auth_uri() -> String {
    AUTH_ENDPOINT.to_string()
}

fn default_token_uri() -> String {
    TOKEN_ENDPOINT.to_string()
}

impl ClientSecret {
    /// Read a Google Cloud client secret file (`installed` or `web` client).
    pub fn load(path: &Path) -> GwsResult<Self> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GwsError::auth_with_details(
                    "Credentials file not found",
                    format!(
                        "Download an OAuth client (Desktop app) from Google Cloud Console and save it to {}",
                        path.display()
                    ),
                ));
            }
            Err(e) => return Err(GwsError::io(path, e)),
        };

        let file: ClientSecretFile = serde_json::from_slice(&data).map_err(|e| {
            GwsError::auth_with_details(
                "Invalid client secret file",
                format!("{}: {}", path.display(), e),
            )
        })?;

        file.installed.or(file.web).ok_or_else(|| {
            GwsError::auth_with_details(
                "Invalid client secret file",
                format!(
                    "{} must contain an \"installed\" or \"web\" client",
                    path.display()
                ),
            )
        })
    }
}

// ── Loopback flow ───────────────────────────────────────────────────────────

pub struct LoopbackAuthorizer {
    client_secret_path: PathBuf,
}

impl LoopbackAuthorizer {
    pub fn new(client_secret_path: impl Into<PathBuf>) -> Self {
        Self {
            client_secret_path: client_secret_path.into(),
        }
    }
}

impl InteractiveAuthorizer for LoopbackAuthorizer {
    async fn authorize(&self, scopes: &[String], account: Option<&str>) -> GwsResult<Credential> {
        let client = ClientSecret::load(&self.client_secret_path)?;
        let provider = GoogleProvider::with_credentials(
            client.client_id.clone(),
            client.client_secret.clone(),
        )
        .with_endpoints(client.auth_uri.clone(), client.token_uri.clone());

        let (listener, port) = bind_callback_listener().await?;
        let redirect_uri = redirect_uri(port);

        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);
        let state = generate_state();
        let auth_url = provider.authorize_url(scopes, &state, &code_challenge, &redirect_uri);

        info!(account = account.unwrap_or("default"), port, "Starting browser authorization");
        if let Some(name) = account {
            eprintln!();
            eprintln!("Authorizing account: {}", name);
            eprintln!("Sign in with the Google account you want to use for '{}'.", name);
        }
        eprintln!();
        eprintln!("Opening browser for authorization. If it does not open, visit:");
        eprintln!("{}", auth_url);
        eprintln!();

        if let Err(e) = open::that(&auth_url) {
            warn!("Failed to open browser automatically: {}", e);
        }

        let code = wait_for_code(&listener, &state).await?;
        let tokens = provider
            .exchange_code(&code, &code_verifier, &redirect_uri)
            .await
            .map_err(|e| {
                GwsError::auth_with_details("Authorization code exchange failed", e.to_string())
            })?;

        info!("Browser authorization complete");
        Ok(Credential {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            token_uri: client.token_uri,
            client_id: client.client_id,
            client_secret: client.client_secret.clone(),
            scopes: if tokens.scopes.is_empty() {
                scopes.to_vec()
            } else {
                tokens.scopes.clone()
            },
            expiry: Some(tokens.expiry.clone()),
        })
    }
}

/// Redirect target for the listener bound by [`bind_callback_listener`].
fn redirect_uri(port: u16) -> String {
    format!("http://{}:{}/", LOOPBACK_IP, port)
}

/// Bind the first free port in [`CALLBACK_PORTS`].
async fn bind_callback_listener() -> GwsResult<(TcpListener, u16)> {
    for port in CALLBACK_PORTS {
        match TcpListener::bind((LOOPBACK_IP, port)).await {
            Ok(listener) => {
                debug!("OAuth callback server listening on port {}", port);
                return Ok((listener, port));
            }
            Err(e) => debug!("Port {} unavailable: {}", port, e),
        }
    }
    Err(GwsError::auth_with_details(
        "No free port for the OAuth callback",
        format!(
            "Ports {}-{} are all in use; free one and retry.",
            CALLBACK_PORTS.start,
            CALLBACK_PORTS.end - 1
        ),
    ))
}

/// Accept connections until the redirect carrying `code` (or `error`) arrives.
async fn wait_for_code(listener: &TcpListener, state: &str) -> GwsResult<String> {
    let callback_err = |e: std::io::Error| GwsError::auth(format!("Callback server error: {}", e));

    loop {
        let (mut socket, _) = listener.accept().await.map_err(callback_err)?;

        let mut request_line = String::new();
        {
            let mut reader = BufReader::new(&mut socket);
            reader
                .read_line(&mut request_line)
                .await
                .map_err(callback_err)?;
            // Drain headers so closing the socket does not reset the reply.
            let mut header = String::new();
            loop {
                header.clear();
                let n = reader.read_line(&mut header).await.map_err(callback_err)?;
                if n == 0 || header.trim_end().is_empty() {
                    break;
                }
            }
        }

        // "GET /path?query HTTP/1.1"
        let Some(target) = request_line.split_whitespace().nth(1) else {
            continue;
        };
        let query = target.split_once('?').map(|(_, q)| q).unwrap_or("");
        let params = parse_query_params(query);

        if let Some(error) = params.get("error") {
            let desc = params
                .get("error_description")
                .map(String::as_str)
                .unwrap_or("Unknown error");
            let html = callback_html(&format!("Authorization failed: {} - {}", error, desc));
            send_response(&mut socket, "400 Bad Request", html)
                .await
                .map_err(callback_err)?;
            return Err(GwsError::auth_with_details(
                "Authorization was denied",
                format!("{}: {}", error, desc),
            ));
        }

        let Some(code) = params.get("code") else {
            // favicon and friends
            send_response(&mut socket, "404 Not Found", String::new())
                .await
                .map_err(callback_err)?;
            continue;
        };

        if params.get("state").map(String::as_str) != Some(state) {
            let html = callback_html("Invalid state parameter. Please try again.");
            send_response(&mut socket, "400 Bad Request", html)
                .await
                .map_err(callback_err)?;
            return Err(GwsError::auth("OAuth state mismatch; authorization aborted"));
        }

        let html = callback_html("Authentication successful! You can close this tab.");
        send_response(&mut socket, "200 OK", html)
            .await
            .map_err(callback_err)?;
        return Ok(code.clone());
    }
}

/// Parse URL query parameters into a HashMap
fn parse_query_params(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            let value = value.replace('+', " ");
            let decoded = urlencoding::decode(&value).ok()?.into_owned();
            Some((key.to_string(), decoded))
        })
        .collect()
}

async fn send_response(socket: &mut TcpStream, status: &str, html: String) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        html.len(),
        html
    );
    socket.write_all(response.as_bytes()).await?;
    socket.flush().await
}

fn callback_html(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>gws authorization</title></head>
<body style="font-family: sans-serif; text-align: center; margin-top: 4rem;">
<h1>gws</h1>
<p>{}</p>
</body>
</html>"#,
        message
    )
}
