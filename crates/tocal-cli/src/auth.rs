//! OAuth access token for the Calendar API.
//!
//! Tried in order: `$TOCAL_ACCESS_TOKEN`, the refresh token stored in
//! `token.json`, and finally the installed-app consent flow where the user
//! pastes the authorization code shown by Google.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::{Config, GoogleConfig};

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const ACCESS_TOKEN_ENV: &str = "TOCAL_ACCESS_TOKEN";
pub const CLIENT_ID_ENV: &str = "TOCAL_GOOGLE_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "TOCAL_GOOGLE_CLIENT_SECRET";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// What is persisted between runs.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub refresh_token: String,
}

/// Token endpoint client for one OAuth application.
pub struct OAuthClient {
    client: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    auth_url: String,
    redirect_uri: String,
}

impl OAuthClient {
    /// Client credentials come from the config file, falling back to
    /// `$TOCAL_GOOGLE_CLIENT_ID` and `$TOCAL_GOOGLE_CLIENT_SECRET`.
    pub fn new(google: &GoogleConfig) -> Result<Self> {
        let client_id = google
            .client_id
            .clone()
            .or_else(|| std::env::var(CLIENT_ID_ENV).ok())
            .with_context(|| format!("Set google.client_id in the config or {CLIENT_ID_ENV}"))?;
        let client_secret = google
            .client_secret
            .clone()
            .or_else(|| std::env::var(CLIENT_SECRET_ENV).ok())
            .with_context(|| {
                format!("Set google.client_secret in the config or {CLIENT_SECRET_ENV}")
            })?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            token_url: google.token_url.clone(),
            auth_url: google.auth_url.clone(),
            redirect_uri: google.redirect_uri.clone(),
        })
    }

    /// The URL the user opens to grant calendar access.
    pub fn consent_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(CALENDAR_SCOPE)
        )
    }

    pub fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .context("Failed to exchange authorization code")
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .context("Failed to refresh access token")
    }

    fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let mut form = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        form.extend_from_slice(params);

        let token = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(token)
    }
}

pub fn read_stored_token(path: &Path) -> Result<Option<StoredToken>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read token file at {}", path.display()))?;
    let token = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse token file at {}", path.display()))?;
    Ok(Some(token))
}

pub fn write_stored_token(path: &Path, token: &StoredToken) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, serde_json::to_string_pretty(token)?)
        .with_context(|| format!("Failed to write token file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Run the consent flow: show the URL on `out`, read the pasted code from
/// `input` and exchange it.
pub fn authorize_interactively(
    oauth: &OAuthClient,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<TokenResponse> {
    writeln!(
        out,
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        oauth.consent_url()
    )?;
    write!(out, "Paste the authorization code shown by Google here: ")?;
    out.flush()?;

    let mut code = String::new();
    input.read_line(&mut code)?;
    let code = code.trim();
    if code.is_empty() {
        bail!("No authorization code entered");
    }
    oauth.exchange_code(code)
}

/// Obtain an access token, running the consent flow when nothing usable is
/// stored or `reauth` is set.
pub fn access_token(config: &Config, reauth: bool) -> Result<String> {
    if !reauth {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                tracing::debug!("using access token from {}", ACCESS_TOKEN_ENV);
                return Ok(token);
            }
        }
    }

    let token_path = config
        .token_path()
        .ok_or_else(|| anyhow!("No config directory found; set token_path in the config"))?;
    let oauth = OAuthClient::new(&config.google)?;

    if !reauth {
        if let Some(stored) = read_stored_token(&token_path)? {
            match oauth.refresh(&stored.refresh_token) {
                Ok(token) => {
                    tracing::debug!(path = %token_path.display(), "refreshed stored token");
                    return Ok(token.access_token);
                }
                Err(e) => tracing::warn!("Stored token rejected, asking for consent again: {e:#}"),
            }
        }
    }

    let token = authorize_interactively(&oauth, &mut io::stdin().lock(), &mut io::stderr())?;
    match &token.refresh_token {
        Some(refresh_token) => {
            write_stored_token(
                &token_path,
                &StoredToken {
                    refresh_token: refresh_token.clone(),
                },
            )?;
            tracing::info!(path = %token_path.display(), "refresh token saved");
        }
        None => tracing::warn!("No refresh token in response; consent will be asked again next run"),
    }
    Ok(token.access_token)
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn google(server_url: &str) -> GoogleConfig {
        GoogleConfig {
            client_id: Some("client-id".to_string()),
            client_secret: Some("client-secret".to_string()),
            token_url: format!("{server_url}/token"),
            ..GoogleConfig::default()
        }
    }

    #[test]
    fn test_consent_url_requests_offline_calendar_access() {
        let oauth = OAuthClient::new(&google("http://localhost")).unwrap();
        let url = oauth.consent_url();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fcalendar"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob"));
    }

    #[test]
    fn test_refresh() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "stored-refresh".into()),
                Matcher::UrlEncoded("client_id".into(), "client-id".into()),
                Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token": "fresh", "expires_in": 3599, "token_type": "Bearer"}"#)
            .create();

        let oauth = OAuthClient::new(&google(&server.url())).unwrap();
        let token = oauth.refresh("stored-refresh").unwrap();

        mock.assert();
        assert_eq!(token.access_token, "fresh");
        assert_eq!(token.refresh_token, None);
        assert_eq!(token.expires_in, Some(3599));
    }

    #[test]
    fn test_refresh_rejected() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create();

        let oauth = OAuthClient::new(&google(&server.url())).unwrap();
        let err = oauth.refresh("revoked").unwrap_err();
        assert!(format!("{err:#}").contains("400"), "got: {err:#}");
    }

    #[test]
    fn test_interactive_flow_exchanges_pasted_code() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "4/abc".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token": "new-access", "refresh_token": "new-refresh"}"#)
            .create();

        let oauth = OAuthClient::new(&google(&server.url())).unwrap();
        let mut input = Cursor::new("  4/abc \n");
        let mut out = Vec::new();
        let token = authorize_interactively(&oauth, &mut input, &mut out).unwrap();

        mock.assert();
        assert_eq!(token.access_token, "new-access");
        assert_eq!(token.refresh_token.as_deref(), Some("new-refresh"));
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains(&oauth.consent_url()));
    }

    #[test]
    fn test_interactive_flow_requires_a_code() {
        let oauth = OAuthClient::new(&google("http://localhost")).unwrap();
        let mut input = Cursor::new("\n");
        let err = authorize_interactively(&oauth, &mut input, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("No authorization code"));
    }

    #[test]
    fn test_stored_token_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("token.json");
        assert_eq!(read_stored_token(&path).unwrap(), None);

        let token = StoredToken {
            refresh_token: "1//refresh".to_string(),
        };
        write_stored_token(&path, &token).unwrap();
        assert_eq!(read_stored_token(&path).unwrap(), Some(token));
    }

    #[test]
    fn test_corrupt_token_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "not json").unwrap();
        let err = read_stored_token(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse token file"));
    }
}
