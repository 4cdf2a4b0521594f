use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info};
use yup_oauth2::storage::{TokenInfo, TokenStorage};
use yup_oauth2::{ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod};

pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

// Tokens this close to expiry are treated as already expired
const EXPIRY_MARGIN: Duration = Duration::seconds(60);

/// OAuth2 access token plus what is needed to renew it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now + EXPIRY_MARGIN >= expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }
}

// Persistence for the credential between runs
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>>;
    fn save(&self, credential: &Credential) -> Result<()>;
    /// Returns whether anything was removed.
    fn clear(&self) -> Result<bool>;
}

/// Credential cache kept as a JSON file on disk.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let json = serde_json::to_string_pretty(credential)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

// Network side of authentication, split out so the provider logic can be mocked
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthFlow: Send + Sync {
    async fn refresh(&self, credential: &Credential) -> Result<Credential>;
    async fn consent(&self, scopes: Vec<String>) -> Result<Credential>;
}

pub struct RealOAuthFlow {
    client_secret_path: PathBuf,
    http: reqwest::Client,
}

impl RealOAuthFlow {
    pub fn new(client_secret_path: impl Into<PathBuf>, http: reqwest::Client) -> Self {
        Self {
            client_secret_path: client_secret_path.into(),
            http,
        }
    }

    async fn load_client_secret(&self) -> Result<ApplicationSecret> {
        yup_oauth2::read_application_secret(&self.client_secret_path)
            .await
            .map_err(|e| {
                Error::auth(format!(
                    "failed to read client secret {}: {}",
                    self.client_secret_path.display(),
                    e
                ))
            })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_credential(self, previous_refresh: Option<String>, now: OffsetDateTime) -> Credential {
        Credential {
            access_token: self.access_token,
            // Google usually omits the refresh token on refresh
            refresh_token: self.refresh_token.or(previous_refresh),
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
        }
    }
}

// Catches the token yup-oauth2 issues so the refresh token is not lost
#[derive(Clone, Default)]
struct CapturedToken(Arc<Mutex<Option<TokenInfo>>>);

impl CapturedToken {
    fn take(&self) -> Option<TokenInfo> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

#[async_trait]
impl TokenStorage for CapturedToken {
    async fn set(&self, _scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        let mut slot = self
            .0
            .lock()
            .map_err(|_| anyhow::anyhow!("token capture lock poisoned"))?;
        *slot = Some(token);
        Ok(())
    }

    async fn get(&self, _scopes: &[&str]) -> Option<TokenInfo> {
        self.0.lock().ok().and_then(|slot| slot.clone())
    }
}

#[async_trait]
impl OAuthFlow for RealOAuthFlow {
    async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::auth("no refresh token available"))?;
        let secret = self.load_client_secret().await?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
        ];
        let response = self
            .http
            .post(&secret.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::auth(format!("token refresh rejected: {}", error_text)));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.into_credential(credential.refresh_token.clone(), OffsetDateTime::now_utc()))
    }

    async fn consent(&self, scopes: Vec<String>) -> Result<Credential> {
        let secret = self.load_client_secret().await?;
        let captured = CapturedToken::default();

        let auth =
            InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
                .with_storage(Box::new(captured.clone()))
                .build()
                .await?;
        let scopes_refs: Vec<&str> = scopes.iter().map(|s| s.as_str()).collect();
        let access = auth
            .token(&scopes_refs)
            .await
            .map_err(|e| Error::auth(e.to_string()))?;

        let access_token = access
            .token()
            .ok_or_else(|| Error::auth("consent flow returned no access token"))?
            .to_string();
        let refresh_token = captured.take().and_then(|info| info.refresh_token);

        Ok(Credential {
            access_token,
            refresh_token,
            expires_at: access.expiration_time(),
        })
    }
}

/// Returns a usable credential: the cached one while it is valid, a refreshed
/// one when it expired and can be renewed, otherwise one from the interactive
/// consent flow. New credentials are written back to `store`.
pub async fn obtain_credential<S: CredentialStore, O: OAuthFlow>(
    store: &S,
    flow: &O,
) -> Result<Credential> {
    let credential = match store.load()? {
        Some(cached) if !cached.is_expired() => {
            debug!("using cached credential");
            return Ok(cached);
        }
        Some(cached) if cached.refresh_token.is_some() => {
            info!("cached credential expired, refreshing");
            flow.refresh(&cached).await?
        }
        _ => {
            info!("no usable cached credential, starting consent flow");
            flow.consent(vec![GMAIL_READONLY_SCOPE.to_string()]).await?
        }
    };

    store.save(&credential)?;
    Ok(credential)
}
