//! Request authentication
//!
//! The service accepts IAM access tokens obtained by exchanging an API key,
//! pre-fetched bearer tokens, or basic credentials (private deployments).
//! `noauth` exists for local mock servers.

use super::error::{CloudError, Result};
use reqwest::RequestBuilder;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Default IAM endpoint used for API key exchange
pub const DEFAULT_AUTH_URL: &str = "https://iam.cloud.ibm.com";

const TOKEN_PATH: &str = "/identity/token";
const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Refresh cached tokens this long before they expire
const REFRESH_WINDOW: Duration = Duration::from_secs(60);

/// Token lifetime assumed when the IAM response omits `expires_in`
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Supported authentication schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum AuthType {
    #[default]
    #[serde(rename = "iam")]
    #[value(name = "iam")]
    Iam,
    #[serde(rename = "bearer", alias = "bearerToken", alias = "bearertoken")]
    #[value(name = "bearer", alias = "bearerToken")]
    Bearer,
    #[serde(rename = "basic")]
    #[value(name = "basic")]
    Basic,
    #[serde(rename = "noauth", alias = "noAuth", alias = "none")]
    #[value(name = "noauth", alias = "noAuth")]
    NoAuth,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthType::Iam => write!(f, "iam"),
            AuthType::Bearer => write!(f, "bearer"),
            AuthType::Basic => write!(f, "basic"),
            AuthType::NoAuth => write!(f, "noauth"),
        }
    }
}

impl FromStr for AuthType {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "iam" => Ok(AuthType::Iam),
            "bearer" | "bearertoken" => Ok(AuthType::Bearer),
            "basic" => Ok(AuthType::Basic),
            "noauth" | "none" => Ok(AuthType::NoAuth),
            other => Err(CloudError::Configuration(format!(
                "Unknown auth type '{}'. Expected one of: iam, bearer, basic, noauth",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > Instant::now() + REFRESH_WINDOW
    }
}

/// Exchanges an API key for short-lived access tokens and caches them
#[derive(Clone)]
pub struct IamAuthenticator {
    api_key: String,
    auth_url: String,
    cache: Arc<Mutex<Option<CachedToken>>>,
}

impl fmt::Debug for IamAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IamAuthenticator")
            .field("api_key", &"<redacted>")
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

impl IamAuthenticator {
    /// Create an authenticator; `auth_url` defaults to [`DEFAULT_AUTH_URL`]
    pub fn new(api_key: impl Into<String>, auth_url: Option<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CloudError::Configuration(
                "IAM authentication requires a non-empty API key".to_string(),
            ));
        }
        let auth_url = auth_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        Ok(Self {
            api_key,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            cache: Arc::new(Mutex::new(None)),
        })
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Return a valid access token, fetching a new one when needed
    pub async fn token(&self, http: &reqwest::Client) -> Result<String> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref()
            && cached.is_fresh()
        {
            trace!("Using cached IAM token");
            return Ok(cached.access_token.clone());
        }

        debug!("Requesting IAM access token from {}", self.auth_url);
        let response = self.request_token(http).await?;
        let lifetime = response
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);

        let token = response.access_token;
        *cache = Some(CachedToken {
            access_token: token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token)
    }

    async fn request_token(&self, http: &reqwest::Client) -> Result<TokenResponse> {
        let body = serde_urlencoded::to_string([
            ("grant_type", APIKEY_GRANT_TYPE),
            ("apikey", self.api_key.as_str()),
        ])
        .map_err(|e| CloudError::TokenError(format!("Failed to encode token request: {}", e)))?;

        let response = http
            .post(format!("{}{}", self.auth_url, TOKEN_PATH))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CloudError::TokenError(format!(
                "IAM returned {}: {}",
                status.as_u16(),
                text
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| CloudError::TokenError(format!("Invalid token response: {}", e)))
    }
}

/// How requests are authorized
#[derive(Clone)]
pub enum Authenticator {
    NoAuth,
    BearerToken(String),
    Basic { username: String, password: String },
    Iam(IamAuthenticator),
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authenticator::NoAuth => write!(f, "NoAuth"),
            Authenticator::BearerToken(_) => write!(f, "BearerToken(<redacted>)"),
            Authenticator::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Authenticator::Iam(iam) => iam.fmt(f),
        }
    }
}

impl Authenticator {
    /// IAM authenticator from an API key
    pub fn iam(api_key: impl Into<String>, auth_url: Option<String>) -> Result<Self> {
        Ok(Authenticator::Iam(IamAuthenticator::new(api_key, auth_url)?))
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Authenticator::BearerToken(token.into())
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Authenticator::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn auth_type(&self) -> AuthType {
        match self {
            Authenticator::NoAuth => AuthType::NoAuth,
            Authenticator::BearerToken(_) => AuthType::Bearer,
            Authenticator::Basic { .. } => AuthType::Basic,
            Authenticator::Iam(_) => AuthType::Iam,
        }
    }

    /// Attach credentials to an outgoing request
    pub(crate) async fn authorize(
        &self,
        http: &reqwest::Client,
        request: RequestBuilder,
    ) -> Result<RequestBuilder> {
        match self {
            Authenticator::NoAuth => Ok(request),
            Authenticator::BearerToken(token) => Ok(request.bearer_auth(token)),
            Authenticator::Basic { username, password } => {
                Ok(request.basic_auth(username, Some(password)))
            }
            Authenticator::Iam(iam) => {
                let token = iam.token(http).await?;
                Ok(request.bearer_auth(token))
            }
        }
    }
}
