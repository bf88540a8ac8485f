//! HTTP client for the control-plane REST API
//!
//! Thin, typed wrapper over `reqwest`: one method call issues exactly one
//! HTTP request. Resource-specific calls live in the handler modules.

use super::auth::Authenticator;
use super::error::{CloudError, Result};
use reqwest::header::{ACCEPT, ETAG, IF_MATCH};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Public endpoint used when no service URL is configured
pub const DEFAULT_SERVICE_URL: &str = "https://api.us-south.databases.cloud.ibm.com/v5/ibm";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_USER_AGENT: &str = concat!("clouddb-core/", env!("CARGO_PKG_VERSION"));

/// A decoded response together with the metadata callers sometimes need
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status code (always 2xx here)
    pub status: u16,
    /// `ETag` header, if the service sent one
    pub etag: Option<String>,
    pub body: T,
}

/// Client for the managed-database control plane
///
/// Cheap to clone; clones share the connection pool and token cache.
#[derive(Debug, Clone)]
pub struct CloudDatabasesClient {
    base_url: String,
    http: reqwest::Client,
    authenticator: Arc<Authenticator>,
}

/// Builder for [`CloudDatabasesClient`]
#[derive(Debug)]
pub struct CloudDatabasesClientBuilder {
    service_url: String,
    authenticator: Authenticator,
    user_agent: String,
    timeout: Duration,
    http: Option<reqwest::Client>,
}

impl Default for CloudDatabasesClientBuilder {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            authenticator: Authenticator::NoAuth,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: None,
        }
    }
}

impl CloudDatabasesClientBuilder {
    pub fn service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = url.into();
        self
    }

    pub fn authenticator(mut self, authenticator: Authenticator) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preconfigured `reqwest::Client` (proxies, custom TLS).
    /// `user_agent` and `timeout` are ignored in that case.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    pub fn build(self) -> Result<CloudDatabasesClient> {
        let parsed = url::Url::parse(&self.service_url).map_err(|e| {
            CloudError::Configuration(format!("Invalid service URL '{}': {}", self.service_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CloudError::Configuration(format!(
                "Service URL must use http or https: {}",
                self.service_url
            )));
        }

        let http = match self.http {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(self.user_agent)
                .timeout(self.timeout)
                .build()
                .map_err(|e| {
                    CloudError::Configuration(format!("Failed to build HTTP client: {}", e))
                })?,
        };

        Ok(CloudDatabasesClient {
            base_url: self.service_url.trim_end_matches('/').to_string(),
            http,
            authenticator: Arc::new(self.authenticator),
        })
    }
}

impl CloudDatabasesClient {
    pub fn builder() -> CloudDatabasesClientBuilder {
        CloudDatabasesClientBuilder::default()
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Issue a request and decode the body as `T`
    ///
    /// Any 2xx is success. An empty body decodes as `{}` so that
    /// all-optional response structs still deserialize.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        if_match: Option<&str>,
    ) -> Result<ApiResponse<T>> {
        let url = self.url_for(path);
        debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, "application/json");
        if let Some(etag) = if_match {
            request = request.header(IF_MATCH, etag);
        }
        if let Some(body) = body {
            trace!("Request body: {}", body);
            request = request.json(&body);
        }
        let request = self.authenticator.authorize(&self.http, request).await?;

        let response = request.send().await?;
        let status = response.status();
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        debug!("{} {} -> {}", method, url, status.as_u16());

        let bytes = response.bytes().await?;
        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            return Err(CloudError::from_status(
                status.as_u16(),
                extract_error_message(status, &text),
            ));
        }

        trace!("Response body: {}", String::from_utf8_lossy(&bytes));
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_str("{}")
        } else {
            serde_json::from_slice(&bytes)
        }
        .map_err(|e| CloudError::ParseError(format!("{} {}: {}", method, path, e)))?;

        Ok(ApiResponse {
            status: status.as_u16(),
            etag,
            body,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Ok(self.send(Method::GET, path, None, None).await?.body)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = to_body(body)?;
        Ok(self.send(Method::POST, path, Some(body), None).await?.body)
    }

    /// POST without a request body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Ok(self.send(Method::POST, path, None, None).await?.body)
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = to_body(body)?;
        Ok(self.send(Method::PUT, path, Some(body), None).await?.body)
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = to_body(body)?;
        Ok(self.send(Method::PATCH, path, Some(body), None).await?.body)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Ok(self.send(Method::DELETE, path, None, None).await?.body)
    }

    // Raw JSON access, used for escape-hatch calls

    pub async fn get_raw(&self, path: &str) -> Result<Value> {
        self.get(path).await
    }

    pub async fn post_raw(&self, path: &str, body: Value) -> Result<Value> {
        Ok(self.send(Method::POST, path, Some(body), None).await?.body)
    }

    pub async fn put_raw(&self, path: &str, body: Value) -> Result<Value> {
        Ok(self.send(Method::PUT, path, Some(body), None).await?.body)
    }

    pub async fn patch_raw(&self, path: &str, body: Value) -> Result<Value> {
        Ok(self.send(Method::PATCH, path, Some(body), None).await?.body)
    }

    pub async fn delete_raw(&self, path: &str) -> Result<Value> {
        self.delete(path).await
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
    serde_json::to_value(body)
        .map_err(|e| CloudError::ParseError(format!("Failed to serialize request: {}", e)))
}

/// Percent-encode a single path segment
pub(crate) fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Append an encoded query string, skipping unset parameters
pub(crate) fn with_query(path: &str, params: &[(&str, Option<&str>)]) -> String {
    let present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(k, v)| v.map(|v| (*k, v)))
        .collect();
    if present.is_empty() {
        return path.to_string();
    }
    match serde_urlencoded::to_string(&present) {
        Ok(query) => format!("{}?{}", path, query),
        Err(_) => path.to_string(),
    }
}

/// Pull a human-readable message out of an error body
///
/// The service reports errors as `{"errors": "..."}`,
/// `{"errors": [{"message": "..."}]}` or `{"error": "...", "message": "..."}`.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            body.trim().to_string()
        }
    };

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    let from_errors = match value.get("errors") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => other
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    };

    from_errors
        .or_else(|| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| {
            value
                .get("error")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = CloudDatabasesClient::builder().build().unwrap();
        assert_eq!(client.base_url(), DEFAULT_SERVICE_URL);
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = CloudDatabasesClient::builder()
            .service_url("http://localhost:8080/v5/ibm/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v5/ibm");
    }

    #[test]
    fn test_builder_rejects_bad_urls() {
        assert!(
            CloudDatabasesClient::builder()
                .service_url("not a url")
                .build()
                .is_err()
        );
        assert!(
            CloudDatabasesClient::builder()
                .service_url("ftp://example.com")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_url_for_adds_slash() {
        let client = CloudDatabasesClient::builder()
            .service_url("http://localhost")
            .build()
            .unwrap();
        assert_eq!(client.url_for("/tasks/1"), "http://localhost/tasks/1");
        assert_eq!(client.url_for("tasks/1"), "http://localhost/tasks/1");
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("172.16.0.0/16"), "172.16.0.0%2F16");
        assert_eq!(encode_segment("admin"), "admin");
    }

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("/groups", &[("host_flavor", None)]), "/groups");
        assert_eq!(
            with_query("/groups", &[("host_flavor", Some("b3c.4x16"))]),
            "/groups?host_flavor=b3c.4x16"
        );
        assert_eq!(
            with_query("/c", &[("a", Some("x y")), ("b", None), ("c", Some("z"))]),
            "/c?a=x+y&c=z"
        );
    }

    #[test]
    fn test_extract_error_message_variants() {
        let s = StatusCode::BAD_REQUEST;
        assert_eq!(extract_error_message(s, r#"{"errors":"bad cidr"}"#), "bad cidr");
        assert_eq!(
            extract_error_message(s, r#"{"errors":[{"message":"a"},{"message":"b"}]}"#),
            "a; b"
        );
        assert_eq!(
            extract_error_message(s, r#"{"error":"invalid","message":"detail"}"#),
            "detail"
        );
        assert_eq!(extract_error_message(s, r#"{"error":"invalid"}"#), "invalid");
        assert_eq!(extract_error_message(s, "plain text"), "plain text");
        assert_eq!(extract_error_message(s, ""), "Bad Request");
    }
}
