//! Configured HTTP transport for the marketplace API
//!
//! Wraps a `reqwest::Client` with the base URL, the 10 second timeout and a
//! JSON content-type default. Every outgoing request passes through
//! [`HttpClient::authorize`], which reads the bearer token from the local
//! store at send time and attaches it when one is present.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::storage::{LocalStore, TOKEN_KEY};

/// Response header carrying the total size of a paginated collection
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// A successful response with its body decoded as JSON
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Decoded body; `null` when the server sent none
    pub body: Value,
}

impl ApiResponse {
    /// Returns a header value if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Total collection size from `x-total-count`, 0 when absent or unparsable
    pub fn total_count(&self) -> u64 {
        self.header(TOTAL_COUNT_HEADER)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Decodes the body into `T`
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.body)?)
    }
}

/// HTTP client bound to one API base URL
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    store: Arc<dyn LocalStore>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl HttpClient {
    /// Creates a client for `config.api_url` that reads its token from `store`
    pub fn new(config: &Config, store: Arc<dyn LocalStore>) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.api_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            store,
        })
    }

    /// Builds a request URL by appending path segments to the base URL
    ///
    /// Segments are percent-encoded, so an id or email can never change the
    /// shape of the path.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Attaches `Authorization: Bearer <token>` when a token is stored
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => request.bearer_auth(token),
            Ok(_) => request,
            Err(e) => {
                warn!(error = %e, "could not read auth token, sending request without it");
                request
            }
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<ApiResponse, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|body| body.get("message").and_then(Value::as_str).map(String::from));
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }

    /// `GET` with optional query parameters
    pub async fn get(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url(segments)?;
        debug!(%url, "GET");
        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }
        self.send(request).await
    }

    /// `POST` with a JSON body
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url(segments)?;
        debug!(%url, "POST");
        self.send(self.client.post(url).json(body)).await
    }

    /// `PUT` with a multipart form body
    pub async fn put_multipart(
        &self,
        segments: &[&str],
        form: Form,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url(segments)?;
        debug!(%url, "PUT multipart");
        self.send(self.client.put(url).multipart(form)).await
    }

    /// `DELETE`
    pub async fn delete(&self, segments: &[&str]) -> Result<ApiResponse, ApiError> {
        let url = self.url(segments)?;
        debug!(%url, "DELETE");
        self.send(self.client.delete(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn client_for(api_url: &str) -> HttpClient {
        let config = Config::default().with_api_url(api_url);
        HttpClient::new(&config, Arc::new(MemoryStore::new())).expect("valid config")
    }

    #[test]
    fn test_url_appends_segments_to_root() {
        let client = client_for("http://localhost:8000");
        let url = client.url(&["tasks", "42"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/tasks/42");
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let client = client_for("https://api.example.com/v1/");
        let url = client.url(&["auth", "me"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/auth/me");
    }

    #[test]
    fn test_url_encodes_segments() {
        let client = client_for("http://localhost:8000");
        let url = client.url(&["tasks", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/tasks/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = Config::default().with_api_url("not a url");
        let result = HttpClient::new(&config, Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_cannot_be_a_base_url_is_rejected() {
        let config = Config::default().with_api_url("mailto:ops@example.com");
        let result = HttpClient::new(&config, Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_total_count_header() {
        let mut headers = HeaderMap::new();
        headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from_static("95"));
        let response = ApiResponse {
            status: 200,
            headers,
            body: Value::Null,
        };
        assert_eq!(response.total_count(), 95);
    }

    #[test]
    fn test_total_count_defaults_to_zero() {
        let missing = ApiResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: Value::Null,
        };
        assert_eq!(missing.total_count(), 0);

        let mut headers = HeaderMap::new();
        headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from_static("lots"));
        let garbage = ApiResponse {
            status: 200,
            headers,
            body: Value::Null,
        };
        assert_eq!(garbage.total_count(), 0);
    }
}
