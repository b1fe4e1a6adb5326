//! OpenProject API client.
//!
//! Low-level HTTP client that handles authentication, raw requests and
//! decoding of responses into [`Resource`]s. Entity-specific operations are
//! implemented via traits on the model types.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::decode::{decode, Resource};
use crate::error::{OpenProjectError, Result};

/// Environment variable holding the server base URL.
pub const BASE_URL_ENV: &str = "OPENPROJECT_BASEURL";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENPROJECT_APIKEY";

const API_ROOT: &str = "api/v3/";
const API_USER: &str = "apikey";
const ACCEPT_JSON: &str = "application/json;charset=UTF-8";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const USER_AGENT: &str = concat!("opapi/", env!("CARGO_PKG_VERSION"));

/// Low-level OpenProject API client.
///
/// Authenticates with HTTP Basic auth (user `apikey`, the API key as
/// password). All paths are relative to `<base_url>/api/v3/`.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use opapi::OpenProjectClient;
///
/// # fn example() -> opapi::Result<()> {
/// // Create from environment variables
/// let client = OpenProjectClient::from_env()?;
///
/// // Or configure manually
/// let client = OpenProjectClient::new("https://community.openproject.org", "your-api-key")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OpenProjectClient {
    http: Client,
    base_url: Arc<Url>,
    api_url: Arc<Url>,
    api_key: String,
}

impl std::fmt::Debug for OpenProjectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenProjectClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl OpenProjectClient {
    /// Create a client from environment variables.
    ///
    /// Uses `OPENPROJECT_BASEURL` and `OPENPROJECT_APIKEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is not set.
    pub fn from_env() -> Result<Self> {
        let read = |name: &str| {
            env::var(name).map_err(|_| {
                OpenProjectError::ConfigMissing(format!("{name} environment variable not set"))
            })
        };

        let base_url = read(BASE_URL_ENV)?;
        let api_key = read(API_KEY_ENV)?;

        Self::new(&base_url, &api_key)
    }

    /// Create a new client for the server at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server root, e.g. `https://community.openproject.org`
    /// * `api_key` - API key from the user's account settings
    ///
    /// # Errors
    ///
    /// Returns an error if either value is empty or the base URL is invalid.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    /// Like [`OpenProjectClient::new`], with a per-request timeout.
    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(OpenProjectError::ConfigMissing("base URL is empty".to_string()));
        }
        if api_key.is_empty() {
            return Err(OpenProjectError::ConfigMissing("API key is empty".to_string()));
        }

        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;
        let api_url = base_url.join(API_ROOT)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(timeout)
            .build()
            .map_err(OpenProjectError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            api_url: Arc::new(api_url),
            api_key: api_key.to_string(),
        })
    }

    /// Get the server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the API root (`<base_url>/api/v3/`).
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Resolve a resource path against the API root.
    ///
    /// Leading slashes are ignored, so `"/projects"` and `"projects"` are the
    /// same resource.
    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.api_url.join(path.trim_start_matches('/'))?)
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self.url(path)?;

        let response = self
            .http
            .get(url)
            .basic_auth(API_USER, Some(&self.api_key))
            .header(ACCEPT, ACCEPT_JSON)
            .send()
            .await
            .map_err(OpenProjectError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.url(path)?;

        let response = self
            .http
            .get(url)
            .basic_auth(API_USER, Some(&self.api_key))
            .header(ACCEPT, ACCEPT_JSON)
            .query(query)
            .send()
            .await
            .map_err(OpenProjectError::HttpError)?;

        Self::check_response(response).await
    }

    /// GET a path and return the raw JSON body.
    pub async fn get_json(&self, path: &str) -> Result<Value> {
        Self::read_json(self.get(path).await?).await
    }

    /// GET a path with query parameters and return the raw JSON body.
    pub async fn get_json_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Value> {
        Self::read_json(self.get_with_query(path, query).await?).await
    }

    /// GET a path and decode the body into a [`Resource`].
    pub async fn get_resource(&self, path: &str) -> Result<Resource> {
        decode(&self.get_json(path).await?)
    }

    /// GET a path with query parameters and decode the body into a [`Resource`].
    pub async fn get_resource_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Resource> {
        decode(&self.get_json_with_query(path, query).await?)
    }

    /// GET a path and extract a specific resource type.
    ///
    /// # Errors
    ///
    /// Returns [`OpenProjectError::UnexpectedType`] if the response is a
    /// different kind of resource.
    pub async fn fetch<T>(&self, path: &str) -> Result<T>
    where
        T: TryFrom<Resource, Error = OpenProjectError>,
    {
        self.get_resource(path).await?.try_into()
    }

    /// Read a successful response body as JSON.
    async fn read_json(response: Response) -> Result<Value> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // application/json and application/hal+json
        if !content_type.contains("json") {
            return Err(OpenProjectError::UnexpectedContentType(content_type));
        }

        let body = response.text().await.map_err(OpenProjectError::HttpError)?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        // Handle rate limiting
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(OpenProjectError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let message = Self::extract_error_message(response, status).await;
        Err(OpenProjectError::ApiError {
            message,
            status_code: Some(status.as_u16()),
        })
    }

    /// Extract error message from a failed response.
    ///
    /// OpenProject answers errors with an `Error` resource carrying a
    /// `message` field.
    async fn extract_error_message(response: Response, status: reqwest::StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        if let Ok(json) = serde_json::from_str::<Value>(&body) {
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
        }

        if body.is_empty() {
            format!("HTTP {status}")
        } else {
            body
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let client = OpenProjectClient::new("https://op.example.com", "secret-key").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("OpenProjectClient"));
        assert!(debug.contains("base_url"));
        // Key should not be in debug output
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client1 = OpenProjectClient::new("https://op.example.com/op", "key").unwrap();
        let client2 = OpenProjectClient::new("https://op.example.com/op/", "key").unwrap();
        assert_eq!(client1.base_url().as_str(), client2.base_url().as_str());
        assert_eq!(client1.api_url().as_str(), "https://op.example.com/op/api/v3/");
    }

    #[test]
    fn test_url_ignores_leading_slash() {
        let client = OpenProjectClient::new("https://op.example.com", "key").unwrap();
        assert_eq!(
            client.url("/projects/3").unwrap().as_str(),
            "https://op.example.com/api/v3/projects/3"
        );
        assert_eq!(client.url("projects/3").unwrap(), client.url("/projects/3").unwrap());
    }

    #[test]
    fn test_empty_config_rejected() {
        assert!(matches!(
            OpenProjectClient::new("", "key"),
            Err(OpenProjectError::ConfigMissing(_))
        ));
        assert!(matches!(
            OpenProjectClient::new("https://op.example.com", ""),
            Err(OpenProjectError::ConfigMissing(_))
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            OpenProjectClient::new("not a url", "key"),
            Err(OpenProjectError::UrlError(_))
        ));
    }
}
