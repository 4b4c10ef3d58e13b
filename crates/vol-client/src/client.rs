//! HTTP plumbing shared by every endpoint.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Settings;
use crate::error::{ApiError, Result};

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("volontaires-cli/", env!("CARGO_PKG_VERSION"));

/// Async client for the `/api` REST surface.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) http: reqwest::Client,
    base_url: String,
    authenticated: bool,
}

impl ApiClient {
    /// Builds a client for `settings.api_url`. When `token` is given it is
    /// sent as a bearer token on every request.
    pub fn new(settings: &Settings, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Config("token contains invalid characters".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ApiError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&settings.api_url),
            authenticated: token.is_some(),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Absolute URL for an `/api/...` path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(method = %method, path, "backend request");
        self.http.request(method, self.url(path))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        read_json(response, path).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, path).json(body).send().await?;
        read_json(response, path).await
    }

    /// For endpoints whose response body is irrelevant or empty.
    pub(crate) async fn send_no_content<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        check_status(response, path).await.map(|_| ())
    }

    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let response = self.request(Method::GET, path).send().await?;
        let response = check_status(response, path).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Strips trailing slashes so paths can be joined with a single `/`.
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Maps a non-success status to its error. Returns `None` for 2xx.
pub fn status_error(status: StatusCode, path: &str, body: String) -> Option<ApiError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
        _ => ApiError::Http {
            status: status.as_u16(),
            body: body.trim().to_string(),
        },
    })
}

pub(crate) async fn check_status(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error = status_error(status, path, body).unwrap_or(ApiError::Http {
        status: status.as_u16(),
        body: String::new(),
    });
    if error.is_auth() {
        tracing::warn!(path, "backend rejected credentials");
    } else {
        tracing::debug!(path, status = status.as_u16(), "backend returned an error");
    }
    Err(error)
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
    let response = check_status(response, path).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(format!("{path}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let settings = Settings {
            api_url: "http://localhost:8888/".to_string(),
            ..Settings::default()
        };
        let client = ApiClient::new(&settings, Some("abc")).unwrap();
        assert!(client.is_authenticated());
        assert_eq!(client.url("/api/etudes"), "http://localhost:8888/api/etudes");
        assert_eq!(client.url("api/rdvs/1/2"), "http://localhost:8888/api/rdvs/1/2");
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let err = ApiClient::new(&Settings::default(), Some("abc\ndef")).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::OK, "/api/etudes", String::new()).is_none());
        assert!(status_error(StatusCode::NO_CONTENT, "/x", String::new()).is_none());
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "/api/etudes", String::new()),
            Some(ApiError::Unauthorized)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "/api/volontaires-hc/4", String::new()),
            Some(ApiError::NotFound(path)) if path == "/api/volontaires-hc/4"
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "/api/rdvs", " bad date \n".to_string()),
            Some(ApiError::Http { status: 400, body }) if body == "bad date"
        ));
    }
}
