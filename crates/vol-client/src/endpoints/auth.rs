use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::{ApiError, Result};

const LOGIN: &str = "/api/auth/login";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken", alias = "jwt")]
    pub token: String,
}

impl ApiClient {
    /// Exchanges credentials for a bearer token.
    pub async fn login(&self, request: &LoginRequest) -> Result<String> {
        let response: LoginResponse = self.send_json(Method::POST, LOGIN, request).await?;
        if response.token.trim().is_empty() {
            return Err(ApiError::Decode("login response without token".to_string()));
        }
        Ok(response.token)
    }
}
