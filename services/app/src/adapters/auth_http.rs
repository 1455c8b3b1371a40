//! services/app/src/adapters/auth_http.rs
//!
//! HTTP implementation of the `AuthService` port, speaking to the study
//! backend's REST auth surface (`POST /auth/login`, `POST /auth/signup`).
//! A 401 is a logical failure (wrong credentials), not a gateway error.

use async_trait::async_trait;
use polaris_core::domain::User;
use polaris_core::ports::{AuthService, GatewayError, GatewayResult, LoginResponse, RegisterResponse};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// The backend's auth response. `user_id` is issued server-side and unused
/// by this client, but its absence still indicates a malformed response.
#[derive(Deserialize)]
struct AuthResponseBody {
    #[allow(dead_code)]
    user_id: Option<String>,
    email: Option<String>,
}

#[derive(Clone)]
pub struct HttpAuthAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthAdapter {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_credentials(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> GatewayResult<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&CredentialsBody { email, password })
            .send()
            .await
            .map_err(|e| GatewayError::Service(e.to_string()))
    }
}

#[async_trait]
impl AuthService for HttpAuthAdapter {
    async fn login(&self, email: &str, password: &str) -> GatewayResult<LoginResponse> {
        let response = self.post_credentials("/auth/login", email, password).await?;

        match response.status() {
            StatusCode::OK => {
                let body: AuthResponseBody = response
                    .json()
                    .await
                    .map_err(|e| GatewayError::Contract(e.to_string()))?;
                let email = body.email.ok_or_else(|| {
                    GatewayError::Contract("login response is missing the email field".to_string())
                })?;
                Ok(LoginResponse {
                    success: true,
                    user: Some(User { email }),
                })
            }
            StatusCode::UNAUTHORIZED => Ok(LoginResponse {
                success: false,
                user: None,
            }),
            status => Err(GatewayError::Service(format!(
                "auth backend returned {} for login",
                status
            ))),
        }
    }

    async fn register(&self, email: &str, password: &str) -> GatewayResult<RegisterResponse> {
        let response = self.post_credentials("/auth/signup", email, password).await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::OK => Ok(RegisterResponse { success: true }),
            status if status.is_client_error() => Ok(RegisterResponse { success: false }),
            status => Err(GatewayError::Service(format!(
                "auth backend returned {} for signup",
                status
            ))),
        }
    }
}
