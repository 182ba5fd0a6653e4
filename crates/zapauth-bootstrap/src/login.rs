//! `LoginEndpoint` implementation for the target API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use zapauth_core::{AccessToken, LoginEndpoint, LoginError, LoginOutcome, LoginResult};

/// Path of the login route, relative to the target base URL.
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Posts credentials to `{target}/api/auth/login`.
#[derive(Debug, Clone)]
pub struct HttpLoginEndpoint {
    client: Client,
    login_url: String,
}

impl HttpLoginEndpoint {
    /// Build an endpoint for the given target base URL.
    #[must_use]
    pub fn new(client: Client, target_url: &str) -> Self {
        Self {
            client,
            login_url: format!("{}{LOGIN_PATH}", target_url.trim_end_matches('/')),
        }
    }

    /// Fully-qualified login URL.
    #[must_use]
    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[async_trait]
impl LoginEndpoint for HttpLoginEndpoint {
    async fn login(&self, email: &str, password: &str) -> LoginResult<LoginOutcome> {
        debug!(url = self.login_url(), user = email, "posting login");
        let response = self
            .client
            .post(self.login_url())
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|err| LoginError::Transport {
                source: Box::new(err),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(LoginOutcome::Rejected {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|err| LoginError::Transport {
            source: Box::new(err),
        })?;
        let body = serde_json::from_slice::<Value>(&bytes).map_err(|err| LoginError::Decode {
            source: Box::new(err),
        })?;
        let token = body
            .pointer("/tokens/accessToken")
            .and_then(Value::as_str)
            .ok_or(LoginError::MissingToken)?;

        Ok(LoginOutcome::Granted(AccessToken::new(token)))
    }
}
