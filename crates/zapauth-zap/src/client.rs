//! HTTP client for the ZAP JSON API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;
use zapauth_core::{ContextRef, HeaderRule, ScannerControl, ScannerError, ScannerResult};

use crate::wire::{
    ADD_REPLACER_RULE, ApiCall, CONTEXT_NOT_FOUND, CONTEXT_VIEW, CREATE_EMPTY_SESSION,
    INCLUDE_IN_CONTEXT, NEW_CONTEXT, NEW_USER, SET_AUTH_CREDENTIALS, SET_USER_ENABLED, ZapProblem,
    context_ref, expect_ok, id_field,
};

/// Address of a locally running ZAP daemon with default settings.
pub const DEFAULT_ZAP_URL: &str = "http://127.0.0.1:8080";
/// Header carrying the ZAP API key.
pub const HEADER_API_KEY: &str = "x-zap-api-key";

const REQUEST_HEADER_MATCH: &str = "REQ_HEADER";

/// Connection settings for a ZAP instance.
#[derive(Debug, Clone)]
pub struct ZapConfig {
    /// Base URL of the ZAP API (the proxy address).
    pub base_url: Url,
    /// API key, when the instance enforces one.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// `ScannerControl` backed by ZAP's JSON API.
#[derive(Debug, Clone)]
pub struct ZapClient {
    client: Client,
    base_url: Url,
}

impl ZapClient {
    /// Build a client with the API key installed as a default header.
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is not a valid header value or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &ZapConfig) -> ScannerResult<Self> {
        let mut default_headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|err| ScannerError::Transport {
                operation: "client.build",
                source: Box::new(err),
            })?;
            default_headers.insert(HEADER_API_KEY, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| ScannerError::Transport {
                operation: "client.build",
                source: Box::new(err),
            })?;

        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Wrap an existing HTTP client.
    ///
    /// API paths are resolved below `base_url`, so a ZAP instance served under
    /// a path prefix keeps that prefix.
    #[must_use]
    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    async fn call(&self, call: ApiCall, params: &[(&str, &str)]) -> ScannerResult<(u16, Value)> {
        let url = self
            .base_url
            .join(&call.path())
            .map_err(|err| ScannerError::Transport {
                operation: call.label,
                source: Box::new(err),
            })?;
        debug!(operation = call.label, "zap api call");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|err| ScannerError::Transport {
                operation: call.label,
                source: Box::new(err),
            })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ScannerError::Transport {
                operation: call.label,
                source: Box::new(err),
            })?;

        if !status.is_success() {
            let problem = serde_json::from_slice::<ZapProblem>(&bytes).ok();
            let (code, message) = problem.map_or((None, None), |p| (p.code, p.message));
            return Err(ScannerError::Api {
                operation: call.label,
                status: status.as_u16(),
                code,
                message,
            });
        }

        let body = serde_json::from_slice::<Value>(&bytes).map_err(|err| ScannerError::Decode {
            operation: call.label,
            source: Box::new(err),
        })?;
        Ok((status.as_u16(), body))
    }

    async fn action(&self, call: ApiCall, params: &[(&str, &str)]) -> ScannerResult<()> {
        let (status, body) = self.call(call, params).await?;
        expect_ok(call, status, &body)
    }
}

#[async_trait]
impl ScannerControl for ZapClient {
    async fn find_context(&self, name: &str) -> ScannerResult<Option<ContextRef>> {
        match self.call(CONTEXT_VIEW, &[("contextName", name)]).await {
            Ok((_, body)) => context_ref(CONTEXT_VIEW, &body).map(Some),
            Err(ScannerError::Api {
                code: Some(code), ..
            }) if code == CONTEXT_NOT_FOUND => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn new_context(&self, name: &str) -> ScannerResult<String> {
        let (_, body) = self.call(NEW_CONTEXT, &[("contextName", name)]).await?;
        id_field(NEW_CONTEXT, &body, "contextId")
    }

    async fn include_in_context(&self, context_name: &str, regex: &str) -> ScannerResult<()> {
        self.action(
            INCLUDE_IN_CONTEXT,
            &[("contextName", context_name), ("regex", regex)],
        )
        .await
    }

    async fn new_user(&self, context_id: &str, name: &str) -> ScannerResult<String> {
        let (_, body) = self
            .call(NEW_USER, &[("contextId", context_id), ("name", name)])
            .await?;
        id_field(NEW_USER, &body, "userId")
    }

    async fn set_authentication_credentials(
        &self,
        context_id: &str,
        user_id: &str,
        credentials: &str,
    ) -> ScannerResult<()> {
        self.action(
            SET_AUTH_CREDENTIALS,
            &[
                ("contextId", context_id),
                ("userId", user_id),
                ("authCredentialsConfigParams", credentials),
            ],
        )
        .await
    }

    async fn set_user_enabled(
        &self,
        context_id: &str,
        user_id: &str,
        enabled: bool,
    ) -> ScannerResult<()> {
        let enabled = if enabled { "true" } else { "false" };
        self.action(
            SET_USER_ENABLED,
            &[
                ("contextId", context_id),
                ("userId", user_id),
                ("enabled", enabled),
            ],
        )
        .await
    }

    async fn create_empty_session(&self, site: &str, session: &str) -> ScannerResult<()> {
        self.action(
            CREATE_EMPTY_SESSION,
            &[("site", site), ("session", session)],
        )
        .await
    }

    async fn add_header_rule(&self, rule: &HeaderRule) -> ScannerResult<()> {
        self.action(
            ADD_REPLACER_RULE,
            &[
                ("description", rule.description.as_str()),
                ("enabled", "true"),
                ("matchType", REQUEST_HEADER_MATCH),
                ("matchRegex", "false"),
                ("matchString", rule.header.as_str()),
                ("replacement", rule.replacement.as_str()),
                ("initiators", ""),
            ],
        )
        .await
    }
}
