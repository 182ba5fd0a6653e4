//! Shared HTTP clients and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use zapauth_bootstrap::HttpLoginEndpoint;
use zapauth_zap::{ZapClient, ZapConfig};

use crate::cli::Cli;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Collaborators constructed from CLI options.
pub(crate) struct CliDependencies {
    pub(crate) scanner: ZapClient,
    pub(crate) login: HttpLoginEndpoint,
}

impl CliDependencies {
    /// Build the ZAP client and the target login client.
    pub(crate) fn from_cli(cli: &Cli, run_id: &str) -> CliResult<Self> {
        let api_key = cli
            .zap_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);
        let timeout = Duration::from_secs(cli.timeout);

        let scanner = ZapClient::new(&ZapConfig {
            base_url: cli.zap_url.clone(),
            api_key,
            timeout,
        })
        .map_err(|err| CliError::failure(anyhow!(err).context("failed to build ZAP client")))?;

        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(run_id).map_err(|_| {
            CliError::failure(anyhow!("run identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            scanner,
            login: HttpLoginEndpoint::new(client, cli.target_url.as_str()),
        })
    }
}

/// Parse a URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    let url = input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))?;
    if matches!(url.scheme(), "http" | "https") {
        Ok(url)
    } else {
        Err(format!("invalid URL '{input}': scheme must be http or https"))
    }
}
