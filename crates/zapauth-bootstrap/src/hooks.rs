//! Login-and-register sequence for the scanner roster.

use reqwest::Url;
use tracing::{info, instrument, warn};
use zapauth_core::{
    AuthOutcome, AuthReport, ContextRef, DEFAULT_CONTEXT_NAME, DEFAULT_ROSTER, HeaderRule, LoginEndpoint, LoginOutcome,
    Notice, NoticeSink, ScannerControl, ScannerError, UserCredential, error_chain,
};

use crate::error::{BootstrapError, BootstrapResult};

/// Scope regex registered on a freshly created context.
#[must_use]
pub fn scope_regex(target_url: &str) -> String {
    format!("{}/api/.*", target_url.trim_end_matches('/'))
}

/// Site key used for HTTP sessions: `host:port` of the target, falling back
/// to the raw value when it does not parse as a URL.
///
/// ZAP keys its session sites by `host:port` and reduces a full URL to that
/// same key, so passing the authority keeps the session on the site ZAP
/// records for proxied target traffic.
#[must_use]
pub fn session_site(target_url: &str) -> String {
    Url::parse(target_url)
        .ok()
        .and_then(|url| {
            let host = url.host_str()?.to_string();
            let port = url.port_or_known_default()?;
            Some(format!("{host}:{port}"))
        })
        .unwrap_or_else(|| target_url.to_string())
}

/// Resolve the context named `context_name`, creating and scoping it when the
/// scanner does not know it yet.
///
/// The name is matched exactly by the scanner; an existing context is never
/// modified.
///
/// # Errors
///
/// Returns an error when any scanner call fails.
#[instrument(name = "bootstrap.ensure_context", skip(scanner))]
pub async fn ensure_context(
    scanner: &dyn ScannerControl,
    target_url: &str,
    context_name: &str,
) -> BootstrapResult<ContextRef> {
    let lookup_error = |source: ScannerError| BootstrapError::ContextLookup {
        context_name: context_name.to_string(),
        source,
    };

    let existing = scanner
        .find_context(context_name)
        .await
        .map_err(lookup_error)?;
    if let Some(context) = existing {
        info!(context_id = %context.id, "reusing existing context");
        return Ok(context);
    }

    let create_error = |source: ScannerError| BootstrapError::ContextCreate {
        context_name: context_name.to_string(),
        source,
    };
    let id = scanner
        .new_context(context_name)
        .await
        .map_err(create_error)?;
    scanner
        .include_in_context(context_name, &scope_regex(target_url))
        .await
        .map_err(create_error)?;
    info!(context_id = %id, "created context");

    Ok(ContextRef {
        id,
        name: context_name.to_string(),
    })
}

/// Runs the roster against a scanner, reporting through a notice sink.
pub struct Bootstrapper<'a> {
    scanner: &'a dyn ScannerControl,
    login: &'a dyn LoginEndpoint,
    notices: &'a dyn NoticeSink,
}

impl<'a> Bootstrapper<'a> {
    /// Bundle the collaborators used by a run.
    #[must_use]
    pub const fn new(
        scanner: &'a dyn ScannerControl,
        login: &'a dyn LoginEndpoint,
        notices: &'a dyn NoticeSink,
    ) -> Self {
        Self {
            scanner,
            login,
            notices,
        }
    }

    /// Resolve the context, authenticate [`DEFAULT_ROSTER`] and report.
    ///
    /// # Errors
    ///
    /// Returns an error only when the context cannot be resolved; per-user
    /// failures are reported, not returned.
    pub async fn run(&self, target_url: &str, context_name: &str) -> BootstrapResult<AuthReport> {
        self.notices.emit(&Notice::Started {
            context_name: context_name.to_string(),
        });

        let context = ensure_context(self.scanner, target_url, context_name).await?;
        let report = self
            .authenticate_all(target_url, &context, &DEFAULT_ROSTER)
            .await;

        self.notices.emit(&Notice::Completed);
        Ok(report)
    }

    /// Log in and register every credential in order.
    ///
    /// A failure for one user is reported and the next user is processed.
    #[instrument(name = "bootstrap.authenticate_all", skip(self, roster), fields(context_id = %context.id))]
    pub async fn authenticate_all(
        &self,
        target_url: &str,
        context: &ContextRef,
        roster: &[UserCredential],
    ) -> AuthReport {
        let site = session_site(target_url);
        let mut report = AuthReport {
            context_id: Some(context.id.clone()),
            users: Vec::with_capacity(roster.len()),
        };

        for credential in roster {
            let outcome = match self.authenticate(&site, context, credential).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    let message = error_chain(&err);
                    warn!(user = credential.name, error = %message, "authentication errored");
                    AuthOutcome::Errored { message }
                }
            };
            self.notices.emit(&notice_for(credential, &outcome));
            report.record(credential.name, outcome);
        }

        report
    }

    async fn authenticate(
        &self,
        site: &str,
        context: &ContextRef,
        credential: &UserCredential,
    ) -> BootstrapResult<AuthOutcome> {
        let outcome = self
            .login
            .login(credential.username, credential.password)
            .await
            .map_err(|source| BootstrapError::Login {
                label: credential.name.to_string(),
                source,
            })?;

        let token = match outcome {
            LoginOutcome::Granted(token) => token,
            LoginOutcome::Rejected { status } => {
                warn!(user = credential.name, status, "login rejected");
                return Ok(AuthOutcome::Rejected { status });
            }
        };

        let registration_error = |source: ScannerError| BootstrapError::Registration {
            label: credential.name.to_string(),
            source,
        };
        let user_id = self
            .scanner
            .new_user(&context.id, credential.name)
            .await
            .map_err(registration_error)?;
        self.scanner
            .set_authentication_credentials(&context.id, &user_id, &token.bearer())
            .await
            .map_err(registration_error)?;
        self.scanner
            .set_user_enabled(&context.id, &user_id, true)
            .await
            .map_err(registration_error)?;
        self.scanner
            .create_empty_session(site, &credential.session_name())
            .await
            .map_err(registration_error)?;
        self.scanner
            .add_header_rule(&HeaderRule::authorization(credential, &token))
            .await
            .map_err(registration_error)?;

        info!(user = credential.name, role = %credential.role, user_id = %user_id, "user authenticated");
        Ok(AuthOutcome::Authenticated {
            role: credential.role,
        })
    }
}

/// Run the default roster into the `ReskFlow API` context.
///
/// # Errors
///
/// Returns an error when the context cannot be resolved.
pub async fn run_hooks(
    scanner: &dyn ScannerControl,
    login: &dyn LoginEndpoint,
    notices: &dyn NoticeSink,
    target_url: &str,
) -> BootstrapResult<AuthReport> {
    Bootstrapper::new(scanner, login, notices)
        .run(target_url, DEFAULT_CONTEXT_NAME)
        .await
}

fn notice_for(credential: &UserCredential, outcome: &AuthOutcome) -> Notice {
    let label = credential.name.to_string();
    match outcome {
        AuthOutcome::Authenticated { role } => Notice::Authenticated { label, role: *role },
        AuthOutcome::Rejected { status } => Notice::Rejected {
            label,
            status: *status,
        },
        AuthOutcome::Errored { message } => Notice::Errored {
            label,
            message: message.clone(),
        },
    }
}
