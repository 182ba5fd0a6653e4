//! Collaborator traits implemented by the scanner and login adapters.

use async_trait::async_trait;

use crate::error::{LoginResult, ScannerResult};
use crate::model::{ContextRef, HeaderRule, LoginOutcome};

/// Control surface of the security scanner.
///
/// Calls are expected to take effect immediately; callers issue them one at a
/// time and never rely on transactions.
#[async_trait]
pub trait ScannerControl: Send + Sync {
    /// Resolve a context by its exact name; `None` when no such context exists.
    async fn find_context(&self, name: &str) -> ScannerResult<Option<ContextRef>>;

    /// Create a context and return its identifier.
    async fn new_context(&self, name: &str) -> ScannerResult<String>;

    /// Add a URL regex to the context scope.
    async fn include_in_context(&self, context_name: &str, regex: &str) -> ScannerResult<()>;

    /// Create a user in a context and return its identifier.
    async fn new_user(&self, context_id: &str, name: &str) -> ScannerResult<String>;

    /// Replace the authentication credentials carried by a user.
    async fn set_authentication_credentials(
        &self,
        context_id: &str,
        user_id: &str,
        credentials: &str,
    ) -> ScannerResult<()>;

    /// Enable or disable a user.
    async fn set_user_enabled(
        &self,
        context_id: &str,
        user_id: &str,
        enabled: bool,
    ) -> ScannerResult<()>;

    /// Create an empty named HTTP session for a site.
    async fn create_empty_session(&self, site: &str, session: &str) -> ScannerResult<()>;

    /// Register a request-header replacement rule.
    async fn add_header_rule(&self, rule: &HeaderRule) -> ScannerResult<()>;
}

/// Login endpoint of the API under test.
#[async_trait]
pub trait LoginEndpoint: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> LoginResult<LoginOutcome>;
}
