//! # Design
//!
//! - Context errors are fatal and propagate to the caller.
//! - Per-user errors never escape `authenticate_all`; they are rendered into
//!   notices and report entries.

use thiserror::Error;
use zapauth_core::{LoginError, ScannerError};

/// Result alias for bootstrap operations.
pub type BootstrapResult<T> = Result<T, BootstrapError>;

/// Errors raised while bootstrapping scanner authentication.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Listing or viewing scanner contexts failed.
    #[error("context lookup failed")]
    ContextLookup {
        /// Context being resolved.
        context_name: String,
        /// Source scanner error.
        source: ScannerError,
    },
    /// Creating or scoping the context failed.
    #[error("context creation failed")]
    ContextCreate {
        /// Context being created.
        context_name: String,
        /// Source scanner error.
        source: ScannerError,
    },
    /// Logging in to the target failed.
    #[error("login failed")]
    Login {
        /// Roster label of the user.
        label: String,
        /// Source login error.
        source: LoginError,
    },
    /// Registering the user's token with the scanner failed.
    #[error("scanner registration failed")]
    Registration {
        /// Roster label of the user.
        label: String,
        /// Source scanner error.
        source: ScannerError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn bootstrap_errors_keep_sources() {
        let cases = vec![
            (
                BootstrapError::ContextLookup {
                    context_name: "ReskFlow API".into(),
                    source: ScannerError::MissingField {
                        operation: "context.context",
                        field: "context",
                    },
                },
                "context lookup failed",
            ),
            (
                BootstrapError::Login {
                    label: "test-admin".into(),
                    source: LoginError::MissingToken,
                },
                "login failed",
            ),
        ];

        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
            assert!(err.source().is_some());
        }
    }
}
