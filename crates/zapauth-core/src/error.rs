//! Error types raised by the scanner and login collaborators.

use std::error::Error;

use thiserror::Error;

/// Errors raised by `ScannerControl` implementations.
#[derive(Debug, Error)]
pub enum ScannerError {
    /// The request never produced a response.
    #[error("scanner request {operation} failed")]
    Transport {
        /// Scanner API operation identifier.
        operation: &'static str,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The scanner answered with an error status.
    #[error("scanner rejected {operation} with status {status}")]
    Api {
        /// Scanner API operation identifier.
        operation: &'static str,
        /// HTTP status code returned by the scanner.
        status: u16,
        /// Scanner error code, when the body carried one.
        code: Option<String>,
        /// Scanner error message, when the body carried one.
        message: Option<String>,
    },
    /// The response body was not the expected JSON.
    #[error("scanner response for {operation} could not be decoded")]
    Decode {
        /// Scanner API operation identifier.
        operation: &'static str,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The response body lacked a required field.
    #[error("scanner response for {operation} is missing `{field}`")]
    MissingField {
        /// Scanner API operation identifier.
        operation: &'static str,
        /// Field that was absent.
        field: &'static str,
    },
}

/// Convenience alias for scanner operation results.
pub type ScannerResult<T> = Result<T, ScannerError>;

/// Errors raised by `LoginEndpoint` implementations.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The login request never produced a response.
    #[error("login request failed")]
    Transport {
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A 200 response carried a body that was not JSON.
    #[error("login response could not be decoded")]
    Decode {
        /// Underlying decode failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A 200 response lacked `tokens.accessToken`.
    #[error("login response is missing tokens.accessToken")]
    MissingToken,
}

/// Convenience alias for login results.
pub type LoginResult<T> = Result<T, LoginError>;

/// Render an error and its sources as `outer: inner: root`.
#[must_use]
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        rendered.push_str(": ");
        rendered.push_str(&source.to_string());
        current = source.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn error_chain_joins_sources() {
        let err = ScannerError::Transport {
            operation: "users.newUser",
            source: Box::new(io::Error::other("connection refused")),
        };
        assert_eq!(
            error_chain(&err),
            "scanner request users.newUser failed: connection refused"
        );
    }

    #[test]
    fn errors_render_context_fields() {
        let cases: Vec<(Box<dyn Error>, &str)> = vec![
            (
                Box::new(ScannerError::Api {
                    operation: "context.newContext",
                    status: 400,
                    code: Some("already_exists".into()),
                    message: None,
                }),
                "scanner rejected context.newContext with status 400",
            ),
            (
                Box::new(ScannerError::MissingField {
                    operation: "users.newUser",
                    field: "userId",
                }),
                "scanner response for users.newUser is missing `userId`",
            ),
            (
                Box::new(LoginError::MissingToken),
                "login response is missing tokens.accessToken",
            ),
        ];

        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
        }
    }
}
