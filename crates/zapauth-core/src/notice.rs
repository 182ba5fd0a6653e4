//! Operator-facing progress notices.

use std::fmt::{self, Display, Formatter};

use crate::model::Role;

/// One line of progress reported to whoever runs the hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The run is about to resolve its context.
    Started {
        /// Context the run configures.
        context_name: String,
    },
    /// A user logged in and was registered with the scanner.
    Authenticated {
        /// Scanner-facing label.
        label: String,
        /// Role tag of the user.
        role: Role,
    },
    /// The login endpoint answered with a status other than 200.
    Rejected {
        /// Scanner-facing label.
        label: String,
        /// HTTP status code.
        status: u16,
    },
    /// Login or registration raised an error.
    Errored {
        /// Scanner-facing label.
        label: String,
        /// Rendered error chain.
        message: String,
    },
    /// Every roster entry has been processed.
    Completed,
}

impl Notice {
    /// Whether the notice reports a per-user failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Errored { .. })
    }
}

impl Display for Notice {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { context_name } => {
                write!(formatter, "Setting up {context_name} authentication...")
            }
            Self::Authenticated { label, role } => {
                write!(formatter, "✓ Authenticated user: {label} (role: {role})")
            }
            Self::Rejected { label, status } => {
                write!(formatter, "✗ Failed to authenticate {label}: {status}")
            }
            Self::Errored { label, message } => {
                write!(formatter, "✗ Error authenticating {label}: {message}")
            }
            Self::Completed => formatter.write_str("✓ Authentication setup complete"),
        }
    }
}

/// Destination for notices.
pub trait NoticeSink: Send + Sync {
    /// Report a notice.
    fn emit(&self, notice: &Notice);
}

/// Prints each notice on its own stdout line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotices;

impl NoticeSink for StdoutNotices {
    fn emit(&self, notice: &Notice) {
        println!("{notice}");
    }
}
