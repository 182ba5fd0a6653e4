//! Roster, token, rule and outcome types shared across the workspace.

use std::fmt::{self, Debug, Formatter};

use serde::Serialize;

/// Name of the scanner context the hooks configure by default.
pub const DEFAULT_CONTEXT_NAME: &str = "ReskFlow API";

const ROSTER_PASSWORD: &str = "Test123!@#";

/// Fixed set of accounts authenticated on every run, in processing order.
pub const DEFAULT_ROSTER: [UserCredential; 4] = [
    UserCredential {
        name: "test-customer",
        username: "customer@test.com",
        password: ROSTER_PASSWORD,
        role: Role::Customer,
    },
    UserCredential {
        name: "test-merchant",
        username: "merchant@test.com",
        password: ROSTER_PASSWORD,
        role: Role::Merchant,
    },
    UserCredential {
        name: "test-driver",
        username: "driver@test.com",
        password: ROSTER_PASSWORD,
        role: Role::Driver,
    },
    UserCredential {
        name: "test-admin",
        username: "admin@test.com",
        password: ROSTER_PASSWORD,
        role: Role::Admin,
    },
];

/// Role tag attached to a roster entry. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Storefront customer.
    Customer,
    /// Merchant managing a store.
    Merchant,
    /// Delivery driver.
    Driver,
    /// Platform administrator.
    Admin,
}

impl Role {
    /// Render the tag the way the target API names it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Merchant => "MERCHANT",
            Self::Driver => "DRIVER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Login credentials for one roster entry.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct UserCredential {
    /// Scanner-facing label; also drives the session and rule names.
    pub name: &'static str,
    /// Login identifier sent as `email`.
    pub username: &'static str,
    /// Login password.
    pub password: &'static str,
    /// Display-only role tag.
    pub role: Role,
}

impl UserCredential {
    /// Name of the empty HTTP session created for this user.
    #[must_use]
    pub fn session_name(&self) -> String {
        format!("session-{}", self.name)
    }

    /// Name of the header replacement rule registered for this user.
    #[must_use]
    pub fn rule_name(&self) -> String {
        format!("auth-{}", self.name)
    }
}

impl Debug for UserCredential {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UserCredential")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Scanner-side context resolved by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRef {
    /// Scanner-assigned identifier.
    pub id: String,
    /// Human-readable context name.
    pub name: String,
}

/// Bearer token returned by the target login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `Authorization` header value carrying the token.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl Debug for AccessToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("AccessToken(<redacted>)")
    }
}

/// Result of a login attempt that reached the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Status 200 with a token in the body.
    Granted(AccessToken),
    /// Any other status.
    Rejected {
        /// HTTP status code returned by the target.
        status: u16,
    },
}

/// Request-header replacement rule injecting a fixed `Authorization` value.
///
/// The match is a literal header name (never a regex) and the rule applies to
/// every request initiator.
#[derive(Clone, PartialEq, Eq)]
pub struct HeaderRule {
    /// Rule name, unique per user label.
    pub description: String,
    /// Header the rule rewrites.
    pub header: String,
    /// Value written into the header.
    pub replacement: String,
}

impl HeaderRule {
    /// Rule that pins `Authorization: Bearer {token}` for `credential`.
    #[must_use]
    pub fn authorization(credential: &UserCredential, token: &AccessToken) -> Self {
        Self {
            description: credential.rule_name(),
            header: "Authorization".to_string(),
            replacement: token.bearer(),
        }
    }
}

impl Debug for HeaderRule {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HeaderRule")
            .field("description", &self.description)
            .field("header", &self.header)
            .field("replacement", &"<redacted>")
            .finish()
    }
}

/// Terminal state of one roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuthOutcome {
    /// Logged in and registered with the scanner.
    Authenticated {
        /// Role tag of the entry.
        role: Role,
    },
    /// Login answered with a status other than 200.
    Rejected {
        /// HTTP status code returned by the target.
        status: u16,
    },
    /// Login or registration raised an error.
    Errored {
        /// Rendered error chain.
        message: String,
    },
}

impl AuthOutcome {
    /// Whether the entry reached the authenticated state.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Outcome for a single labelled user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReport {
    /// Scanner-facing label.
    pub label: String,
    /// Terminal state.
    #[serde(flatten)]
    pub outcome: AuthOutcome,
}

/// Ordered outcomes for one authentication run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthReport {
    /// Scanner context the run registered users in.
    pub context_id: Option<String>,
    /// One entry per roster user, in roster order.
    pub users: Vec<UserReport>,
}

impl AuthReport {
    /// Append the outcome for `label`.
    pub fn record(&mut self, label: impl Into<String>, outcome: AuthOutcome) {
        self.users.push(UserReport {
            label: label.into(),
            outcome,
        });
    }

    /// Number of users that authenticated.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.users
            .iter()
            .filter(|entry| entry.outcome.is_success())
            .count()
    }

    /// Number of users that were rejected or errored.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.users.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roster_keeps_fixed_order_and_labels() {
        let labels: Vec<&str> = DEFAULT_ROSTER.iter().map(|user| user.name).collect();
        assert_eq!(
            labels,
            vec!["test-customer", "test-merchant", "test-driver", "test-admin"]
        );
        assert!(
            DEFAULT_ROSTER
                .iter()
                .all(|user| user.username.ends_with("@test.com"))
        );
    }

    #[test]
    fn derived_names_follow_label() {
        let user = DEFAULT_ROSTER[2];
        assert_eq!(user.session_name(), "session-test-driver");
        assert_eq!(user.rule_name(), "auth-test-driver");
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let user = DEFAULT_ROSTER[0];
        let token = AccessToken::new("tok-secret");
        let rule = HeaderRule::authorization(&user, &token);

        let rendered = format!("{user:?} {token:?} {rule:?}");
        assert!(!rendered.contains("Test123"));
        assert!(!rendered.contains("tok-secret"));
        assert_eq!(rule.replacement, "Bearer tok-secret");
        assert_eq!(rule.header, "Authorization");
        assert_eq!(rule.description, "auth-test-customer");
    }

    #[test]
    fn report_counts_and_serializes_outcomes() {
        let mut report = AuthReport {
            context_id: Some("3".into()),
            users: Vec::new(),
        };
        report.record("test-customer", AuthOutcome::Authenticated { role: Role::Customer });
        report.record("test-driver", AuthOutcome::Rejected { status: 401 });

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        let value = serde_json::to_value(&report).expect("report serializes");
        assert_eq!(
            value,
            json!({
                "context_id": "3",
                "users": [
                    {"label": "test-customer", "outcome": "authenticated", "role": "CUSTOMER"},
                    {"label": "test-driver", "outcome": "rejected", "status": 401}
                ]
            })
        );
    }
}
