//! In-memory stand-ins for the scanner, the login endpoint and notice output.

use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use zapauth_core::{
    AccessToken, ContextRef, HeaderRule, LoginEndpoint, LoginError, LoginOutcome, LoginResult,
    Notice, NoticeSink, ScannerControl, ScannerError, ScannerResult,
};

use crate::fixtures::token_for;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// User registered through [`RecordingScanner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUser {
    /// Context the user belongs to.
    pub context_id: String,
    /// Identifier handed back by `new_user`.
    pub user_id: String,
    /// Label the user was created with.
    pub name: String,
    /// Last credentials set on the user.
    pub credentials: Option<String>,
    /// Enabled flag.
    pub enabled: bool,
}

#[derive(Debug, Default)]
struct ScannerState {
    contexts: Vec<ContextRef>,
    includes: Vec<(String, String)>,
    users: Vec<RecordedUser>,
    sessions: Vec<(String, String)>,
    rules: Vec<HeaderRule>,
    calls: Vec<&'static str>,
    failures: Vec<(&'static str, Option<String>)>,
}

impl ScannerState {
    fn enter(&mut self, operation: &'static str, key: &str) -> ScannerResult<()> {
        self.calls.push(operation);
        let injected = self.failures.iter().any(|(failing, on)| {
            *failing == operation && on.as_deref().is_none_or(|expected| expected == key)
        });
        if injected {
            return Err(ScannerError::Api {
                operation,
                status: 500,
                code: Some("internal_error".into()),
                message: Some("injected failure".into()),
            });
        }
        Ok(())
    }

    fn user_mut(
        &mut self,
        operation: &'static str,
        context_id: &str,
        user_id: &str,
    ) -> ScannerResult<&mut RecordedUser> {
        self.users
            .iter_mut()
            .find(|user| user.context_id == context_id && user.user_id == user_id)
            .ok_or_else(|| ScannerError::Api {
                operation,
                status: 400,
                code: Some("does_not_exist".into()),
                message: Some(format!("user {user_id} not found")),
            })
    }
}

/// `ScannerControl` that records every call in memory.
#[derive(Debug, Default)]
pub struct RecordingScanner {
    state: Mutex<ScannerState>,
}

impl RecordingScanner {
    /// Scanner with no contexts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner that already knows the given context names, numbered from 1.
    #[must_use]
    pub fn with_contexts(names: &[&str]) -> Self {
        let scanner = Self::new();
        {
            let mut state = lock(&scanner.state);
            for (index, name) in names.iter().enumerate() {
                state.contexts.push(ContextRef {
                    id: (index + 1).to_string(),
                    name: (*name).to_string(),
                });
            }
        }
        scanner
    }

    /// Fail `operation` for every call, or only for calls keyed by `key`:
    /// the context name, user label, user id, session name or rule name the
    /// call targets.
    pub fn fail_on(&self, operation: &'static str, key: Option<&str>) {
        lock(&self.state)
            .failures
            .push((operation, key.map(str::to_string)));
    }

    /// Contexts known to the scanner.
    #[must_use]
    pub fn contexts(&self) -> Vec<ContextRef> {
        lock(&self.state).contexts.clone()
    }

    /// `(context name, regex)` pairs added to context scopes.
    #[must_use]
    pub fn includes(&self) -> Vec<(String, String)> {
        lock(&self.state).includes.clone()
    }

    /// Registered users, in creation order.
    #[must_use]
    pub fn users(&self) -> Vec<RecordedUser> {
        lock(&self.state).users.clone()
    }

    /// `(site, session name)` pairs created.
    #[must_use]
    pub fn sessions(&self) -> Vec<(String, String)> {
        lock(&self.state).sessions.clone()
    }

    /// Header rules registered.
    #[must_use]
    pub fn rules(&self) -> Vec<HeaderRule> {
        lock(&self.state).rules.clone()
    }

    /// Operation names in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.state).calls.clone()
    }
}

#[async_trait]
impl ScannerControl for RecordingScanner {
    async fn find_context(&self, name: &str) -> ScannerResult<Option<ContextRef>> {
        let mut state = lock(&self.state);
        state.enter("find_context", name)?;
        Ok(state
            .contexts
            .iter()
            .find(|context| context.name == name)
            .cloned())
    }

    async fn new_context(&self, name: &str) -> ScannerResult<String> {
        let mut state = lock(&self.state);
        state.enter("new_context", name)?;
        let id = (state.contexts.len() + 1).to_string();
        state.contexts.push(ContextRef {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn include_in_context(&self, context_name: &str, regex: &str) -> ScannerResult<()> {
        let mut state = lock(&self.state);
        state.enter("include_in_context", context_name)?;
        state
            .includes
            .push((context_name.to_string(), regex.to_string()));
        Ok(())
    }

    async fn new_user(&self, context_id: &str, name: &str) -> ScannerResult<String> {
        let mut state = lock(&self.state);
        state.enter("new_user", name)?;
        let user_id = state.users.len().to_string();
        state.users.push(RecordedUser {
            context_id: context_id.to_string(),
            user_id: user_id.clone(),
            name: name.to_string(),
            credentials: None,
            enabled: false,
        });
        Ok(user_id)
    }

    async fn set_authentication_credentials(
        &self,
        context_id: &str,
        user_id: &str,
        credentials: &str,
    ) -> ScannerResult<()> {
        let mut state = lock(&self.state);
        state.enter("set_authentication_credentials", user_id)?;
        state
            .user_mut("set_authentication_credentials", context_id, user_id)?
            .credentials = Some(credentials.to_string());
        Ok(())
    }

    async fn set_user_enabled(
        &self,
        context_id: &str,
        user_id: &str,
        enabled: bool,
    ) -> ScannerResult<()> {
        let mut state = lock(&self.state);
        state.enter("set_user_enabled", user_id)?;
        state
            .user_mut("set_user_enabled", context_id, user_id)?
            .enabled = enabled;
        Ok(())
    }

    async fn create_empty_session(&self, site: &str, session: &str) -> ScannerResult<()> {
        let mut state = lock(&self.state);
        state.enter("create_empty_session", session)?;
        state.sessions.push((site.to_string(), session.to_string()));
        Ok(())
    }

    async fn add_header_rule(&self, rule: &HeaderRule) -> ScannerResult<()> {
        let mut state = lock(&self.state);
        state.enter("add_header_rule", &rule.description)?;
        state.rules.push(rule.clone());
        Ok(())
    }
}

/// Scripted answer for one login email.
#[derive(Debug, Clone)]
pub enum LoginScript {
    /// Answer 200 with this token.
    Grant(String),
    /// Answer with this non-200 status.
    Reject(u16),
    /// Fail as if the connection dropped.
    Unreachable,
}

/// `LoginEndpoint` answering from a per-email script.
///
/// Unscripted emails are granted [`token_for`] their address.
#[derive(Debug, Default)]
pub struct ScriptedLogin {
    scripts: HashMap<String, LoginScript>,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedLogin {
    /// Login that grants every email.
    #[must_use]
    pub fn granting_all() -> Self {
        Self::default()
    }

    /// Script the answer for `email`.
    #[must_use]
    pub fn with(mut self, email: &str, script: LoginScript) -> Self {
        self.scripts.insert(email.to_string(), script);
        self
    }

    /// Emails that attempted to log in, in order.
    #[must_use]
    pub fn attempts(&self) -> Vec<String> {
        lock(&self.attempts).clone()
    }
}

#[async_trait]
impl LoginEndpoint for ScriptedLogin {
    async fn login(&self, email: &str, _password: &str) -> LoginResult<LoginOutcome> {
        lock(&self.attempts).push(email.to_string());
        match self.scripts.get(email) {
            None => Ok(LoginOutcome::Granted(AccessToken::new(token_for(email)))),
            Some(LoginScript::Grant(token)) => Ok(LoginOutcome::Granted(AccessToken::new(token))),
            Some(LoginScript::Reject(status)) => Ok(LoginOutcome::Rejected { status: *status }),
            Some(LoginScript::Unreachable) => Err(LoginError::Transport {
                source: Box::new(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )),
            }),
        }
    }
}

/// `NoticeSink` that keeps every notice.
#[derive(Debug, Default)]
pub struct RecordingNotices {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotices {
    /// Notices in emission order.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    /// Per-user failure notices.
    #[must_use]
    pub fn failures(&self) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(Notice::is_failure)
            .collect()
    }

    /// Per-user success notices.
    #[must_use]
    pub fn successes(&self) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(|notice| matches!(notice, Notice::Authenticated { .. }))
            .collect()
    }
}

impl NoticeSink for RecordingNotices {
    fn emit(&self, notice: &Notice) {
        lock(&self.notices).push(notice.clone());
    }
}
