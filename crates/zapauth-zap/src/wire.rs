//! Endpoint table and response decoding for the ZAP JSON API.

use serde::Deserialize;
use serde_json::Value;
use zapauth_core::{ContextRef, ScannerError, ScannerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    View,
    Action,
}

/// One ZAP API operation, addressed as `JSON/{component}/{kind}/{name}/`
/// relative to the API base URL.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ApiCall {
    pub(crate) component: &'static str,
    pub(crate) kind: CallKind,
    pub(crate) name: &'static str,
    /// `component.name`, used in errors and logs.
    pub(crate) label: &'static str,
}

impl ApiCall {
    pub(crate) fn path(&self) -> String {
        let kind = match self.kind {
            CallKind::View => "view",
            CallKind::Action => "action",
        };
        format!("JSON/{}/{kind}/{}/", self.component, self.name)
    }
}

pub(crate) const CONTEXT_VIEW: ApiCall = ApiCall {
    component: "context",
    kind: CallKind::View,
    name: "context",
    label: "context.context",
};
pub(crate) const NEW_CONTEXT: ApiCall = ApiCall {
    component: "context",
    kind: CallKind::Action,
    name: "newContext",
    label: "context.newContext",
};
pub(crate) const INCLUDE_IN_CONTEXT: ApiCall = ApiCall {
    component: "context",
    kind: CallKind::Action,
    name: "includeInContext",
    label: "context.includeInContext",
};
pub(crate) const NEW_USER: ApiCall = ApiCall {
    component: "users",
    kind: CallKind::Action,
    name: "newUser",
    label: "users.newUser",
};
pub(crate) const SET_AUTH_CREDENTIALS: ApiCall = ApiCall {
    component: "users",
    kind: CallKind::Action,
    name: "setAuthenticationCredentials",
    label: "users.setAuthenticationCredentials",
};
pub(crate) const SET_USER_ENABLED: ApiCall = ApiCall {
    component: "users",
    kind: CallKind::Action,
    name: "setUserEnabled",
    label: "users.setUserEnabled",
};
pub(crate) const CREATE_EMPTY_SESSION: ApiCall = ApiCall {
    component: "httpSessions",
    kind: CallKind::Action,
    name: "createEmptySession",
    label: "httpSessions.createEmptySession",
};
pub(crate) const ADD_REPLACER_RULE: ApiCall = ApiCall {
    component: "replacer",
    kind: CallKind::Action,
    name: "addRule",
    label: "replacer.addRule",
};

/// Error body ZAP returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ZapProblem {
    pub(crate) code: Option<String>,
    pub(crate) message: Option<String>,
}

/// Problem code ZAP answers with when a named context does not exist.
pub(crate) const CONTEXT_NOT_FOUND: &str = "context_not_found";

pub(crate) fn context_ref(call: ApiCall, body: &Value) -> ScannerResult<ContextRef> {
    let context = body.get("context").ok_or(ScannerError::MissingField {
        operation: call.label,
        field: "context",
    })?;
    Ok(ContextRef {
        id: id_field(call, context, "id")?,
        name: id_field(call, context, "name")?,
    })
}

/// Read a scalar field as a string; ZAP emits identifiers as strings but
/// numbers are accepted too.
pub(crate) fn id_field(call: ApiCall, body: &Value, field: &'static str) -> ScannerResult<String> {
    match body.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Number(value)) => Ok(value.to_string()),
        _ => Err(ScannerError::MissingField {
            operation: call.label,
            field,
        }),
    }
}

/// Actions answer `{"Result": "OK"}`; anything else is treated as a refusal.
pub(crate) fn expect_ok(call: ApiCall, status: u16, body: &Value) -> ScannerResult<()> {
    match body.get("Result").and_then(Value::as_str) {
        Some("OK") | None => Ok(()),
        Some(other) => Err(ScannerError::Api {
            operation: call.label,
            status,
            code: None,
            message: Some(other.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paths_follow_json_api_layout() {
        assert_eq!(CONTEXT_VIEW.path(), "JSON/context/view/context/");
        assert_eq!(ADD_REPLACER_RULE.path(), "JSON/replacer/action/addRule/");
    }

    #[test]
    fn context_ref_reads_numeric_and_string_ids() {
        let body = json!({"context": {"id": 4, "name": "ReskFlow API"}});
        let context = context_ref(CONTEXT_VIEW, &body).expect("context decodes");
        assert_eq!(context.id, "4");
        assert_eq!(context.name, "ReskFlow API");

        let missing = json!({"context": {"name": "x"}});
        assert!(matches!(
            context_ref(CONTEXT_VIEW, &missing),
            Err(ScannerError::MissingField { field: "id", .. })
        ));
    }

    #[test]
    fn expect_ok_rejects_unexpected_results() {
        assert!(expect_ok(NEW_USER, 200, &json!({"Result": "OK"})).is_ok());
        assert!(matches!(
            expect_ok(NEW_USER, 200, &json!({"Result": "FAIL"})),
            Err(ScannerError::Api { status: 200, .. })
        ));
    }
}
