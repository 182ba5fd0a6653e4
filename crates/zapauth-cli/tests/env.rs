use std::process::{Command, Output};

use httpmock::MockServer;
use httpmock::prelude::*;
use serde_json::{Value, json};

const ENV_VARS: [&str; 7] = [
    "ZAPAUTH_ZAP_URL",
    "ZAPAUTH_ZAP_API_KEY",
    "ZAPAUTH_TARGET_URL",
    "ZAPAUTH_CONTEXT_NAME",
    "ZAPAUTH_HTTP_TIMEOUT_SECS",
    "ZAPAUTH_LOG_FORMAT",
    "RUST_LOG",
];

fn zapauth(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_zapauth"));
    for name in ENV_VARS {
        command.env_remove(name);
    }
    command
        .args(args)
        .envs(env.iter().copied())
        .output()
        .expect("zapauth binary runs")
}

#[test]
fn environment_supplies_scanner_and_target_settings() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET)
            .path("/JSON/context/view/context/")
            .query_param("contextName", "Env Context")
            .header("x-zap-api-key", "env-key");
        then.status(200)
            .json_body(json!({"context": {"id": "9", "name": "Env Context"}}));
    });
    let login = server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200)
            .json_body(json!({"tokens": {"accessToken": "tok-env"}}));
    });
    let new_user = server.mock(|when, then| {
        when.method(GET)
            .path("/JSON/users/action/newUser/")
            .query_param("contextId", "9");
        then.status(200).json_body(json!({"userId": "1"}));
    });
    for path in [
        "/JSON/users/action/setAuthenticationCredentials/",
        "/JSON/users/action/setUserEnabled/",
        "/JSON/httpSessions/action/createEmptySession/",
        "/JSON/replacer/action/addRule/",
    ] {
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(json!({"Result": "OK"}));
        });
    }

    let base = server.base_url();
    let output = zapauth(
        &["--output", "json"],
        &[
            ("ZAPAUTH_ZAP_URL", base.as_str()),
            ("ZAPAUTH_TARGET_URL", base.as_str()),
            ("ZAPAUTH_ZAP_API_KEY", "env-key"),
            ("ZAPAUTH_CONTEXT_NAME", "Env Context"),
            ("ZAPAUTH_HTTP_TIMEOUT_SECS", "5"),
            ("ZAPAUTH_LOG_FORMAT", "json"),
        ],
    );

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: Value = serde_json::from_slice(&output.stdout).expect("report is JSON");
    assert_eq!(report["context_id"], "9");
    assert_eq!(report["users"].as_array().map(Vec::len), Some(4));
    lookup.assert();
    login.assert_calls(4);
    new_user.assert_calls(4);
}

#[test]
fn timeout_is_read_from_environment() {
    let output = zapauth(&["roster"], &[("ZAPAUTH_HTTP_TIMEOUT_SECS", "soon")]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("soon"), "stderr: {stderr}");
    assert!(stderr.contains("--timeout"), "stderr: {stderr}");
}

#[test]
fn flags_take_precedence_over_environment() {
    let output = zapauth(
        &["--timeout", "3", "roster"],
        &[("ZAPAUTH_HTTP_TIMEOUT_SECS", "soon")],
    );

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("test-admin"));
}
