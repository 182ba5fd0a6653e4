use anyhow::anyhow;
use tracing::info;
use zapauth_bootstrap::Bootstrapper;

use crate::cli::Cli;
use crate::client::{CliDependencies, CliError, CliResult};
use crate::output::{notice_sink, render_report};

pub(crate) async fn handle_run(cli: &Cli, deps: &CliDependencies) -> CliResult<()> {
    let context_name = cli.context_name.trim();
    if context_name.is_empty() {
        return Err(CliError::validation("context name cannot be empty"));
    }

    let notices = notice_sink(cli.output);
    let report = Bootstrapper::new(&deps.scanner, &deps.login, notices.as_ref())
        .run(cli.target_url.as_str(), context_name)
        .await
        .map_err(|err| CliError::failure(anyhow::Error::new(err)))?;

    info!(
        authenticated = report.succeeded(),
        failed = report.failed(),
        "authentication run finished"
    );
    render_report(&report, cli.output)?;

    if cli.strict && report.failed() > 0 {
        return Err(CliError::failure(anyhow!(
            "{} of {} users failed to authenticate",
            report.failed(),
            report.users.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    fn cli_for(server: &MockServer, extra: &[&str]) -> Cli {
        let base = server.base_url();
        let mut args = vec!["zapauth", "--zap-url", base.as_str(), "--target-url", base.as_str()];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).expect("arguments parse")
    }

    fn mock_zap_actions(server: &MockServer) {
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
    }

    #[tokio::test]
    async fn run_registers_every_roster_user() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/JSON/context/view/context/")
                .query_param("contextName", "ReskFlow API");
            then.status(200)
                .json_body(json!({"context": {"id": "2", "name": "ReskFlow API"}}));
        });
        let login = server.mock(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(200)
                .json_body(json!({"tokens": {"accessToken": "tok-X"}}));
        });
        let new_user = server.mock(|when, then| {
            when.method(GET)
                .path("/JSON/users/action/newUser/")
                .query_param("contextId", "2");
            then.status(200).json_body(json!({"userId": "5"}));
        });
        mock_zap_actions(&server);

        let cli = cli_for(&server, &[]);
        let deps = CliDependencies::from_cli(&cli, "run-1").expect("deps build");
        handle_run(&cli, &deps).await.expect("run succeeds");

        login.assert_calls(4);
        new_user.assert_calls(4);
    }

    #[tokio::test]
    async fn strict_mode_fails_when_a_user_is_rejected() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/JSON/context/view/context/");
            then.status(400)
                .json_body(json!({"code": "context_not_found", "message": "Context not found"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/JSON/context/action/newContext/");
            then.status(200).json_body(json!({"contextId": "1"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/JSON/context/action/includeInContext/");
            then.status(200).json_body(json!({"Result": "OK"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(401).json_body(json!({"error": "invalid credentials"}));
        });

        let cli = cli_for(&server, &["--strict"]);
        let deps = CliDependencies::from_cli(&cli, "run-2").expect("deps build");
        let err = handle_run(&cli, &deps).await.expect_err("strict run fails");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.display_message(), "4 of 4 users failed to authenticate");
    }

    #[tokio::test]
    async fn scanner_rejection_aborts_the_run() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/JSON/context/view/context/");
            then.status(403)
                .json_body(json!({"code": "bad_api_key", "message": "Missing API key"}));
        });
        let login = server.mock(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(200);
        });

        let cli = cli_for(&server, &[]);
        let deps = CliDependencies::from_cli(&cli, "run-3").expect("deps build");
        let err = handle_run(&cli, &deps).await.expect_err("context lookup fails");
        assert!(err.display_message().starts_with("context lookup failed"));
        login.assert_calls(0);
    }
}
