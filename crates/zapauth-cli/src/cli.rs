//! Argument parsing and command dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use reqwest::Url;
use uuid::Uuid;
use zapauth_core::DEFAULT_CONTEXT_NAME;
use zapauth_telemetry::{LogFormat, LoggingConfig, RunContextGuard, init_logging};
use zapauth_zap::DEFAULT_ZAP_URL;

use crate::client::{CliDependencies, CliResult, parse_url};
use crate::commands::{handle_roster, handle_run};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TARGET_URL: &str = "http://localhost:3000";

/// Parses CLI arguments, executes the requested command, and reports errors.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    execute(cli).await
}

pub(crate) async fn execute(cli: Cli) -> i32 {
    let logging = LoggingConfig {
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let run_id = Uuid::new_v4().to_string();
    let _run_span = RunContextGuard::new(run_id.clone(), cli.target_url.as_str());

    match dispatch(cli, &run_id).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, run_id: &str) -> CliResult<()> {
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let deps = CliDependencies::from_cli(&cli, run_id)?;
            handle_run(&cli, &deps).await
        }
        Command::Roster => handle_roster(cli.output),
    }
}

#[derive(Parser)]
#[command(
    name = "zapauth",
    about = "Authenticate the test roster and register bearer tokens with ZAP"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "ZAPAUTH_ZAP_URL",
        value_parser = parse_url,
        default_value = DEFAULT_ZAP_URL
    )]
    pub(crate) zap_url: Url,
    #[arg(long, global = true, env = "ZAPAUTH_ZAP_API_KEY", hide_env_values = true)]
    pub(crate) zap_api_key: Option<String>,
    #[arg(
        long,
        global = true,
        env = "ZAPAUTH_TARGET_URL",
        value_parser = parse_url,
        default_value = DEFAULT_TARGET_URL
    )]
    pub(crate) target_url: Url,
    #[arg(
        long,
        global = true,
        env = "ZAPAUTH_CONTEXT_NAME",
        default_value = DEFAULT_CONTEXT_NAME
    )]
    pub(crate) context_name: String,
    #[arg(
        long,
        global = true,
        env = "ZAPAUTH_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for the run report"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "ZAPAUTH_LOG_FORMAT", value_enum)]
    pub(crate) log_format: Option<LogFormatArg>,
    #[arg(
        long,
        global = true,
        help = "Exit with an error when any user fails to authenticate"
    )]
    pub(crate) strict: bool,
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Log in every roster user and register them with ZAP (default).
    Run,
    /// Print the built-in roster without passwords.
    Roster,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_target_local_api_and_zap() {
        let cli = Cli::try_parse_from(["zapauth"]).expect("defaults parse");
        assert_eq!(cli.target_url.as_str(), "http://localhost:3000/");
        assert_eq!(cli.zap_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(cli.context_name, DEFAULT_CONTEXT_NAME);
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cli.output, OutputFormat::Table);
        assert!(cli.command.is_none());
        assert!(!cli.strict);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "zapauth",
            "--target-url",
            "https://staging.example.test",
            "--zap-api-key",
            "k",
            "--output",
            "json",
            "--strict",
            "roster",
        ])
        .expect("flags parse");
        assert_eq!(cli.target_url.host_str(), Some("staging.example.test"));
        assert_eq!(cli.zap_api_key.as_deref(), Some("k"));
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.strict);
        assert_eq!(cli.command, Some(Command::Roster));
    }

    #[test]
    fn every_setting_has_an_environment_fallback() {
        let command = Cli::command();
        let bound: Vec<(String, String)> = command
            .get_arguments()
            .filter_map(|arg| {
                let env = arg.get_env()?.to_str()?.to_string();
                Some((arg.get_id().to_string(), env))
            })
            .collect();

        for (id, env) in [
            ("zap_url", "ZAPAUTH_ZAP_URL"),
            ("zap_api_key", "ZAPAUTH_ZAP_API_KEY"),
            ("target_url", "ZAPAUTH_TARGET_URL"),
            ("context_name", "ZAPAUTH_CONTEXT_NAME"),
            ("timeout", "ZAPAUTH_HTTP_TIMEOUT_SECS"),
            ("log_format", "ZAPAUTH_LOG_FORMAT"),
        ] {
            assert!(
                bound.contains(&(id.to_string(), env.to_string())),
                "{id} is not bound to {env}"
            );
        }
    }

    #[test]
    fn invalid_target_url_is_rejected() {
        assert!(Cli::try_parse_from(["zapauth", "--target-url", "localhost"]).is_err());
    }
}
