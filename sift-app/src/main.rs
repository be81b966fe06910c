use anyhow::Result;
use clap::{Parser, Subcommand};
use sift_common::observability::{LogConfig, LogFormat, init_logging};
use sift_config::SiftConfig;
use sift_pipeline::{NoProgress, Presenter, ProgressSink, Stage, TerminalPresenter};
use sift_runtime::SiftRuntime;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use wiring::{CredentialSource, build_pipeline, credentials, load_config};

mod wiring;

/// Answer questions from fresh web search results.
#[derive(Debug, Parser)]
#[command(name = "sift", version, about)]
struct Cli {
    /// Path to sift.yaml (defaults to ./sift.yaml, then the user config dir).
    #[arg(long, env = "SIFT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Where API keys are read from.
    #[arg(long, value_enum, default_value_t = CredentialSource::Env, global = true)]
    credentials: CredentialSource,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Answer one question and print the report.
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
        /// Mirror logs and stage progress to stderr.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Interactive terminal UI (default).
    Tui,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let command = cli.command.unwrap_or(Cmd::Tui);
    let verbose = matches!(command, Cmd::Ask { verbose: true, .. });

    let format: LogFormat = config
        .logging
        .format
        .parse()
        .map_err(anyhow::Error::msg)?;
    let log_path = init_logging(LogConfig {
        app_name: "sift",
        emit_stderr: verbose,
        format,
        default_filter: config.logging.filter.clone(),
        ..LogConfig::default()
    })?;
    tracing::info!(log = %log_path.display(), "sift.start");

    let runtime = SiftRuntime::build("sift-worker", None)?;
    let creds = credentials(cli.credentials, &config);

    let outcome = match command {
        Cmd::Ask { question, verbose } => {
            runtime.block_on(ask(&config, creds.as_ref(), &question.join(" "), verbose))
        }
        Cmd::Tui => runtime.block_on(tui(&config, creds.as_ref(), runtime.handle())),
    };

    runtime.shutdown(Duration::from_millis(500));
    outcome
}

struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn stage(&self, stage: Stage) {
        eprintln!("{stage}");
    }
}

async fn ask(
    config: &SiftConfig,
    creds: &dyn sift_config::CredentialProvider,
    question: &str,
    verbose: bool,
) -> Result<ExitCode> {
    let result = match build_pipeline(config, creds).await {
        Ok(pipeline) => {
            let progress: &dyn ProgressSink = if verbose { &StderrProgress } else { &NoProgress };
            pipeline.run(question, progress).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            TerminalPresenter::new(io::stdout().lock()).render(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::error!(error = %err, "sift.ask.failed");
            TerminalPresenter::new(io::stderr().lock()).render_error(&err)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn tui(
    config: &SiftConfig,
    creds: &dyn sift_config::CredentialProvider,
    handle: sift_runtime::SiftHandle,
) -> Result<ExitCode> {
    let pipeline = match build_pipeline(config, creds).await {
        Ok(pipeline) => Arc::new(pipeline),
        Err(err) => {
            tracing::error!(error = %err, "sift.tui.setup_failed");
            TerminalPresenter::new(io::stderr().lock()).render_error(&err)?;
            return Ok(ExitCode::FAILURE);
        }
    };
    sift_tui::run_tui(pipeline, handle).await?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_tui_with_env_credentials() {
        let cli = Cli::try_parse_from(["sift"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.credentials, CredentialSource::Env);
    }

    #[test]
    fn ask_requires_a_question() {
        assert!(Cli::try_parse_from(["sift", "ask"]).is_err());
    }

    #[test]
    fn ask_joins_words_and_accepts_global_flags() {
        let cli = Cli::try_parse_from([
            "sift",
            "ask",
            "what",
            "is",
            "rust?",
            "--credentials",
            "config",
            "--config",
            "/tmp/sift.yaml",
        ])
        .unwrap();
        assert_eq!(cli.credentials, CredentialSource::Config);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/sift.yaml")));
        match cli.command {
            Some(Cmd::Ask { question, verbose }) => {
                assert_eq!(question.join(" "), "what is rust?");
                assert!(!verbose);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
