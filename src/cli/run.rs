//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Wires the app and creates the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use anyhow::Result;
use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

use crate::{App, ArchProError, CliArgs, Config, ConfigError, ExitCode, GenerationError};
use archpro_utils::logging::init_tracing;
use archpro_utils::redaction::redact_error_message;

/// Main CLI execution function.
///
/// Prints all output, including errors, and returns the exit code on
/// failure. main.rs only maps the code to the process exit status.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        // Absent flag leaves the file value in effect
        verbose: cli.verbose.then_some(true),
        view_mode: None,
        llm_provider: cli.llm_provider.clone(),
        api_key_env: cli.api_key_env.clone(),
        poll_interval: cli.poll_interval,
        max_polls: cli.max_polls,
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => return Err(report_error(&err, "config", ExitCode::CLI_ARGS)),
    };

    if let Err(e) = init_tracing(config.verbose()) {
        eprintln!("⚠ Failed to initialize logging: {e}");
    }

    let app = match App::from_config(config) {
        Ok(app) => app,
        Err(err) => {
            let err = ArchProError::Generation(err);
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let operation = cli.command.name();
    tracing::debug!(
        command = operation,
        provider = app.studio.provider_name(),
        live = app.studio.is_live(),
        "Dispatching command"
    );
    let result = rt.block_on(dispatch(cli.command, &app));

    match result {
        Ok(code) if code == ExitCode::SUCCESS => Ok(()),
        Ok(code) => Err(code),
        Err(err) => Err(report_error(&err, operation, ExitCode::INTERNAL)),
    }
}

async fn dispatch(command: Commands, app: &App) -> Result<ExitCode> {
    match command {
        Commands::Topics { json } => commands::execute_topics_command(app, json)?,
        Commands::Render {
            topic,
            phases,
            blog,
            json,
        } => commands::execute_render_command(app, &topic, &phases, blog, json).await?,
        Commands::Video { topic, json } => {
            commands::execute_video_command(app, &topic, json).await?;
        }
        Commands::Session => commands::execute_session_command(app).await?,
        Commands::Doctor { json } => return commands::execute_doctor_command(app, json),
        Commands::Config { json } => commands::execute_config_command(&app.config, json)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Print `err` for the user and pick its exit code.
///
/// Typed errors carry their own code and suggestions; anything else is
/// printed redacted with `fallback`.
fn report_error(err: &anyhow::Error, operation: &str, fallback: ExitCode) -> ExitCode {
    let typed = if let Some(e) = err.downcast_ref::<ArchProError>() {
        eprintln!("{}", e.display_for_user());
        return e.to_exit_code();
    } else if let Some(e) = err.downcast_ref::<ConfigError>() {
        ArchProError::Config(e.clone())
    } else if let Some(e) = err.downcast_ref::<GenerationError>() {
        ArchProError::Generation(e.clone())
    } else {
        eprintln!(
            "✗ {operation} failed: {}",
            redact_error_message(&format!("{err:#}"))
        );
        eprintln!("\n  Run with --verbose for more detailed output");
        return fallback;
    };

    eprintln!("{}", typed.display_for_user());
    typed.to_exit_code()
}
