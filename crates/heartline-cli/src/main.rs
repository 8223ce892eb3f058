//! Heartline CLI - name compatibility game with a shared play ledger
//!
//! This is the command-line interface for Heartline. It provides a
//! user-friendly interface to the core library functionality.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod output;
mod ui;

use clap::{CommandFactory, Parser};

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{history, init, misc, play, stats};
use crate::constants::env_vars;
use crate::errors::CliError;
use crate::ui::print_error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(env_vars::LOG, "warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        let ui_ctx = ctx.ui_context(false, None);
        log::debug!("Command failed: {:?}", e);

        if let Some(cli_err) = e.downcast_ref::<CliError>() {
            print_error(&ui_ctx, cli_err.message(), cli_err.hint());
            std::process::exit(cli_err.exit_code());
        }

        let error_msg = format!("{:#}", e);
        let hint = extract_error_hint(&error_msg);
        print_error(&ui_ctx, &error_msg, hint.as_deref());
        std::process::exit(1);
    }
}

/// Provide contextual hints for common error messages.
fn extract_error_hint(error: &str) -> Option<String> {
    if let Some(idx) = error.find("\nHint:") {
        return Some(error[idx + 1..].to_string());
    }

    let error_lower = error.to_lowercase();

    if error_lower.contains("failed to parse config") {
        return Some("Hint: Run `heartline init --force` to rewrite the config.".to_string());
    }

    if error_lower.contains("data directory") {
        return Some(
            "Hint: Check that --data-dir (or HEARTLINE_DATA_DIR) points to a writable directory."
                .to_string(),
        );
    }

    if error_lower.contains("home is not set") {
        return Some("Hint: Set HEARTLINE_CONFIG and HEARTLINE_DATA_DIR explicitly.".to_string());
    }

    None
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => init::handle_init(ctx, args),
        Some(Commands::Play(args)) => play::handle_play(ctx, args),
        Some(Commands::History(args)) => history::handle_history(ctx, args),
        Some(Commands::Stats(args)) => stats::handle_stats(ctx, args),
        Some(Commands::Device(args)) => misc::handle_device(ctx, args),
        Some(Commands::Completions(args)) => misc::handle_completions(args),
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
