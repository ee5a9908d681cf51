//! pugkit - front-end build helpers: template compilation, html/template
//! conversion and css purging.

mod build;
mod cli;
mod compiler;
mod config;
mod convert;
mod error;
mod logger;
mod paths;
mod purge;
mod utils;
mod watch;

use anyhow::Result;
use build::compile_batch;
use clap::Parser;
use cli::{Cli, Commands};
use config::ToolConfig;
use convert::convert_single;
use paths::{resolve_input_dir, resolve_input_file, resolve_input_path};
use purge::purge_unused;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            logger::report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Load config, check inputs and config, then dispatch the subcommand
fn run(cli: &Cli) -> Result<()> {
    let config = ToolConfig::load(cli)?;
    // A missing input is reported before any collaborator lookup
    check_inputs(&cli.command)?;
    config.validate(&cli.command)?;

    match &cli.command {
        Commands::CompileBatch {
            input,
            output,
            watch,
        } => compile_batch(input, output.as_deref(), *watch, &config),
        Commands::ConvertSingle {
            input,
            output,
            tabs,
        } => convert_single(input, output.as_deref(), *tabs, &config).map(|_| ()),
        Commands::PurgeUnused { html, css, output } => {
            purge_unused(html, css.as_deref(), output.as_deref(), &config).map(|_| ())
        }
    }
}

/// Fail with `NotFound` when the subcommand's input path is missing.
fn check_inputs(command: &Commands) -> Result<()> {
    match command {
        Commands::CompileBatch { input, .. } => resolve_input_dir(input).map(|_| ()),
        Commands::ConvertSingle { input, .. } => resolve_input_file(input, "input file").map(|_| ()),
        Commands::PurgeUnused { html, .. } => resolve_input_path(html, "html input").map(|_| ()),
    }
}
