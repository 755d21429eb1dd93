//! Curator CLI - push and delete charts on a ChartMuseum server

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod config;
mod error;
mod logging;

use config::{GlobalArgs, init_config};
use error::CliError;

#[derive(Parser)]
#[command(name = "curator")]
#[command(author = "Curator Contributors")]
#[command(version)]
#[command(about = "ChartMuseum CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Push chart-dir to server
    Push {
        /// Chart directory to package and upload
        chart_dir: PathBuf,
    },

    /// Delete chart from server
    Delete {
        /// Chart name
        chart_name: String,

        /// Chart version
        #[arg(value_name = "VERSION")]
        chart_version: String,
    },

    /// Check that the server is healthy
    Health,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Push { .. } => "push",
            Commands::Delete { .. } => "delete",
            Commands::Health => "health",
        }
    }
}

async fn run(cli: Cli) -> error::Result<()> {
    let config = init_config(&cli.global)?;
    let ctx = cli.global.context();

    match &cli.command {
        Commands::Push { chart_dir } => commands::push::run(&ctx, &config, chart_dir).await,
        Commands::Delete {
            chart_name,
            chart_version,
        } => commands::delete::run(&ctx, &config, chart_name, chart_version).await,
        Commands::Health => commands::health::run(&ctx, &config).await,
    }
}

fn print_subcommand_help(name: &str) {
    let mut command = Cli::command();
    command.build();
    if let Some(subcommand) = command.find_subcommand_mut(name) {
        if let Err(err) = subcommand.print_help() {
            tracing::debug!("failed printing {} usage: {}", name, err);
        }
    }
}

fn report(err: CliError, subcommand: &str) {
    let shows_usage = err.shows_usage();
    eprintln!("{:?}", miette::Report::new(err));
    if shows_usage {
        print_subcommand_help(subcommand);
    }
}

// Failures are reported on the console; the exit status stays 0.
#[tokio::main]
async fn main() -> ExitCode {
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
    };

    logging::setup_logging(cli.debug);

    let subcommand = cli.command.name();
    if let Err(err) = run(cli).await {
        tracing::debug!("{} failed: {:?}", subcommand, err);
        report(err, subcommand);
    }

    ExitCode::SUCCESS
}
