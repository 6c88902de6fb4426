//! CLI entry point for errtrap.
//!
//! This module is intentionally thin: it handles argument parsing, loads the
//! optional `errtrap.toml`, and maps results to exit codes. Command logic
//! lives in the `commands` modules.

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(
    name = "errtrap",
    version,
    about = "CLI for executing various actions against errtrap.io"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Diagnose potential problems with an errtrap installation.
    Diagnose(commands::diagnose::DiagnoseArgs),
    /// Log a message to the specified log.
    Log(commands::log::LogArgs),
    /// Tail log messages from a specified log.
    Tail(commands::tail::TailArgs),
    /// Export log messages from a specified log to a file.
    Export(commands::export::ExportArgs),
    /// Import log messages from a W3C or IIS log file.
    Import(commands::import::ImportArgs),
    /// Delete log messages matching a query.
    Clear(commands::clear::ClearArgs),
    /// Create a new deployment.
    Deployment(commands::deployment::DeploymentArgs),
    /// Upload a source map and minified JavaScript.
    Sourcemap(commands::sourcemap::SourcemapArgs),
    /// Load 50 sample log messages into a log.
    Dataloader(commands::dataloader::DataloaderArgs),
}

fn main() {
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", console::style(format!("{err:#}")).red());
            1
        }
    };
    if code != 0 {
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = config::load_default()?;
    match cli.cmd {
        Commands::Diagnose(args) => commands::diagnose::run(args, &config),
        Commands::Log(args) => commands::log::run(args, &config).map(|()| 0),
        Commands::Tail(args) => commands::tail::run(args, &config).map(|()| 0),
        Commands::Export(args) => commands::export::run(args, &config).map(|()| 0),
        Commands::Import(args) => commands::import::run(args, &config).map(|()| 0),
        Commands::Clear(args) => commands::clear::run(args, &config).map(|()| 0),
        Commands::Deployment(args) => commands::deployment::run(args, &config).map(|()| 0),
        Commands::Sourcemap(args) => commands::sourcemap::run(args, &config).map(|()| 0),
        Commands::Dataloader(args) => commands::dataloader::run(args, &config).map(|()| 0),
    }
}
