//! repomirror CLI - mirror repositories between hosting providers
//!
//! This is the main entry point for the repomirror command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let global = cli.global();
    let status = match cli.command {
        Commands::Mirror(args) => commands::mirror::run(args, &global).await?,
        Commands::Archive(args) => commands::archive::run(args, &global).await?,
        Commands::PublishLocal(args) => commands::publish_local::run(args, &global).await?,
        Commands::Hooks(args) => commands::hooks::run(args, &global).await?,
        Commands::CheckConfig => commands::check_config::run(&global)?,
    };

    // Every agent session is closed at this point
    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
