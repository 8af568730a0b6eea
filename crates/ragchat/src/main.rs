//! ragchat CLI - chat client for a question-answering backend.
//!
//! Provides commands for:
//! - `render`: Convert chat markdown to HTML
//! - `ask`: Send a question to the backend and print the answer
//! - `health`: Check whether the backend is reachable

mod commands;
mod error;
mod output;
mod transcript;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AskArgs, HealthArgs, RenderArgs};
use output::Output;

/// ragchat - chat client for a question-answering backend.
#[derive(Parser)]
#[command(name = "ragchat", version, about)]
struct Cli {
    /// Enable verbose output (INFO level logging).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown from a file or stdin to HTML.
    Render(RenderArgs),
    /// Ask the backend a question.
    Ask(AskArgs),
    /// Check backend health.
    Health(HealthArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Ask(args) => args.execute(),
        Commands::Health(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
