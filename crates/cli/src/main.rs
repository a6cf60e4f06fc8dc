//! Switchyard CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Route a single message, or chat interactively
//! - `classify` — Show which route a message would take
//! - `routes`   — List the route set
//! - `init`     — Write a default config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "switchyard",
    about = "Switchyard — single-turn intent router for conversational agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "SWITCHYARD_LOG_JSON")]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Route messages through the dispatch graph
    Run {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Load the conversation from this JSON file and save it back after each turn
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// Classify a message without running any handler
    Classify {
        #[arg(short, long)]
        message: String,
    },

    /// List the available routes
    Routes,

    /// Write a default configuration file
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so replies on stdout stay clean
    let filter = if cli.verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    match cli.command {
        Commands::Run { message, state } => commands::run::run(message, state).await?,
        Commands::Classify { message } => commands::classify::run(message).await?,
        Commands::Routes => commands::routes::run()?,
        Commands::Init => commands::init::run()?,
    }

    Ok(())
}
