//! # Research Harness CLI (`rh`)
//!
//! Ask questions from the terminal, chat interactively, inspect the
//! conversation memory, or start the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! rh --config ./config/rh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rh init` | Create the SQLite similarity-store schema |
//! | `rh ask "<question>"` | Run one question and print the answer with sources |
//! | `rh chat` | Interactive session (`quit`, `exit` or `q` to leave) |
//! | `rh serve` | Start the HTTP API (`GET /health`, `POST /ask`) |
//! | `rh memory list` | Print every stored conversation |
//! | `rh memory search "<query>"` | Rank stored conversations against a query |
//! | `rh route "<question>"` | Show the chosen tool and stage path without running |
//!
//! ## Examples
//!
//! ```bash
//! rh ask "What are the latest Rust release notes?"
//! rh ask "Summarize this PDF https://arxiv.org/pdf/1706.03762"
//! rh memory search "borrow checker" --limit 5
//! RUST_LOG=debug rh serve
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use research_harness::{commands, config, server};

/// Research Harness: a research assistant that answers with citations.
///
/// API keys are read from `OPENAI_API_KEY` and `BRAVE_API_KEY`; a `.env`
/// file in the working directory is loaded first.
#[derive(Parser)]
#[command(
    name = "rh",
    about = "Research Harness: web search, PDF summaries and conversation memory, answered with citations",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/rh.toml`. When the file does not exist,
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/rh.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the similarity-store database. Idempotent.
    Init,

    /// Answer a single question.
    Ask {
        /// The question. Include a URL to summarize a PDF.
        question: String,
    },

    /// Interactive question loop on stdin.
    Chat,

    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Inspect the conversation memory.
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Print the tool a question would be routed to.
    Route {
        question: String,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// List all stored conversations, oldest first.
    List,
    /// Rank stored conversations by word overlap with a query.
    Search {
        query: String,
        /// Maximum number of matches (default: `[retrieval].max_memory_results`).
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<config::Config> {
    if path.exists() {
        config::load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found; using defaults");
        Ok(config::Config::minimal())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Commands::Route { question } = &cli.command {
        return commands::run_route(question);
    }

    let cfg = load_config(&cli.config)?;

    match cli.command {
        Commands::Init => commands::run_init(&cfg).await?,
        Commands::Ask { question } => commands::run_ask(&cfg, &question).await?,
        Commands::Chat => commands::run_chat(&cfg).await?,
        Commands::Serve => server::run_server(&cfg).await?,
        Commands::Memory { action } => match action {
            MemoryAction::List => commands::run_memory_list(&cfg).await?,
            MemoryAction::Search { query, limit } => {
                commands::run_memory_search(&cfg, &query, limit).await?
            }
        },
        Commands::Route { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
