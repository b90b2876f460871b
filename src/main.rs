//! # tabrag CLI
//!
//! ```bash
//! tabrag --config ./config/tabrag.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tabrag ingest <FILE>` | Embed every row of a CSV/JSON file into a new collection |
//! | `tabrag search "<question>"` | Show the rows most similar to a question |
//! | `tabrag ask "<question>"` | Answer a question grounded on the most similar rows |
//! | `tabrag collections` | List stored collections |
//! | `tabrag serve` | Start the HTTP API |

use clap::{Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use tabrag::{chat, collections, config, ingest, logging, server};

/// tabrag: question answering over CSV and JSON rows.
#[derive(Parser)]
#[command(
    name = "tabrag",
    about = "tabrag: retrieval-augmented question answering over CSV and JSON rows",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/tabrag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a CSV or JSON file.
    ///
    /// Every row is rendered, normalized and embedded, then the whole file is
    /// written as one new collection. Rows whose embedding fails are kept
    /// without a vector and are never returned by search.
    Ingest {
        /// Path to a `.csv` or `.json` file.
        file: PathBuf,
    },

    /// Show the stored rows most similar to a question.
    Search {
        question: String,

        /// Number of rows to return, at least 1 (defaults to `[retrieval].top_k`).
        #[arg(long)]
        limit: Option<NonZeroUsize>,
    },

    /// Answer a question using the most similar rows as context.
    Ask {
        question: String,

        /// Number of rows used as context, at least 1 (defaults to `[retrieval].top_k`).
        #[arg(long)]
        limit: Option<NonZeroUsize>,
    },

    /// List stored collections.
    Collections,

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest { file } => {
            ingest::run_ingest(&cfg, &file).await?;
        }
        Commands::Search { question, limit } => {
            chat::run_search(&cfg, &question, limit.map(NonZeroUsize::get)).await?;
        }
        Commands::Ask { question, limit } => {
            chat::run_ask(&cfg, &question, limit.map(NonZeroUsize::get)).await?;
        }
        Commands::Collections => {
            collections::run_collections(&cfg)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
