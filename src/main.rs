//! # Consulta CLI
//!
//! Command-line surface for the regulatory-document question answering
//! assistant.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `consulta ingest` | Process the documents folder and (re)build the vector index |
//! | `consulta ask "<question>"` | Answer a single question |
//! | `consulta chat` | Interactive session with chat history |
//! | `consulta docs` | List the PDF documents available for ingestion |
//!
//! All commands accept a `--config` flag pointing to a TOML configuration
//! file; a missing file falls back to built-in defaults. The embedding and
//! completion services read `OPENAI_API_KEY` from the environment.
//!
//! ## Examples
//!
//! ```bash
//! # Build the index from the documents folder
//! consulta ingest --config ./config/consulta.toml
//!
//! # Add newly dropped PDFs to the existing index
//! consulta ingest --merge
//!
//! # One-shot question
//! consulta ask "¿Cuál es el plazo de presentación de solicitudes?"
//!
//! # Interactive session
//! consulta chat
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use consulta::embedding::OpenAiEmbeddings;
use consulta::{ask, chat, config, docs, ingest};

#[derive(Parser)]
#[command(
    name = "consulta",
    about = "Question answering over regulatory PDF documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/consulta.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in the documents folder and rebuild the index.
    Ingest {
        /// Add the folder's units to the existing index instead of rebuilding.
        #[arg(long)]
        merge: bool,
    },

    /// Answer a single question against the indexed documents.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Start an interactive chat session.
    Chat,

    /// List the PDF documents available for ingestion.
    Docs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest { merge } => {
            let embeddings = OpenAiEmbeddings::new(&cfg.embedding)?;
            ingest::run_ingest(&cfg, &embeddings, merge).await?;
        }
        Commands::Ask { question } => {
            ask::run_ask(&cfg, &question).await?;
        }
        Commands::Chat => {
            chat::run_chat(&cfg).await?;
        }
        Commands::Docs => {
            docs::run_docs(&cfg)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
