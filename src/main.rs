use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use muabot_corpus::{JsonRecordSource, build_corpus, fetch_corpus};
use muabot_rag::KnowledgeService;
use muabot_store::{QdrantStore, VectorStore};

mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "muabot", version, about = "E-commerce knowledge-base assistant")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the corpus from the records fixture and index it.
    Index,
    /// Top-k similarity search over the indexed collection.
    Query {
        text: String,
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },
    /// One chat turn: retrieve context and compose a reply.
    Chat {
        message: String,
        #[arg(long)]
        conversation: Option<String>,
    },
    /// Collection health: name, document count, status.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let embedder = muabot_embed::load_embedder(&config.embed)?;
    tracing::info!(backend = embedder.name(), "embedding backend active");

    let store = Arc::new(QdrantStore::connect(&config.qdrant.url)?) as Arc<dyn VectorStore>;
    let service = KnowledgeService::new(embedder, store, config.index.collection.clone())
        .with_batch_size(config.index.batch_size);

    match cli.command {
        Command::Index => {
            let source = JsonRecordSource::new(&config.index.records_path);
            let raw = fetch_corpus(&source).await?;
            let documents = build_corpus(&raw, config.index.strict)?;
            let written = service.index(&documents).await?;
            println!(
                "indexed {written} document(s) into '{}'",
                service.collection()
            );
        }
        Command::Query { text, k } => {
            let outcome = service.query(&text, k).await?;
            for hit in &outcome.results {
                println!("{:.4}  {}  {}", hit.distance, hit.id, hit.text);
            }
        }
        Command::Chat {
            message,
            conversation,
        } => {
            let turn = service.chat(&message, conversation.as_deref()).await?;
            println!("{}", turn.response);
            for source in &turn.sources {
                println!("  [{:.2}] {}", source.relevance, source.id);
            }
        }
        Command::Status => {
            let status = service.collection_status().await?;
            println!(
                "collection '{}': {} document(s), {}",
                status.name, status.document_count, status.status
            );
        }
    }

    Ok(())
}
