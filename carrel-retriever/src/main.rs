use carrel_embed::{EmbedConfig, HttpEmbeddingClient};
use carrel_retriever::chat::{ChatEngine, HttpCompletionClient};
use carrel_retriever::retrieval::{DEFAULT_TOP_K, Indexer, PlainTextExtractor, Retriever};
use carrel_retriever::storage::{ChatRole, WorkspaceStore, normalize_workspace_key};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// A CLI tool to manage document workspaces and query them with
/// retrieval-augmented chat.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root directory holding all workspace state
    #[arg(short, long, default_value = "storage", env = "CARREL_STORAGE_ROOT")]
    storage_root: PathBuf,

    /// Base URL of the OpenAI-compatible API
    #[arg(
        long,
        default_value = "https://api.openai.com/v1",
        env = "CARREL_API_BASE"
    )]
    api_base: String,

    /// API key for the embedding and completion services
    #[arg(long, env = "CARREL_API_KEY", hide_env_values = true, default_value = "")]
    api_key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy files into a workspace's document directory
    Upload {
        /// Workspace name
        workspace: String,
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Rebuild a workspace's chunk list and vector index from its documents
    Index {
        /// Workspace name
        workspace: String,
    },
    /// Retrieve the most relevant passages for a query
    Search {
        /// Workspace name
        workspace: String,
        /// Natural-language query
        query: String,
        /// Maximum number of passages
        #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
    },
    /// Send one chat message, grounded in the workspace's documents
    Chat {
        /// Workspace name
        workspace: String,
        /// The message to send
        message: String,
    },
    /// Print a workspace's persisted chat history
    History {
        /// Workspace name
        workspace: String,
    },
    /// Delete a workspace and all of its state
    Delete {
        /// Workspace name
        workspace: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let store = WorkspaceStore::new(&args.storage_root);
    let embedder = Arc::new(HttpEmbeddingClient::new(EmbedConfig::new(
        &args.api_base,
        &args.api_key,
    )));

    match args.command {
        Commands::Upload { workspace, files } => {
            for file in files {
                let name = file
                    .file_name()
                    .ok_or_else(|| anyhow::anyhow!("{} has no file name", file.display()))?
                    .to_string_lossy()
                    .to_string();
                let contents = tokio::fs::read(&file).await?;
                store.add_document(&workspace, &name, &contents).await?;
                println!("uploaded {name}");
            }
            println!(
                "workspace `{}` now holds {} document(s)",
                normalize_workspace_key(&workspace),
                store.list_documents(&workspace).await?.len()
            );
        }
        Commands::Index { workspace } => {
            let indexer = Indexer::new(store, Arc::new(PlainTextExtractor), embedder);
            let count = indexer.reindex(&workspace).await?;
            if count == 0 {
                println!("no extractable text; workspace left un-indexed");
            } else {
                println!("indexed {count} chunks for workspace `{}`", normalize_workspace_key(&workspace));
            }
        }
        Commands::Search {
            workspace,
            query,
            k,
        } => {
            let retriever = Retriever::new(store, embedder);
            let passages = retriever.retrieve(&workspace, &query, k).await?;
            if passages.is_empty() {
                println!("no relevant passages found");
            }
            for (rank, passage) in passages.iter().enumerate() {
                println!("--- [{}] ---\n{passage}\n", rank + 1);
            }
        }
        Commands::Chat { workspace, message } => {
            let completion = Arc::new(HttpCompletionClient::new(&args.api_base, &args.api_key));
            let retriever = Retriever::new(store.clone(), embedder);
            let engine = ChatEngine::new(store, retriever, completion);
            let reply = engine.reply(&workspace, &message).await?;
            println!("{reply}");
        }
        Commands::History { workspace } => {
            for message in store.load_history(&workspace).await? {
                let role = match message.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                    ChatRole::System => "system",
                };
                println!("[{role}] {}", message.content);
            }
        }
        Commands::Delete { workspace } => {
            if store.delete_workspace(&workspace).await? {
                println!("deleted workspace `{}`", normalize_workspace_key(&workspace));
            } else {
                println!("workspace `{}` does not exist", normalize_workspace_key(&workspace));
            }
        }
    }

    Ok(())
}
