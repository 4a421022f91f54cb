//! Development front-end for the Arbor agent.
//!
//! Wires the OpenAI-backed model and embedder, the in-memory vector
//! store, the SQLite conversation store, and the pipeline together, and
//! exposes the public entry points as subcommands. The production
//! front-end lives elsewhere; this binary exists to exercise the agent
//! locally.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arbor_agent::{Pipeline, PipelineResult};
use arbor_model::OpenAiChatModel;
use arbor_rag::{DocumentIndex, InMemoryVectorStore, OpenAiEmbedder};
use arbor_session::{ConversationStore, SqliteConversationStore, new_session_id};
use arbor_weather::WeatherClient;

#[derive(Parser)]
#[command(name = "arbor", version, about = "Intent-routed weather and document chat agent")]
struct Cli {
    /// Path to the conversation database.
    #[arg(long, global = true, default_value = "chat_history.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a single question.
    Ask {
        /// The question to ask.
        question: String,
        /// Session to continue; a fresh one is created if omitted.
        #[arg(long)]
        session: Option<String>,
        /// Document to ingest before asking.
        #[arg(long)]
        document: Option<PathBuf>,
    },
    /// Interactive chat. `/load <path>` ingests a document, `/quit` exits.
    Chat {
        /// Session to continue; a fresh one is created if omitted.
        #[arg(long)]
        session: Option<String>,
        /// Document to ingest before the first question.
        #[arg(long)]
        document: Option<PathBuf>,
    },
    /// List sessions, most recently active first.
    Sessions,
    /// Print a session's history.
    History {
        /// The session to replay.
        session: String,
    },
    /// Delete one session's turns, or everything with --all.
    Clear {
        /// The session to clear.
        session: Option<String>,
        /// Clear all sessions.
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let store: Arc<dyn ConversationStore> =
        Arc::new(SqliteConversationStore::connect(&cli.db).await?);

    match cli.command {
        Command::Ask { question, session, document } => {
            let pipeline = build_pipeline(store.clone())?;
            let session = resume_session(&store, &pipeline, session, document.as_deref()).await?;
            ask(&pipeline, &store, &session, &question).await?;
        }
        Command::Chat { session, document } => {
            let pipeline = build_pipeline(store.clone())?;
            let session = resume_session(&store, &pipeline, session, document.as_deref()).await?;
            chat(&pipeline, &store, &session).await?;
        }
        Command::Sessions => {
            for summary in store.list_sessions().await? {
                let document = summary.document_name.as_deref().unwrap_or("-");
                println!(
                    "{}  {} turns  last {}  document {}",
                    summary.session_id, summary.message_count, summary.last_message, document
                );
            }
        }
        Command::History { session } => {
            for message in store.history(&session).await? {
                println!("[{:?}] {}", message.role, message.content);
            }
        }
        Command::Clear { session, all } => {
            if all {
                store.clear_all().await?;
                println!("cleared all sessions");
            } else if let Some(session) = session {
                store.clear_session(&session).await?;
                println!("cleared session {session}");
            } else {
                anyhow::bail!("pass a session id or --all");
            }
        }
    }

    Ok(())
}

/// Assemble the pipeline from environment-configured collaborators.
fn build_pipeline(store: Arc<dyn ConversationStore>) -> Result<Pipeline> {
    let generator = Arc::new(OpenAiChatModel::from_env()?);
    let index = Arc::new(
        DocumentIndex::builder()
            .embedder(Arc::new(OpenAiEmbedder::from_env()?))
            .store(Arc::new(InMemoryVectorStore::new()))
            .generator(generator.clone())
            .build()?,
    );
    let weather = Arc::new(WeatherClient::from_env()?);
    Ok(Pipeline::new(generator, weather, index, store))
}

/// Resolve the session id and bring the index in line with it: an explicit
/// document wins, otherwise the session's active document is re-ingested
/// if it is present on disk.
async fn resume_session(
    store: &Arc<dyn ConversationStore>,
    pipeline: &Pipeline,
    session: Option<String>,
    document: Option<&Path>,
) -> Result<String> {
    let session = session.unwrap_or_else(new_session_id);

    if let Some(path) = document {
        if !pipeline.index().ingest(path).await {
            anyhow::bail!("failed to ingest {}", path.display());
        }
        println!("ingested {}", path.display());
    } else if let Some(name) = store.active_document(&session).await? {
        if Path::new(&name).exists() {
            pipeline.index().ingest(Path::new(&name)).await;
        } else {
            println!("note: session document '{name}' not found on disk");
        }
    }

    Ok(session)
}

async fn ask(
    pipeline: &Pipeline,
    store: &Arc<dyn ConversationStore>,
    session: &str,
    question: &str,
) -> Result<()> {
    let history = store.history(session).await?;
    let result = pipeline.run(question, session, history).await;
    print_result(&result);
    Ok(())
}

async fn chat(
    pipeline: &Pipeline,
    store: &Arc<dyn ConversationStore>,
    session: &str,
) -> Result<()> {
    println!("session {session} — /load <path> to ingest a document, /quit to exit");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        if let Some(path) = line.strip_prefix("/load ") {
            let path = Path::new(path.trim());
            if pipeline.index().ingest(path).await {
                println!("ingested {}", path.display());
            } else {
                println!("failed to ingest {}", path.display());
            }
            continue;
        }

        ask(pipeline, store, session, line).await?;
    }
    Ok(())
}

fn print_result(result: &PipelineResult) {
    println!("{}", result.final_answer);

    if !result.sources.is_empty() {
        println!("\nsources:");
        for (i, source) in result.sources.iter().enumerate() {
            println!("  {}. {}", i + 1, source.preview);
        }
    }
    if let Some(error) = &result.error {
        eprintln!("warning: {error}");
    }
}
