use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use docqa_core::config::DEFAULT_API_BASE;
use docqa_core::{
    ChainOptions, EmbeddingsOptions, FileParser, InputFile, LanguageModelOptions, ProviderConfig,
    QaOptions, QuestionAnswerModel, VectorStoreOptions, DEFAULT_MAX_CHUNK_LENGTH, DEFAULT_TOP_K,
};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docqa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// API key sent as a bearer token
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Embeddings provider: default | chat-gpt-compatible | offline
    #[arg(long, default_value = "default")]
    embeddings: EmbeddingsOptions,

    /// Vector store backend: default | local-index
    #[arg(long, default_value = "default")]
    vector_store: VectorStoreOptions,

    /// Language model: default | gpt-3.5-turbo
    #[arg(long, default_value = "default")]
    language_model: LanguageModelOptions,

    /// Question answering chain: default | retrieval-qa
    #[arg(long, default_value = "default")]
    chain: ChainOptions,

    /// Number of units placed in each prompt (at least 1)
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// JSON file holding the persisted local index
    #[arg(long, env = "DOCQA_INDEX_PATH")]
    index_path: Option<PathBuf>,

    /// Maximum characters per text chunk
    #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_LENGTH)]
    max_chunk_length: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a file or directory and print what would be indexed.
    Parse {
        /// File, or directory whose files are parsed (non-recursive).
        #[arg(long)]
        path: PathBuf,
    },
    /// Parse documents and add them to the persisted index.
    Ingest {
        /// File, or directory whose files are parsed (non-recursive).
        #[arg(long)]
        path: PathBuf,
    },
    /// Answer a single question.
    Ask {
        /// Question text
        #[arg(long)]
        question: String,
        /// Documents to add before asking.
        #[arg(long)]
        documents: Option<PathBuf>,
        /// Print the retrieved units after the answer.
        #[arg(long, default_value_t = false)]
        show_sources: bool,
    },
    /// Read questions from stdin, one per line, until EOF.
    Chat {
        /// Documents to add before the session starts.
        #[arg(long)]
        documents: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "docqa boot"
    );

    let parser = FileParser::with_max_chunk_length(cli.max_chunk_length);

    match &cli.command {
        Command::Parse { path } => {
            for file in parser.parse_path(path)? {
                println!(
                    "{} kind={} units={} path={}",
                    file.name(),
                    file.kind(),
                    file.pages().len(),
                    file.path()
                );
            }
        }
        Command::Ingest { path } => {
            if cli.index_path.is_none() {
                anyhow::bail!("ingest needs --index-path so the index outlives this process");
            }
            let model = build_model(&cli)?;
            let files = parser.parse_path(path)?;
            let units = add_documents(&model, &files).await?;
            println!(
                "{} files ({} units) ingested at {}",
                files.len(),
                units,
                Utc::now().to_rfc3339()
            );
        }
        Command::Ask {
            question,
            documents,
            show_sources,
        } => {
            let model = build_model(&cli)?;
            if let Some(documents) = documents {
                ingest_path(&model, &parser, documents).await?;
            }

            let answer = model.ask_with_sources(question).await?;
            println!("{}", answer.answer);

            if *show_sources {
                for hit in answer.sources {
                    println!(
                        "[{} p.{}] score={:.4} id={}",
                        hit.unit.metadata.title, hit.unit.metadata.page_number, hit.score, hit.id
                    );
                }
            }
        }
        Command::Chat { documents } => {
            let model = build_model(&cli)?;
            if let Some(documents) = documents {
                ingest_path(&model, &parser, documents).await?;
            }

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let question = line.trim();
                if question.is_empty() {
                    continue;
                }
                match model.ask(question).await {
                    Ok(answer) => println!("{answer}"),
                    Err(error) if error.is_bad_input() => {
                        warn!(%error, "question rejected");
                        println!("error: {error}");
                    }
                    Err(error) => {
                        warn!(%error, "provider unavailable");
                        println!("error: {error}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn build_model(cli: &Cli) -> anyhow::Result<QuestionAnswerModel> {
    let config = ProviderConfig {
        api_base: cli.api_base.clone(),
        api_key: cli.api_key.clone(),
        ..ProviderConfig::from_env()
    };
    let options = QaOptions {
        embeddings: cli.embeddings,
        chain: cli.chain,
        vector_store: cli.vector_store,
        language_model: cli.language_model,
        top_k: cli.top_k,
        index_path: cli.index_path.clone(),
    };

    QuestionAnswerModel::new(&options, &config).context("failed to build question answering model")
}

async fn ingest_path(
    model: &QuestionAnswerModel,
    parser: &FileParser,
    path: &Path,
) -> anyhow::Result<()> {
    let files = parser.parse_path(path)?;
    info!(path = %path.display(), files = files.len(), "adding setup documents");
    let units = add_documents(model, &files).await?;
    info!(units, "done adding setup documents");
    Ok(())
}

async fn add_documents(model: &QuestionAnswerModel, files: &[InputFile]) -> anyhow::Result<usize> {
    let mut units = 0;
    for file in files {
        model
            .add_document(file)
            .await
            .with_context(|| format!("failed to add {}", file.path()))?;
        units += file.pages().len();
    }
    Ok(units)
}
