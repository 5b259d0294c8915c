//! `gitchat` command line: index a GitHub repository and ask questions about it.
//!
//! Credentials come from the environment: `CLOUDFLARE_ACCOUNT_ID` and
//! `CLOUDFLARE_API_TOKEN` for the model calls, and optionally `GITHUB_TOKEN`
//! to raise the GitHub API rate limit. Vectors and index status live in
//! process memory, so `ask` indexes the repository first when needed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitchat_embed::EmbeddingGenerator;
use gitchat_retriever::chat::ChatEngine;
use gitchat_retriever::github::{GithubClient, parse_github_url, split_repo_id};
use gitchat_retriever::retrieval::{IndexOutcome, IndexingEngine, IndexingEngineConfig, Retriever};
use gitchat_retriever::storage::memory::{InMemoryStatusStore, InMemoryVectorStore};
use gitchat_retriever::workers_ai::WorkersAiClient;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "gitchat", about = "Chat with a GitHub repository")]
struct Cli {
    /// Embedding model id on Workers AI.
    #[arg(long, default_value = "@cf/baai/bge-base-en-v1.5")]
    embedding_model: String,

    /// Text-generation model id on Workers AI.
    #[arg(long, default_value = "@cf/meta/llama-3.1-8b-instruct")]
    generation_model: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index a repository's default branch.
    Index {
        /// Repository as `owner/name` or a GitHub URL.
        repo: String,
    },
    /// Ask a question about a repository, indexing it first if needed.
    Ask {
        /// Repository as `owner/name` or a GitHub URL.
        repo: String,
        /// The question to ask.
        message: String,
    },
}

fn resolve_repo_id(repo: &str) -> Result<String> {
    if let Some((owner, name)) = parse_github_url(repo) {
        return Ok(format!("{owner}/{name}"));
    }
    if split_repo_id(repo).is_some() {
        return Ok(repo.to_string());
    }
    anyhow::bail!("expected owner/name or a GitHub URL, got {repo:?}");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let account_id = std::env::var("CLOUDFLARE_ACCOUNT_ID")
        .context("CLOUDFLARE_ACCOUNT_ID must be set")?;
    let api_token = std::env::var("CLOUDFLARE_API_TOKEN")
        .context("CLOUDFLARE_API_TOKEN must be set")?;
    let github_token = std::env::var("GITHUB_TOKEN").ok();

    let model = Arc::new(WorkersAiClient::new(&account_id, api_token));
    let embedder = EmbeddingGenerator::new(model.clone(), cli.embedding_model);
    let browser = Arc::new(GithubClient::new(github_token));
    let vectors = Arc::new(InMemoryVectorStore::new());
    let status = Arc::new(InMemoryStatusStore::new());

    let engine = IndexingEngine::new(
        browser,
        embedder.clone(),
        vectors.clone(),
        status.clone(),
        IndexingEngineConfig::default(),
    );

    match cli.command {
        Command::Index { repo } => {
            let repo_id = resolve_repo_id(&repo)?;
            match engine.index_repository(&repo_id).await? {
                IndexOutcome::Completed(report) => println!(
                    "Indexed {repo_id}: {} files, {} chunks",
                    report.files_processed, report.chunks_indexed
                ),
                IndexOutcome::AlreadyIndexed => println!("{repo_id} is already indexed"),
                IndexOutcome::InProgress => println!("{repo_id} is being indexed elsewhere"),
            }
        }
        Command::Ask { repo, message } => {
            let repo_id = resolve_repo_id(&repo)?;
            engine.index_repository(&repo_id).await?;

            let chat = ChatEngine::new(
                model,
                cli.generation_model,
                embedder,
                Retriever::new(vectors),
                status,
            );
            let answer = chat.answer(&message, &repo_id, &[]).await?;
            println!("{answer}");
        }
    }

    Ok(())
}
