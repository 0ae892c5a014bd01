//! Minimal console front end for the docrag pipeline: builds the index
//! over a documents directory, then answers questions from stdin.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use docrag::{
    ChunkingConfig, EmbeddingClient, EmbeddingEndpointConfig, GenerationClient,
    GenerationEndpointConfig, GenerationParameters, HttpEmbeddingBackend, HttpGenerationBackend,
    RagOrchestrator, RetryPolicy, DEFAULT_TOP_K,
};

const DEFAULT_EMBED_BATCH_SIZE: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let embeddings_url =
        env::var("EMBEDDINGS_ENDPOINT").context("EMBEDDINGS_ENDPOINT environment variable not set")?;
    let llm_url = env::var("LLM_ENDPOINT").context("LLM_ENDPOINT environment variable not set")?;
    let documents_dir =
        PathBuf::from(env::var("DOCUMENTS_DIR").unwrap_or_else(|_| "documents".to_string()));

    let embedding_backend = HttpEmbeddingBackend::new(EmbeddingEndpointConfig {
        model_id: env::var("EMBEDDINGS_MODEL").unwrap_or_else(|_| embeddings_url.clone()),
        endpoint_url: embeddings_url,
        timeout: Duration::from_secs(30),
    })?;
    let embedding = EmbeddingClient::new(Arc::new(embedding_backend), DEFAULT_EMBED_BATCH_SIZE)?;

    let generation_backend = HttpGenerationBackend::new(GenerationEndpointConfig {
        model_id: env::var("LLM_MODEL").unwrap_or_else(|_| llm_url.clone()),
        endpoint_url: llm_url,
        timeout: Duration::from_secs(60),
    })?;
    let generation = GenerationClient::new(
        Arc::new(generation_backend),
        GenerationParameters::default(),
    );

    let orchestrator =
        RagOrchestrator::new(ChunkingConfig::default(), embedding, generation);
    let retry = RetryPolicy::default();

    let report = orchestrator
        .build_index_with_retry(&documents_dir, &retry)
        .await
        .with_context(|| format!("failed to index {}", documents_dir.display()))?;

    println!(
        "Indexed {} chunks from {} documents (embedding model: {})",
        report.chunks, report.documents, report.embedding_model
    );
    for warning in &report.warnings {
        println!("warning: skipped {}: {}", warning.path.display(), warning.reason);
    }

    let stdin = io::stdin();
    loop {
        print!("\nquestion> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        match orchestrator
            .answer_with_retry(question, DEFAULT_TOP_K, &retry)
            .await
        {
            Ok(result) => {
                println!("{}", result.answer);
                println!("\nSources:");
                for source in &result.sources {
                    println!("  {source}");
                }
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}
