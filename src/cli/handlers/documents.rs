//! Document ingestion and deletion handlers

use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::output::*;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::errors::ExplorerError;
use crate::ingest::summarize;
use crate::ingest::BatchStatus;
use crate::ingest::IngestionPipeline;
use crate::ingest::RecursiveSplitter;
use crate::AppConfig;
use crate::Result;

pub async fn handle_ingest_command(config: &AppConfig, files: Vec<PathBuf>) -> Result<()> {
    if !config.validate_api_keys().pinecone {
        print_warning("PINECONE_API_KEY is not set; ingested documents will not outlive this process");
    }

    let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(config)?);
    let index = crate::index::from_config(config)?;
    let splitter = RecursiveSplitter::new(config.chunk_size(), config.chunk_overlap())?;
    let pipeline = IngestionPipeline::new(embedder, index, splitter);

    let named: Vec<(PathBuf, String)> = files
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            (path, name)
        })
        .collect();

    print_info(&format!("Ingesting {} file(s)...", named.len()));
    let summary = summarize(pipeline.ingest_files(&named).await);
    print_batch_summary(&summary);

    if summary.status == BatchStatus::Error {
        return Err(ExplorerError::DocumentLoad(summary.message));
    }
    Ok(())
}

pub async fn handle_delete_command(config: &AppConfig, filename: &str) -> Result<()> {
    let index = crate::index::from_config(config)?;
    match index.delete_by_filename(filename).await {
        Ok(()) | Err(ExplorerError::NotInitialized(_)) => {
            print_success(&format!("Deleted all chunks from document: {filename}"));
            Ok(())
        }
        Err(e) => Err(e),
    }
}

pub async fn handle_clear_command(config: &AppConfig, force: bool) -> Result<()> {
    if !force {
        print_warning("This deletes ALL documents from the knowledge base and cannot be undone.");
        print_prompt("Type 'yes' to continue: ");
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if answer.trim() != "yes" {
            print_info("Aborted");
            return Ok(());
        }
    }

    let index = crate::index::from_config(config)?;
    match index.clear().await {
        Ok(()) | Err(ExplorerError::NotInitialized(_)) => {
            print_success("All documents have been deleted from the knowledge base");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
