//! Question answering handlers

use futures::StreamExt;

use crate::cli::output::*;
use crate::errors::ExplorerError;
use crate::rag::QueryEvent;
use crate::rag::QueryOptions;
use crate::rag::QueryService;
use crate::AppConfig;
use crate::Result;

pub async fn handle_ask_command(
    config: &AppConfig,
    question: String,
    top_k: usize,
    force_documents: bool,
    filename: Option<String>,
    stream: bool,
) -> Result<()> {
    if !(1..=config.retrieval.max_top_k).contains(&top_k) {
        return Err(ExplorerError::Validation(format!(
            "top_k must be between 1 and {}",
            config.retrieval.max_top_k
        )));
    }

    let service = QueryService::from_config(config)?;
    let options = QueryOptions {
        top_k,
        force_documents,
        filename_filter: filename,
    };

    print_info(&format!("Question: {question}"));

    if !stream {
        let result = service.answer(&question, &options).await?;
        print_query_result(&result);
        return Ok(());
    }

    let events = service.answer_stream(question, options);
    futures::pin_mut!(events);

    let mut metadata = None;
    while let Some(event) = events.next().await {
        match event {
            QueryEvent::Metadata(meta) => {
                println!();
                metadata = Some(meta);
            }
            QueryEvent::Message(token) => print_prompt(&token),
            QueryEvent::Done(done) => {
                if let Some(meta) = &metadata {
                    print_stream_footer(meta.mode, &meta.sources, done.token_count);
                }
                return Ok(());
            }
            QueryEvent::Error(err) => {
                println!();
                return Err(ExplorerError::Llm(err.error));
            }
        }
    }
    Ok(())
}
