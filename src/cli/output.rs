//! Output formatting utilities for CLI

use crate::config::AppConfig;
use crate::index::IndexStats;
use crate::ingest::BatchStatus;
use crate::ingest::BatchSummary;
use crate::ingest::IngestStatus;
use crate::rag::QueryMode;
use crate::rag::QueryResult;
use crate::rag::SourceCitation;

pub use crate::rag::truncate_str;

/// Word wrap text to specified width, keeping paragraph breaks
pub fn print_wrapped(text: &str, max_width: usize) {
    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        for word in paragraph.split_whitespace() {
            if !current_line.is_empty()
                && current_line.chars().count() + word.chars().count() + 1 > max_width
            {
                println!("{current_line}");
                current_line.clear();
            }
            if !current_line.is_empty() {
                current_line.push(' ');
            }
            current_line.push_str(word);
        }
        println!("{current_line}");
    }
}

fn mode_label(mode: QueryMode) -> &'static str {
    match mode {
        QueryMode::Rag => "📚 Answered from your documents",
        QueryMode::General => "🧠 Answered from general knowledge",
        QueryMode::GeneralFallback => "🧠 No relevant documents; answered from general knowledge",
    }
}

/// Print retrieved sources
pub fn print_sources(sources: &[SourceCitation]) {
    if sources.is_empty() {
        return;
    }
    println!("📄 Sources:");
    for (i, source) in sources.iter().enumerate() {
        println!(
            "  {}. {} [chunk {}] (score: {:.3})",
            i + 1,
            source.filename,
            source.chunk_id,
            source.score
        );
        println!("     {}", truncate_str(&source.preview.replace('\n', " "), 100));
    }
}

/// Print a complete answer with its sources
pub fn print_query_result(result: &QueryResult) {
    println!();
    print_wrapped(&result.answer, 80);
    println!();
    println!("─────────────────────────────────────────────────────────────────");
    println!("{}", mode_label(result.metadata.mode));
    print_sources(&result.sources);
    println!("─────────────────────────────────────────────────────────────────");
}

/// Print the footer of a streamed answer
pub fn print_stream_footer(mode: QueryMode, sources: &[SourceCitation], token_count: usize) {
    println!();
    println!();
    println!("─────────────────────────────────────────────────────────────────");
    println!("{} ({} fragments)", mode_label(mode), token_count);
    print_sources(sources);
    println!("─────────────────────────────────────────────────────────────────");
}

/// Print per-file ingestion results and the batch outcome
pub fn print_batch_summary(summary: &BatchSummary) {
    for file in &summary.files {
        let icon = match file.status {
            IngestStatus::Success => "✅",
            IngestStatus::Warning => "⚠️ ",
            IngestStatus::Error => "❌",
        };
        match &file.message {
            Some(message) => println!("{icon} {}: {message}", file.filename),
            None => println!(
                "{icon} {}: {} chunks, {} vectors",
                file.filename, file.chunks, file.upserted
            ),
        }
    }
    println!();
    match summary.status {
        BatchStatus::Success => print_success(&summary.message),
        BatchStatus::Partial => print_warning(&summary.message),
        BatchStatus::Error => print_error(&summary.message),
    }
}

/// Print index statistics
pub fn print_index_stats(stats: &IndexStats) {
    println!("📊 Knowledge Base Statistics:");
    println!("  Total vectors: {}", stats.total_vector_count);
    println!("  Dimensions: {}", stats.dimension);
    if !stats.namespaces.is_empty() {
        println!("  Namespaces:");
        let mut names: Vec<&String> = stats.namespaces.keys().collect();
        names.sort();
        for name in names {
            let label = if name.is_empty() { "(default)" } else { name };
            println!("    {label}: {} vectors", stats.namespaces[name].vector_count);
        }
    }
}

fn key_state(present: bool) -> &'static str {
    if present {
        "configured"
    } else {
        "missing"
    }
}

/// Print configuration
pub fn print_config(config: &AppConfig) {
    let keys = config.validate_api_keys();

    println!("📋 KnowledgeExplorer Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Address: {}", config.bind_address());
    println!("  CORS: {}", config.server.enable_cors);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Directory: {}", config.logging.log_dir);
    println!();

    println!("🧠 Embeddings:");
    println!("  Jina key: {}", key_state(keys.jina));
    println!("  Jina model: {}", config.embeddings.jina_model);
    println!(
        "  Local model: {} ({})",
        config.embeddings.local_model, config.embeddings.local_endpoint
    );
    println!("  Dimension: {}", config.embedding_dimension());
    println!();

    println!("🤖 LLM:");
    println!("  Groq key: {}", key_state(keys.groq));
    println!("  Model: {}", config.llm_model());
    println!("  Temperature: {}", config.llm.temperature);
    println!("  Max tokens: {}", config.llm.max_tokens);
    println!();

    println!("🗂️  Vector index:");
    println!("  Pinecone key: {}", key_state(keys.pinecone));
    println!("  Index: {}", config.index_name());
    println!("  Cloud/region: {}/{}", config.index.cloud, config.index.region);
    println!();

    println!("📄 Documents:");
    println!("  Chunk size: {}", config.chunk_size());
    println!("  Chunk overlap: {}", config.chunk_overlap());
    println!("  Upload dir: {}", config.documents.upload_dir);
    println!("  Max upload size: {} bytes", config.documents.max_upload_size);
    println!();

    println!("🔍 Retrieval:");
    println!("  Min relevance score: {}", config.min_relevance_score());
    println!("  Over-fetch factor: {}", config.retrieval.overfetch_factor);
    println!(
        "  top_k: default {}, max {}",
        config.retrieval.default_top_k, config.retrieval.max_top_k
    );
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    println!("❌ {msg}");
}

pub fn print_prompt(msg: &str) {
    print!("{msg}");
    let _ = std::io::Write::flush(&mut std::io::stdout());
}
