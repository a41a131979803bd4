//! API server handlers

use crate::cli::output::*;
use crate::AppConfig;
use crate::Result;

pub async fn handle_serve_api(
    config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    use crate::api::serve_api;

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = cors || config.server.enable_cors;

    println!("🚀 Starting KnowledgeExplorer API Server");
    println!("=========================================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!();

    let keys = config.validate_api_keys();
    if !keys.groq {
        print_warning("GROQ_API_KEY is not set; question answering will report the LLM as unavailable");
    }
    if !keys.pinecone {
        print_warning("PINECONE_API_KEY is not set; documents are kept in memory only");
    }
    if !keys.jina {
        print_info("JINA_API_KEY is not set; using the local embedding model");
    }

    serve_api(config, host, port, cors).await
}
