use clap::Parser;
use knowledge_explorer::cli::*;
use knowledge_explorer::AppConfig;
use knowledge_explorer::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_from(&cli.config)?;

    // Initialize logging; the guard flushes the log file on exit
    let _guard = if cli.verbose {
        knowledge_explorer::logging::init_logging_with_level("debug", &config.logging.log_dir)?
    } else {
        knowledge_explorer::logging::init_logging(&config)?
    };
    info!("Configuration loaded successfully");

    // Execute the requested command
    let outcome = match cli.command {
        Commands::Serve { host, port, cors } => handle_serve_api(config, host, port, cors).await,
        Commands::Ingest { files } => handle_ingest_command(&config, files).await,
        Commands::Ask {
            question,
            top_k,
            force_documents,
            filename,
            stream,
        } => {
            handle_ask_command(&config, question, top_k, force_documents, filename, stream).await
        }
        Commands::Stats => handle_stats_command(&config).await,
        Commands::Delete { filename } => handle_delete_command(&config, &filename).await,
        Commands::Clear { force } => handle_clear_command(&config, force).await,
        Commands::Config => handle_config_command(&config),
    };

    if let Err(e) = &outcome {
        print_error(&e.to_string());
    }
    outcome
}
