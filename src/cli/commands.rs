//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "knowledge-explorer")]
#[command(about = "KnowledgeExplorer: ask questions about your PDF and TXT documents")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: configured level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS (default: from config)
        #[arg(long)]
        cors: bool,
    },
    /// Ingest PDF or TXT files into the knowledge base
    Ingest {
        /// Files to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Ask a question
    Ask {
        /// The question to ask
        question: String,
        /// Number of documents to retrieve
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,
        /// Search documents even for general questions
        #[arg(short, long)]
        force_documents: bool,
        /// Only search chunks of this document
        #[arg(long)]
        filename: Option<String>,
        /// Print the answer as it is generated
        #[arg(short, long)]
        stream: bool,
    },
    /// Show index statistics
    Stats,
    /// Delete every chunk of one document
    Delete {
        /// Filename used at ingestion time
        filename: String,
    },
    /// Delete all documents
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show current configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_flags() {
        let cli = Cli::try_parse_from([
            "knowledge-explorer",
            "ask",
            "What is in the report?",
            "-k",
            "3",
            "--stream",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask {
                question,
                top_k,
                stream,
                force_documents,
                filename,
            } => {
                assert_eq!(question, "What is in the report?");
                assert_eq!(top_k, 3);
                assert!(stream);
                assert!(!force_documents);
                assert!(filename.is_none());
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["knowledge-explorer", "stats", "--verbose", "--config", "x.toml"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn test_ingest_requires_files() {
        assert!(Cli::try_parse_from(["knowledge-explorer", "ingest"]).is_err());
    }
}
