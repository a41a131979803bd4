//! KnowledgeExplorer: document question answering with retrieval-augmented generation
//!
//! Uploaded PDF and TXT files are chunked, embedded and stored in a similarity index.
//! Questions are routed either to a grounded answer built from the most relevant chunks
//! or to a general-knowledge answer, delivered whole or as a stream of events.

pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod retry;


pub use config::AppConfig;
pub use errors::*;
