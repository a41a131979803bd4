//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - serve: API server
//! - ask: Question answering, blocking or streamed
//! - documents: Ingestion and deletion
//! - info: Information display (stats, config)

pub mod ask;
pub mod documents;
pub mod info;
pub mod serve;

// Re-export all public handlers
pub use ask::*;
pub use documents::*;
pub use info::*;
pub use serve::*;
