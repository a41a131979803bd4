//! Document ingestion
//!
//! Files are loaded into pages, split into overlapping chunks, embedded in one batch and
//! upserted into the similarity index. Each file succeeds or fails on its own so a batch
//! upload can report per-file outcomes.

pub mod batch;
pub mod loader;
pub mod pipeline;
pub mod splitter;

pub use batch::summarize;
pub use batch::BatchStatus;
pub use batch::BatchSummary;
pub use loader::load_document;
pub use loader::DocumentKind;
pub use loader::LoadedPage;
pub use pipeline::Chunk;
pub use pipeline::IngestResult;
pub use pipeline::IngestStatus;
pub use pipeline::IngestionPipeline;
pub use splitter::RecursiveSplitter;
