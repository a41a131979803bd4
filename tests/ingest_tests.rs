//! Ingestion pipeline tests over in-memory fakes

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use knowledge_explorer::index::SimilarityIndex;
use knowledge_explorer::ingest::summarize;
use knowledge_explorer::ingest::BatchStatus;
use knowledge_explorer::ingest::IngestStatus;
use knowledge_explorer::ingest::IngestionPipeline;
use knowledge_explorer::ingest::RecursiveSplitter;

use common::*;

struct Fixture {
    dir: tempfile::TempDir,
    index: Arc<CountingIndex>,
    pipeline: IngestionPipeline,
}

fn fixture(chunk_size: usize, chunk_overlap: usize) -> Fixture {
    let index = Arc::new(CountingIndex::new());
    let pipeline = IngestionPipeline::new(
        Arc::new(KeywordEmbedder::new(VOCABULARY)),
        index.clone(),
        RecursiveSplitter::new(chunk_size, chunk_overlap).unwrap(),
    );
    Fixture {
        dir: tempfile::tempdir().unwrap(),
        index,
        pipeline,
    }
}

impl Fixture {
    fn write(&self, name: &str, contents: &str) -> (PathBuf, String) {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        (path, name.to_string())
    }

    async fn vector_count(&self) -> u64 {
        self.index.stats().await.unwrap().total_vector_count
    }
}

#[tokio::test]
async fn test_small_text_file_is_one_chunk() {
    let f = fixture(1000, 200);
    let text = "The capital of France is Paris. It is lovely here.";
    assert_eq!(text.chars().count(), 50);
    let (path, name) = f.write("notes.txt", text);

    let result = f.pipeline.ingest(&path, &name).await;

    assert_eq!(result.status, IngestStatus::Success);
    assert_eq!(result.chunks, 1);
    assert_eq!(result.upserted, 1);
    assert!(result.message.is_none());
    assert_eq!(f.vector_count().await, 1);
}

#[tokio::test]
async fn test_long_text_is_split_into_overlapping_chunks() {
    let f = fixture(100, 20);
    let paragraph = "Paris is the capital of France and its largest city by far. ";
    let (path, name) = f.write("long.txt", &paragraph.repeat(10));

    let result = f.pipeline.ingest(&path, &name).await;

    assert_eq!(result.status, IngestStatus::Success);
    assert!(result.chunks > 1);
    assert_eq!(f.vector_count().await, result.chunks as u64);
}

#[tokio::test]
async fn test_docx_is_rejected_per_file() {
    let f = fixture(1000, 200);
    let docx = f.write("resume.docx", "not really a docx");

    let results = f.pipeline.ingest_files(&[docx.clone()]).await;
    assert_eq!(results[0].status, IngestStatus::Error);
    assert_eq!(results[0].chunks, 0);
    assert_eq!(summarize(results).status, BatchStatus::Error);

    let txt = f.write("notes.txt", "The capital of France is Paris.");
    let results = f.pipeline.ingest_files(&[docx, txt]).await;
    assert_eq!(results[0].status, IngestStatus::Error);
    assert_eq!(results[1].status, IngestStatus::Success);

    let summary = summarize(results);
    assert_eq!(summary.status, BatchStatus::Success);
    assert_eq!(summary.message, "Successfully processed 1 file(s), 1 failed");
}

#[tokio::test]
async fn test_empty_file_is_a_warning() {
    let f = fixture(1000, 200);
    let (path, name) = f.write("empty.txt", "   \n\n  ");

    let result = f.pipeline.ingest(&path, &name).await;

    assert_eq!(result.status, IngestStatus::Warning);
    assert_eq!(result.chunks, 0);
    assert_eq!(result.message.as_deref(), Some("No content extracted"));

    let summary = summarize(vec![result]);
    assert_eq!(summary.status, BatchStatus::Partial);
}

#[tokio::test]
async fn test_ingest_then_delete_is_net_zero() {
    let f = fixture(40, 10);
    let (keep_path, keep_name) = f.write("keep.txt", "Pasta cooking notes.");
    f.pipeline.ingest(&keep_path, &keep_name).await;
    let before = f.vector_count().await;

    let (path, name) = f.write(
        "geo.txt",
        "The capital of France is Paris.\n\nParis has many museums.\n\nFrance is in Europe.",
    );
    let result = f.pipeline.ingest(&path, &name).await;
    assert_eq!(result.status, IngestStatus::Success);
    assert!(result.chunks >= 2);
    assert_eq!(f.vector_count().await, before + result.chunks as u64);

    f.index.delete_by_filename("geo.txt").await.unwrap();
    assert_eq!(f.vector_count().await, before);
}

#[tokio::test]
async fn test_batch_status_ignores_file_order() {
    let f = fixture(1000, 200);
    let files = vec![
        f.write("a.txt", "The capital of France is Paris."),
        f.write("b.docx", "binary"),
        f.write("c.txt", ""),
    ];
    let mut reversed = files.clone();
    reversed.reverse();

    let forward = summarize(f.pipeline.ingest_files(&files).await);
    let backward = summarize(f.pipeline.ingest_files(&reversed).await);

    assert_eq!(forward.status, backward.status);
    assert_eq!(forward.successful, backward.successful);
    assert_eq!(forward.failed, backward.failed);
    assert_eq!(forward.message, backward.message);
}
