//! In-memory similarity index using cosine similarity.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::IndexMatch;
use super::IndexStats;
use super::MetadataFilter;
use super::NamespaceStats;
use super::SimilarityIndex;
use super::VectorRecord;
use crate::errors::ExplorerError;
use crate::errors::Result;

#[derive(Debug)]
struct Collection {
    dimension: usize,
    records: HashMap<String, VectorRecord>,
}

/// Process-local index backed by a `HashMap` behind a `tokio::sync::RwLock`
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    collection: RwLock<Option<Collection>>,
    initialized: AtomicBool,
}

impl InMemoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Cosine similarity; 0.0 if either vector has zero magnitude
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn not_initialized() -> ExplorerError {
    ExplorerError::NotInitialized("in-memory index has not been created".to_string())
}

fn check_dimension(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ExplorerError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[async_trait]
impl SimilarityIndex for InMemoryIndex {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    async fn ensure_initialized(&self, dimension: usize) -> Result<()> {
        let mut collection = self.collection.write().await;
        if collection.is_none() {
            *collection = Some(Collection {
                dimension,
                records: HashMap::new(),
            });
        }
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        let mut guard = self.collection.write().await;
        let collection = guard.as_mut().ok_or_else(not_initialized)?;
        for record in records {
            check_dimension(collection.dimension, record.values.len())?;
        }
        for record in records {
            collection.records.insert(record.id.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>> {
        let guard = self.collection.read().await;
        let collection = guard.as_ref().ok_or_else(not_initialized)?;
        check_dimension(collection.dimension, vector.len())?;

        let mut scored: Vec<IndexMatch> = collection
            .records
            .values()
            .filter(|record| filter.map_or(true, |f| f.matches(&record.metadata)))
            .map(|record| IndexMatch {
                id: record.id.clone(),
                score: cosine_similarity(&record.values, vector),
                metadata: record.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_by_filename(&self, filename: &str) -> Result<()> {
        let mut guard = self.collection.write().await;
        let collection = guard.as_mut().ok_or_else(not_initialized)?;
        let filter = MetadataFilter::FilenameEquals(filename.to_string());
        collection
            .records
            .retain(|_, record| !filter.matches(&record.metadata));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self.collection.write().await;
        let collection = guard.as_mut().ok_or_else(not_initialized)?;
        collection.records.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats> {
        let guard = self.collection.read().await;
        let collection = guard.as_ref().ok_or_else(not_initialized)?;
        let count = collection.records.len() as u64;
        let mut namespaces = HashMap::new();
        if count > 0 {
            namespaces.insert(String::new(), NamespaceStats { vector_count: count });
        }
        Ok(IndexStats {
            total_vector_count: count,
            dimension: collection.dimension,
            namespaces,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::index::Metadata;

    fn record(id: &str, filename: &str, values: Vec<f32>) -> VectorRecord {
        let mut metadata = Metadata::new();
        metadata.insert("filename".to_string(), Value::from(filename));
        VectorRecord {
            id: id.to_string(),
            values,
            metadata,
        }
    }

    #[tokio::test]
    async fn test_operations_before_init_are_not_initialized() {
        let index = InMemoryIndex::new();
        assert!(!index.is_initialized());
        assert!(matches!(
            index.stats().await,
            Err(ExplorerError::NotInitialized(_))
        ));
        assert!(matches!(
            index.query(&[1.0, 0.0], 3, None).await,
            Err(ExplorerError::NotInitialized(_))
        ));
    }

    #[tokio::test]
    async fn test_double_initialize_keeps_data() {
        let index = InMemoryIndex::new();
        index.ensure_initialized(2).await.unwrap();
        index.upsert(&[record("a", "a.txt", vec![1.0, 0.0])]).await.unwrap();
        index.ensure_initialized(2).await.unwrap();
        assert_eq!(index.stats().await.unwrap().total_vector_count, 1);
    }

    #[tokio::test]
    async fn test_query_orders_by_descending_score() {
        let index = InMemoryIndex::new();
        index.ensure_initialized(2).await.unwrap();
        index
            .upsert(&[
                record("far", "a.txt", vec![0.0, 1.0]),
                record("near", "a.txt", vec![1.0, 0.0]),
                record("mid", "b.txt", vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.0], 10, None).await.unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
        assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_query_respects_filename_filter() {
        let index = InMemoryIndex::new();
        index.ensure_initialized(2).await.unwrap();
        index
            .upsert(&[
                record("a1", "a.txt", vec![1.0, 0.0]),
                record("b1", "b.txt", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let filter = MetadataFilter::FilenameEquals("b.txt".to_string());
        let matches = index.query(&[1.0, 0.0], 10, Some(&filter)).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "b1");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let index = InMemoryIndex::new();
        index.ensure_initialized(3).await.unwrap();
        let err = index
            .upsert(&[record("x", "x.txt", vec![1.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExplorerError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(matches!(
            index.query(&[1.0], 1, None).await,
            Err(ExplorerError::DimensionMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_by_filename_and_clear() {
        let index = InMemoryIndex::new();
        index.ensure_initialized(2).await.unwrap();
        index
            .upsert(&[
                record("a1", "a.txt", vec![1.0, 0.0]),
                record("a2", "a.txt", vec![0.5, 0.5]),
                record("b1", "b.txt", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        index.delete_by_filename("a.txt").await.unwrap();
        assert_eq!(index.stats().await.unwrap().total_vector_count, 1);

        index.clear().await.unwrap();
        let stats = index.stats().await.unwrap();
        assert_eq!(stats.total_vector_count, 0);
        assert_eq!(stats.dimension, 2);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
