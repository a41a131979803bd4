//! Pinecone serverless index over the REST API
//!
//! The control plane (`/indexes`) resolves or creates the index and returns its data-plane host.
//! Vector operations then go to `https://{host}`.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;
use tracing::debug;
use tracing::info;

use super::IndexMatch;
use super::IndexStats;
use super::MetadataFilter;
use super::NamespaceStats;
use super::SimilarityIndex;
use super::VectorRecord;
use crate::config::IndexConfig;
use crate::errors::ExplorerError;
use crate::errors::Result;
use crate::retry::with_backoff;
use crate::retry::RetryPolicy;

/// Records sent per upsert request
pub const UPSERT_BATCH_SIZE: usize = 100;

const API_VERSION: &str = "2024-07";
const SERVICE: &str = "Pinecone";

#[derive(Debug, Deserialize)]
struct IndexDescription {
    host: String,
    #[serde(default)]
    dimension: Option<usize>,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<IndexMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    dimension: usize,
    #[serde(default)]
    total_vector_count: u64,
    #[serde(default)]
    namespaces: std::collections::HashMap<String, NamespaceStats>,
}

#[derive(Debug, Clone)]
struct Connection {
    host: String,
    dimension: Option<usize>,
}

/// Pinecone-backed [`SimilarityIndex`]
pub struct PineconeIndex {
    client: Client,
    api_key: String,
    control_endpoint: String,
    name: String,
    cloud: String,
    region: String,
    retry: RetryPolicy,
    connection: RwLock<Option<Connection>>,
}

impl PineconeIndex {
    /// Create a client; no request is made until the index is initialized
    pub fn new(config: &IndexConfig, retry: RetryPolicy) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ExplorerError::Config("Pinecone API key not provided".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ExplorerError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            control_endpoint: config.control_endpoint.trim_end_matches('/').to_string(),
            name: config.name.clone(),
            cloud: config.cloud.clone(),
            region: config.region.clone(),
            retry,
            connection: RwLock::new(None),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn connection(&self) -> Result<Connection> {
        let guard = self
            .connection
            .read()
            .map_err(|_| ExplorerError::Index("connection lock poisoned".to_string()))?;
        guard.clone().ok_or_else(|| {
            ExplorerError::NotInitialized(format!("index '{}' is not connected", self.name))
        })
    }

    fn data_url(&self, path: &str) -> Result<String> {
        Ok(format!("{}{}", host_base(&self.connection()?.host), path))
    }

    fn connect(&self, description: IndexDescription) -> Result<()> {
        let mut guard = self
            .connection
            .write()
            .map_err(|_| ExplorerError::Index("connection lock poisoned".to_string()))?;
        *guard = Some(Connection {
            host: description.host,
            dimension: description.dimension,
        });
        Ok(())
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        match self.connection()?.dimension {
            Some(expected) if expected != actual => {
                Err(ExplorerError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }

    /// Look the index up on the control plane; `None` when it does not exist
    async fn describe(&self) -> Result<Option<IndexDescription>> {
        let url = format!("{}/indexes/{}", self.control_endpoint, self.name);
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;
        let description = response
            .json()
            .await
            .map_err(|e| ExplorerError::Index(format!("Failed to parse index description: {e}")))?;
        Ok(Some(description))
    }

    async fn create(&self, dimension: usize) -> Result<()> {
        let url = format!("{}/indexes", self.control_endpoint);
        let request = CreateIndexRequest {
            name: &self.name,
            dimension,
            metric: "cosine",
            spec: json!({ "serverless": { "cloud": self.cloud, "region": self.region } }),
        };
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        // Another process created it first
        if response.status() == StatusCode::CONFLICT {
            debug!("Index '{}' already exists", self.name);
            return Ok(());
        }
        check_status(response).await?;
        info!("Created Pinecone index '{}' ({} dimensions)", self.name, dimension);
        Ok(())
    }

    /// Connect to an index that already exists without creating it
    async fn ensure_connected(&self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }
        match with_backoff(&self.retry, "Pinecone describe", || self.describe()).await? {
            Some(description) => {
                debug!("Connected to existing index: {}", self.name);
                self.connect(description)
            }
            None => Err(ExplorerError::NotInitialized(format!(
                "index '{}' does not exist yet",
                self.name
            ))),
        }
    }

    async fn post_data(&self, path: &str, body: &Value) -> Result<reqwest::Response> {
        let url = self.data_url(path)?;
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await?;
        check_status(response).await
    }

    async fn upsert_batch(&self, batch: &[VectorRecord]) -> Result<usize> {
        let body = json!({ "vectors": batch });
        let response = self.post_data("/vectors/upsert", &body).await?;
        let parsed: UpsertResponse = response
            .json()
            .await
            .map_err(|e| ExplorerError::Index(format!("Failed to parse upsert response: {e}")))?;
        Ok(parsed.upserted_count)
    }

    async fn delete_with(&self, body: Value) -> Result<()> {
        with_backoff(&self.retry, "Pinecone delete", || self.post_data("/vectors/delete", &body))
            .await?;
        Ok(())
    }
}

fn host_base(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", host.trim_end_matches('/'))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ExplorerError::Upstream {
        service: SERVICE,
        status: status.as_u16(),
        message: error_text,
    })
}

#[async_trait]
impl SimilarityIndex for PineconeIndex {
    fn is_initialized(&self) -> bool {
        self.connection
            .read()
            .map(|c| c.is_some())
            .unwrap_or(false)
    }

    async fn ensure_initialized(&self, dimension: usize) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        let description = match with_backoff(&self.retry, "Pinecone describe", || self.describe()).await? {
            Some(description) => {
                info!("Connecting to existing index: {}", self.name);
                description
            }
            None => {
                info!("Creating new Pinecone index: {}", self.name);
                with_backoff(&self.retry, "Pinecone create", || self.create(dimension)).await?;
                with_backoff(&self.retry, "Pinecone describe", || self.describe())
                    .await?
                    .ok_or_else(|| {
                        ExplorerError::Index(format!("index '{}' missing after creation", self.name))
                    })?
            }
        };

        if let Some(existing) = description.dimension {
            if existing != dimension {
                return Err(ExplorerError::DimensionMismatch {
                    expected: existing,
                    actual: dimension,
                });
            }
        }

        self.connect(description)
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        for record in records {
            self.check_dimension(record.values.len())?;
        }
        let mut total = 0;
        for (i, batch) in records.chunks(UPSERT_BATCH_SIZE).enumerate() {
            let count =
                with_backoff(&self.retry, "Pinecone upsert", || self.upsert_batch(batch)).await?;
            debug!("Upserted batch {}: {} vectors", i + 1, count);
            total += count;
        }
        info!("Upserted {} vectors to Pinecone", total);
        Ok(total)
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<IndexMatch>> {
        let mut body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });
        if let Some(filter) = filter {
            body["filter"] = filter.to_json();
        }
        self.ensure_connected().await?;
        self.check_dimension(vector.len())?;

        let response =
            with_backoff(&self.retry, "Pinecone query", || self.post_data("/query", &body)).await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| ExplorerError::Index(format!("Failed to parse query response: {e}")))?;
        debug!("Query returned {} results", parsed.matches.len());
        Ok(parsed.matches)
    }

    async fn delete_by_filename(&self, filename: &str) -> Result<()> {
        self.ensure_connected().await?;
        let filter = MetadataFilter::FilenameEquals(filename.to_string());
        self.delete_with(json!({ "filter": filter.to_json() })).await?;
        info!("Deleted vectors for filename: {}", filename);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_connected().await?;
        self.delete_with(json!({ "deleteAll": true })).await?;
        info!("Cleared all vectors from index '{}'", self.name);
        Ok(())
    }

    async fn stats(&self) -> Result<IndexStats> {
        self.ensure_connected().await?;
        let body = json!({});
        let response = with_backoff(&self.retry, "Pinecone stats", || {
            self.post_data("/describe_index_stats", &body)
        })
        .await?;
        let parsed: StatsResponse = response
            .json()
            .await
            .map_err(|e| ExplorerError::Index(format!("Failed to parse stats response: {e}")))?;
        Ok(IndexStats {
            total_vector_count: parsed.total_vector_count,
            dimension: parsed.dimension,
            namespaces: parsed.namespaces,
        })
    }
}
