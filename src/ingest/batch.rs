//! Aggregate status for a batch of per-file ingestion outcomes

use serde::Deserialize;
use serde::Serialize;

use super::pipeline::IngestResult;
use super::pipeline::IngestStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Success,
    Partial,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub status: BatchStatus,
    pub message: String,
    pub successful: usize,
    pub failed: usize,
    pub files: Vec<IngestResult>,
}

/// Classify a batch: `error` iff every file failed, `success` if any succeeded, else `partial`
///
/// Depends only on the multiset of per-file statuses.
#[must_use]
pub fn summarize(files: Vec<IngestResult>) -> BatchSummary {
    let successful = files
        .iter()
        .filter(|r| r.status == IngestStatus::Success)
        .count();
    let failed = files
        .iter()
        .filter(|r| r.status == IngestStatus::Error)
        .count();

    let (status, message) = if failed == files.len() {
        (BatchStatus::Error, "All files failed to process".to_string())
    } else if successful > 0 {
        let mut message = format!("Successfully processed {successful} file(s)");
        if failed > 0 {
            message.push_str(&format!(", {failed} failed"));
        }
        (BatchStatus::Success, message)
    } else {
        (
            BatchStatus::Partial,
            "Some files processed successfully".to_string(),
        )
    };

    BatchSummary {
        status,
        message,
        successful,
        failed,
        files,
    }
}
