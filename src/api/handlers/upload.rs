/// Upload handlers
use std::path::Path;
use std::path::PathBuf;

use axum::extract::Multipart;
use axum::extract::State;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::AppState;
use crate::api::types::ApiError;
use crate::api::types::UploadStatusResponse;
use crate::api::types::UploadedFile;
use crate::errors::ExplorerError;
use crate::ingest::summarize;
use crate::ingest::BatchSummary;
use crate::ingest::DocumentKind;
use crate::ingest::IngestResult;

/// Message for files rejected by extension
pub const UNSUPPORTED_FILE_MESSAGE: &str =
    "Unsupported file type. Only PDF and TXT files are allowed.";

/// Final path component of a client-supplied name, or `None` if nothing usable remains
#[must_use]
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// Upload and ingest PDF/TXT files (POST /api/upload)
///
/// Each file is checked, saved and ingested independently; only a malformed request
/// or an upload with no files fails as a whole.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchSummary>, ApiError> {
    info!("POST /api/upload");

    let max_size = state.config.documents.max_upload_size;
    let upload_dir = PathBuf::from(&state.config.documents.upload_dir);
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .map_err(|e| state.api_error("Failed to prepare upload directory", &e.into()))?;

    let mut results: Vec<IngestResult> = Vec::new();
    let mut saved: Vec<(PathBuf, String)> = Vec::new();
    let mut received = 0usize;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| state.api_error("Invalid upload", &ExplorerError::Validation(e.to_string())))?
    {
        let Some(raw_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        received += 1;

        let Some(filename) = sanitize_filename(&raw_name) else {
            warn!("Rejected upload with unusable filename: {:?}", raw_name);
            results.push(IngestResult::error(raw_name, "Invalid filename"));
            continue;
        };

        if let Err(e) = DocumentKind::from_path(Path::new(&filename)) {
            warn!("Rejected file {}: {}", filename, e);
            results.push(IngestResult::error(filename, UNSUPPORTED_FILE_MESSAGE));
            continue;
        }

        // Drain the whole field so the next one can be read, keeping at most `max_size` bytes
        let mut data: Vec<u8> = Vec::new();
        let mut size: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| state.api_error("Invalid upload", &ExplorerError::Validation(e.to_string())))?
        {
            size += chunk.len() as u64;
            if size <= max_size {
                data.extend_from_slice(&chunk);
            }
        }

        if size > max_size {
            warn!("Rejected file {}: too large ({} bytes)", filename, size);
            results.push(IngestResult::error(
                filename,
                format!("File too large. Maximum size is {max_size} bytes."),
            ));
            continue;
        }

        let path = upload_dir.join(&filename);
        match tokio::fs::write(&path, &data).await {
            Ok(()) => {
                info!("Saved file: {} ({} bytes)", filename, size);
                saved.push((path, filename));
            }
            Err(e) => {
                error!("Failed to save file {}: {}", filename, e);
                results.push(IngestResult::error(
                    filename,
                    format!("Failed to save file: {e}"),
                ));
            }
        }
    }

    if received == 0 {
        return Err(state.api_error(
            "No files provided",
            &ExplorerError::Validation("No files provided".to_string()),
        ));
    }

    if !saved.is_empty() {
        info!("Starting ingestion for {} file(s)", saved.len());
        results.extend(state.ingestion.ingest_files(&saved).await);
    }

    let summary = summarize(results);
    info!(
        "Upload complete: {} success, {} errors",
        summary.successful, summary.failed
    );
    Ok(Json(summary))
}

/// List the upload directory (GET /api/upload/status)
pub async fn upload_status(
    State(state): State<AppState>,
) -> Result<Json<UploadStatusResponse>, ApiError> {
    info!("GET /api/upload/status");

    let upload_dir = PathBuf::from(&state.config.documents.upload_dir);
    if !tokio::fs::try_exists(&upload_dir).await.unwrap_or(false) {
        return Ok(Json(UploadStatusResponse {
            exists: false,
            file_count: 0,
            files: Vec::new(),
        }));
    }

    let list_error = |e: std::io::Error| state.api_error("Failed to read upload directory", &e.into());
    let mut entries = tokio::fs::read_dir(&upload_dir).await.map_err(list_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
        let metadata = entry.metadata().await.map_err(list_error)?;
        if !metadata.is_file() {
            continue;
        }
        files.push(UploadedFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(UploadStatusResponse {
        exists: true,
        file_count: files.len(),
        files,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_final_component() {
        assert_eq!(sanitize_filename("notes.txt").as_deref(), Some("notes.txt"));
        assert_eq!(
            sanitize_filename("../../etc/passwd.txt").as_deref(),
            Some("passwd.txt")
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\me\\report.pdf").as_deref(),
            Some("report.pdf")
        );
    }

    #[test]
    fn test_sanitize_rejects_empty_and_dot_names() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("uploads/"), None);
        assert_eq!(sanitize_filename(".."), None);
    }
}
