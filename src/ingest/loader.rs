//! Document loaders for PDF and plain-text files

use std::path::Path;

use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::errors::ExplorerError;
use crate::errors::Result;
use crate::index::Metadata;

/// File types the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Classify by extension, case-insensitively
    ///
    /// # Errors
    /// - `UnsupportedFileType` for anything other than `.pdf` and `.txt`
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" => Ok(Self::Text),
            "" => Err(ExplorerError::UnsupportedFileType("(none)".to_string())),
            other => Err(ExplorerError::UnsupportedFileType(format!(".{other}"))),
        }
    }
}

/// One loaded section of a document: a PDF page or a whole text file
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub text: String,
    pub metadata: Metadata,
}

/// Load a document into pages; blocking, so callers on the runtime use `spawn_blocking`
pub fn load_document(path: &Path) -> Result<Vec<LoadedPage>> {
    let kind = DocumentKind::from_path(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!("Loading document: {}", name);

    let pages = match kind {
        DocumentKind::Text => load_text(path)?,
        DocumentKind::Pdf => load_pdf(path)?,
    };
    info!("Loaded {} page(s) from {}", pages.len(), name);
    Ok(pages)
}

fn source_metadata(path: &Path) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(
        "source".to_string(),
        Value::from(path.to_string_lossy().into_owned()),
    );
    metadata
}

fn load_text(path: &Path) -> Result<Vec<LoadedPage>> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| {
        ExplorerError::DocumentLoad(format!("{} is not valid UTF-8: {e}", path.display()))
    })?;
    Ok(vec![LoadedPage {
        text,
        metadata: source_metadata(path),
    }])
}

fn load_pdf(path: &Path) -> Result<Vec<LoadedPage>> {
    let document = lopdf::Document::load(path)
        .map_err(|e| ExplorerError::DocumentLoad(format!("{}: {e}", path.display())))?;

    let mut pages = Vec::new();
    for (index, page_number) in document.get_pages().into_keys().enumerate() {
        let text = match document.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!("No text extracted from page {} of {}: {}", page_number, path.display(), e);
                String::new()
            }
        };
        debug!("Page {}: {} chars", page_number, text.chars().count());

        let mut metadata = source_metadata(path);
        metadata.insert("page".to_string(), Value::from(index));
        pages.push(LoadedPage { text, metadata });
    }
    Ok(pages)
}
