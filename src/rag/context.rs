//! Context assembly and citations from retrieved documents

use crate::rag::RetrievedDocument;
use crate::rag::SourceCitation;

/// Separator placed between documents in the prompt context
pub const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

/// Characters of chunk text shown in a citation preview
pub const PREVIEW_CHARS: usize = 200;

/// Truncate a string to at most `max_chars` characters, appending `...` when cut
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Assembler for creating context from retrieved documents
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    /// Label each document with its filename and join them; scores are left out
    #[must_use]
    pub fn assemble(&self, documents: &[RetrievedDocument]) -> String {
        documents
            .iter()
            .map(|doc| format!("[Document: {}]\n{}", doc.filename, doc.text))
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR)
    }

    /// Caller-facing citations, in retrieval order
    #[must_use]
    pub fn citations(&self, documents: &[RetrievedDocument]) -> Vec<SourceCitation> {
        documents
            .iter()
            .map(|doc| SourceCitation {
                filename: doc.filename.clone(),
                chunk_id: doc.chunk_id.clone(),
                score: doc.score,
                preview: truncate_str(&doc.text, PREVIEW_CHARS),
            })
            .collect()
    }
}

/// Citation text to append to an answer, if it needs one
///
/// `None` when there are no sources or the answer already mentions `source:`.
/// Filenames are listed once each, in first-seen order.
#[must_use]
pub fn citation_suffix(answer: &str, sources: &[SourceCitation]) -> Option<String> {
    if sources.is_empty() || answer.to_lowercase().contains("source:") {
        return None;
    }

    let mut names: Vec<&str> = Vec::new();
    for source in sources {
        if !names.contains(&source.filename.as_str()) {
            names.push(&source.filename);
        }
    }

    Some(if names.len() == 1 {
        format!("\n\nSource: {}", names[0])
    } else {
        format!("\n\nSources: {}", names.join(", "))
    })
}
