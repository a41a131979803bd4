//! Recursive separator-preference text splitter
//!
//! Text is split on the first separator (in preference order) that occurs in it. Pieces that
//! are still too long are split again with the remaining separators, down to single characters.
//! Short pieces are merged back into chunks of at most `chunk_size` characters, carrying up to
//! `chunk_overlap` characters from the end of one chunk into the start of the next.
//! Separators stay attached to the start of the piece that follows them.

use std::collections::VecDeque;

use tracing::warn;

use crate::errors::ExplorerError;
use crate::errors::Result;

/// Paragraph, line, word, character
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl RecursiveSplitter {
    /// Create a splitter with the default separators
    ///
    /// # Errors
    /// - `chunk_size` is zero or `chunk_overlap >= chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Self::with_separators(chunk_size, chunk_overlap, &DEFAULT_SEPARATORS)
    }

    pub fn with_separators(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: &[&str],
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ExplorerError::Validation("chunk_size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(ExplorerError::Validation(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: separators.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub const fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into chunks; empty or whitespace-only text yields no chunks
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let separators: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        self.split_recursive(text, &separators)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // First separator present in the text wins; "" always matches
        let mut separator = separators.last().copied().unwrap_or("");
        let mut remaining: &[&str] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate;
                break;
            }
            if text.contains(candidate) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                chunks.extend(self.merge(&good));
                good.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !good.is_empty() {
            chunks.extend(self.merge(&good));
        }
        chunks
    }

    /// Greedily pack pieces into chunks, retaining a tail of at most `chunk_overlap` chars
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }
                if !current.is_empty() {
                    if let Some(chunk) = join_pieces(&current) {
                        chunks.push(chunk);
                    }
                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match current.pop_front() {
                            Some(front) => total -= char_len(front),
                            None => break,
                        }
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }

        if let Some(chunk) = join_pieces(&current) {
            chunks.push(chunk);
        }
        chunks
    }
}

fn join_pieces(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split on `separator`, keeping each separator at the start of the following piece
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        assert!(RecursiveSplitter::new(100, 100).is_err());
        assert!(RecursiveSplitter::new(0, 0).is_err());
        assert!(RecursiveSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = RecursiveSplitter::new(1000, 200).unwrap();
        let text = "The capital of France is Paris. It is on the Seine.";
        assert_eq!(splitter.split_text(text), vec![text.to_string()]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let splitter = RecursiveSplitter::new(1000, 200).unwrap();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text("  \n\n  ").is_empty());
    }

    #[test]
    fn test_word_split_without_overlap() {
        let splitter = RecursiveSplitter::new(10, 0).unwrap();
        assert_eq!(splitter.split_text("aaaa bbbb cccc"), vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn test_word_split_carries_overlap() {
        let splitter = RecursiveSplitter::new(10, 5).unwrap();
        assert_eq!(
            splitter.split_text("aaaa bbbb cccc"),
            vec!["aaaa bbbb", "bbbb cccc"]
        );
    }

    #[test]
    fn test_hard_character_cut() {
        let splitter = RecursiveSplitter::new(4, 0).unwrap();
        assert_eq!(splitter.split_text("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let splitter = RecursiveSplitter::new(30, 0).unwrap();
        let text = "First paragraph here.\n\nSecond paragraph here.";
        assert_eq!(
            splitter.split_text(text),
            vec!["First paragraph here.", "Second paragraph here."]
        );
    }

    #[test]
    fn test_chunks_never_exceed_size() {
        let splitter = RecursiveSplitter::new(50, 10).unwrap();
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n".repeat(20)
            + &"x".repeat(180);
        let chunks = splitter.split_text(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 50));
    }

    #[test]
    fn test_multibyte_text_counts_characters() {
        let splitter = RecursiveSplitter::new(3, 0).unwrap();
        assert_eq!(splitter.split_text("éééééé"), vec!["ééé", "ééé"]);
    }

    #[test]
    fn test_split_keeping_separator_attaches_to_next_piece() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\n\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\n", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("\n\nab", "\n\n"), vec!["\n\nab"]);
    }
}
