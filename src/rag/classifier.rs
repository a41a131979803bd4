//! Document-question classification

/// Phrases that suggest the question refers to uploaded material
pub const DOCUMENT_KEYWORDS: &[&str] = &[
    "document",
    "file",
    "pdf",
    "upload",
    "this",
    "resume",
    "report",
    "summarize",
    "summary",
    "what does",
    "according to",
    "in the",
    "from the",
    "based on",
    "mentioned",
    "describe",
    "explain this",
    "tell me about this",
    "what is in",
    "information about",
    "details about",
    "content",
    "paper",
];

/// Decides whether a question should be answered from the document corpus
pub trait QuestionClassifier: Send + Sync {
    fn classify(&self, question: &str) -> bool;
}

/// Case-insensitive substring match against a keyword list
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    #[must_use]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DOCUMENT_KEYWORDS.iter().copied())
    }
}

impl QuestionClassifier for KeywordClassifier {
    fn classify(&self, question: &str) -> bool {
        let question = question.to_lowercase();
        self.keywords.iter().any(|k| question.contains(k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_questions() {
        let classifier = KeywordClassifier::default();
        assert!(classifier.classify("Summarize the uploaded report"));
        assert!(classifier.classify("What does the PDF say about pricing?"));
        assert!(classifier.classify("According to my resume, where did I work?"));
    }

    #[test]
    fn test_general_questions() {
        let classifier = KeywordClassifier::default();
        assert!(!classifier.classify("Who wrote Hamlet?"));
        assert!(!classifier.classify("How far away is the moon?"));
    }

    #[test]
    fn test_substring_match_is_coarse() {
        // "in the" matches inside an otherwise general question
        let classifier = KeywordClassifier::default();
        assert!(classifier.classify("What is the tallest mountain in the world?"));
    }

    #[test]
    fn test_custom_keywords_are_case_insensitive() {
        let classifier = KeywordClassifier::new(["Invoice"]);
        assert!(classifier.classify("total on the INVOICE?"));
        assert!(!classifier.classify("capital of France?"));
    }
}
