//! Prompts for grounded and general answers

/// Instruction for answers grounded in retrieved documents
pub const RAG_SYSTEM_INSTRUCTION: &str = "You are a precise AI assistant that answers questions based on the provided context documents. Follow these rules:
1. Use ONLY information from the context documents provided below
2. Provide clear, natural, and well-structured answers
3. Do NOT mention relevance scores or technical metadata in your answer
4. Write in a professional and conversational tone
5. If you cite sources, mention them naturally at the end like: 'Source: [filename]'
6. If the context doesn't contain the answer, say so politely
7. Do NOT include phrases like 'According to the document with relevance score...'";

/// Instruction for answers from general model knowledge
pub const GENERAL_SYSTEM_INSTRUCTION: &str = "You are a helpful AI assistant. Answer the question clearly and accurately. Provide informative, well-structured responses.";

/// Build the grounded prompt from assembled context
pub fn build_rag_prompt(question: &str, context: &str) -> String {
    format!(
        r#"{RAG_SYSTEM_INSTRUCTION}

=== CONTEXT DOCUMENTS ===
{context}

=== END OF CONTEXT ===

Question: {question}

Provide a clear, natural answer using only the information above. Do not mention relevance scores or technical details.

Answer:"#
    )
}

/// Build the ungrounded prompt
pub fn build_general_prompt(question: &str) -> String {
    format!(
        r#"{GENERAL_SYSTEM_INSTRUCTION}

Question: {question}

Answer:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rag_prompt_layout() {
        let prompt = build_rag_prompt("What is the capital?", "[Document: a.txt]\nParis");
        assert!(prompt.starts_with(RAG_SYSTEM_INSTRUCTION));
        assert!(prompt.contains("=== CONTEXT DOCUMENTS ===\n[Document: a.txt]\nParis\n\n=== END OF CONTEXT ==="));
        assert!(prompt.contains("Question: What is the capital?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_general_prompt_has_no_context() {
        let prompt = build_general_prompt("Who wrote Hamlet?");
        assert!(!prompt.contains("CONTEXT"));
        assert!(prompt.contains("Question: Who wrote Hamlet?"));
    }
}
