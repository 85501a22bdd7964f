//! Grounding prompt assembly.
//!
//! Produces the single prompt string handed to the generator: persona
//! preamble, the three grounding rules, the retrieved passages as CONTEXT,
//! and the literal query as QUESTION, wrapped in the Gemma chat turn
//! markers. Assembly is pure: identical inputs always produce an identical
//! prompt. Passage ordering, truncation, and dedup are the retriever's
//! responsibility, not this module's.

/// Separator between concatenated context passages
const PASSAGE_SEPARATOR: &str = " ";

/// Deterministic prompt template instantiation
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptAssembler;

impl PromptAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble the grounding prompt for one query
    pub fn assemble(&self, query: &str, passages: &[&str], language_name: &str) -> String {
        let context = passages.join(PASSAGE_SEPARATOR);

        format!(
            "<start_of_turn>user\n\
             You are 'NyayaSetu', an expert Indian Legal Advisor.\n\
             Your goal is to explain laws simply to common citizens based STRICTLY on the provided context.\n\
             \n\
             Rules:\n\
             1. If the context mentions a specific Section or Act, cite it clearly.\n\
             2. If the answer is not in the context, say \"I do not have information on this specific law.\"\n\
             3. Provide the answer in the {language} language only.\n\
             \n\
             CONTEXT:\n\
             {context}\n\
             \n\
             QUESTION:\n\
             {query}<end_of_turn>\n\
             <start_of_turn>model\n",
            language = language_name,
            context = context,
            query = query,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_is_pure() {
        let assembler = PromptAssembler::new();
        let passages = vec!["Section 3 prescribes a fine.", "Section 4 covers appeals."];
        let first = assembler.assemble("What is the fine?", &passages, "English");
        let second = assembler.assemble("What is the fine?", &passages, "English");
        assert_eq!(first, second);
    }

    #[test]
    fn test_assemble_contains_all_parts() {
        let assembler = PromptAssembler::new();
        let prompt = assembler.assemble(
            "What is the penalty?",
            &["Section 3 of the Motor Vehicles Act prescribes a fine."],
            "Hindi",
        );

        assert!(prompt.contains("CONTEXT:"));
        assert!(prompt.contains("QUESTION:"));
        assert!(prompt.contains("Section 3 of the Motor Vehicles Act"));
        assert!(prompt.contains("What is the penalty?"));
        assert!(prompt.contains("the Hindi language only"));
    }

    #[test]
    fn test_assemble_preserves_passage_order() {
        let assembler = PromptAssembler::new();
        let prompt = assembler.assemble("q", &["first passage", "second passage"], "English");
        let first_pos = prompt.find("first passage").unwrap();
        let second_pos = prompt.find("second passage").unwrap();
        assert!(first_pos < second_pos);
    }

    #[test]
    fn test_assemble_uses_gemma_turn_markers() {
        let assembler = PromptAssembler::new();
        let prompt = assembler.assemble("q", &["p"], "English");
        assert!(prompt.starts_with("<start_of_turn>user\n"));
        assert!(prompt.ends_with("<start_of_turn>model\n"));
        assert!(prompt.contains("<end_of_turn>"));
    }
}
