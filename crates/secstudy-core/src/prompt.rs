//! Prompt templates for the tutoring model.
//!
//! Deterministic template substitution; topic validation happens here, at
//! the boundary, before anything else runs.

use thiserror::Error;

/// Smallest quiz the model is asked for.
pub const MIN_QUIZ_QUESTIONS: u32 = 1;
/// Largest quiz the model is asked for. Requests outside the range are
/// clamped, not rejected.
pub const MAX_QUIZ_QUESTIONS: u32 = 10;

/// Validation failures for prompt input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    /// The topic was blank after trimming.
    #[error("topic is empty")]
    EmptyTopic,
}

fn validated_topic(topic: &str) -> Result<&str, PromptError> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(PromptError::EmptyTopic);
    }
    Ok(trimmed)
}

/// Build the prompt asking the model to explain a topic to a beginner.
pub fn build_explain_prompt(topic: &str) -> Result<String, PromptError> {
    let topic = validated_topic(topic)?;
    Ok(format!(
        "You are a cybersecurity tutor for beginners.\n\
         Explain {topic} in simple terms with:\n\
         1. A one-sentence definition\n\
         2. A real-world example\n\
         3. Why it matters in cybersecurity\n\
         \n\
         Keep it under 200 words and use beginner-friendly language."
    ))
}

/// Build the prompt asking the model for a multiple-choice quiz.
///
/// The prompt dictates the line-based format that
/// [`crate::quiz::parse_quiz_response`] consumes.
pub fn build_quiz_prompt(topic: &str, question_count: u32) -> Result<String, PromptError> {
    let topic = validated_topic(topic)?;
    let count = question_count.clamp(MIN_QUIZ_QUESTIONS, MAX_QUIZ_QUESTIONS);
    Ok(format!(
        "Create {count} multiple-choice quiz questions about {topic} for a \
         beginner learning cybersecurity.\n\
         \n\
         Use exactly this format for every question:\n\
         \n\
         Question 1: <question text>\n\
         A) <option>\n\
         B) <option>\n\
         C) <option>\n\
         D) <option>\n\
         Answer: <letter A-D>\n\
         Explanation: <one sentence on why the answer is correct>\n\
         \n\
         Number the questions sequentially and leave a blank line between \
         questions. Do not add any other text."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explain_prompt_contains_topic() {
        let prompt = build_explain_prompt("phishing").unwrap();
        assert!(prompt.contains("Explain phishing"));
    }

    #[test]
    fn explain_prompt_trims_topic() {
        let prompt = build_explain_prompt("  phishing  ").unwrap();
        assert!(prompt.contains("Explain phishing in"));
    }

    #[test]
    fn blank_topic_is_rejected() {
        assert_eq!(build_explain_prompt("   "), Err(PromptError::EmptyTopic));
        assert_eq!(build_quiz_prompt("", 5), Err(PromptError::EmptyTopic));
    }

    #[test]
    fn question_count_is_clamped_not_rejected() {
        let prompt = build_quiz_prompt("passwords", 15).unwrap();
        assert!(prompt.starts_with("Create 10 "));

        let prompt = build_quiz_prompt("passwords", 0).unwrap();
        assert!(prompt.starts_with("Create 1 "));
    }

    #[test]
    fn in_range_count_is_kept() {
        let prompt = build_quiz_prompt("passwords", 5).unwrap();
        assert!(prompt.starts_with("Create 5 "));
    }
}
