//! Completion response validation

use super::completion_client::{CompletionError, CompletionResult};

/// Extract the first usable output text from a completion result.
///
/// A result is valid only if at least one choice carries non-empty message
/// content; the content is returned trimmed. Empty output is deliberately
/// the same failure class as a transport error: the caller's recovery (try
/// the next tier) is identical either way.
pub fn validate_completion(result: &CompletionResult) -> Result<String, CompletionError> {
    result
        .choices
        .iter()
        .map(|choice| choice.message.content.trim())
        .find(|content| !content.is_empty())
        .map(|content| content.to_string())
        .ok_or(CompletionError::EmptyOutput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completion_client::{ChatMessage, CompletionChoice};

    fn result_with(contents: &[&str]) -> CompletionResult {
        CompletionResult {
            choices: contents
                .iter()
                .map(|content| CompletionChoice {
                    message: ChatMessage {
                        role: "assistant".to_string(),
                        content: content.to_string(),
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn test_first_choice_wins() {
        let result = result_with(&["  polished text  ", "other"]);
        assert_eq!(validate_completion(&result).unwrap(), "polished text");
    }

    #[test]
    fn test_skips_empty_choices() {
        let result = result_with(&["", "   ", "second choice"]);
        assert_eq!(validate_completion(&result).unwrap(), "second choice");
    }

    #[test]
    fn test_no_choices_is_empty_output() {
        let result = result_with(&[]);
        assert!(matches!(
            validate_completion(&result),
            Err(CompletionError::EmptyOutput)
        ));
    }

    #[test]
    fn test_whitespace_only_is_empty_output() {
        let result = result_with(&["   \n  "]);
        assert!(matches!(
            validate_completion(&result),
            Err(CompletionError::EmptyOutput)
        ));
    }
}
