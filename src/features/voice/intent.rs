//! Transcript intent classification
//!
//! Keyword matching for both interaction modes lives here so it can be tested
//! without an engine. Keywords are matched case-insensitively; medication
//! names keep the speaker's capitalisation.

use regex::Regex;
use std::sync::OnceLock;

use super::mode::InteractionMode;

/// What a recognised transcript asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Cancel,
    AddMedication(String),
    Confirm,
    RepeatRequest,
    Unrecognized,
}

fn cancel_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)^(cancel|stop|exit)$").ok())
        .as_ref()
}

fn add_prefix_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^add ").ok()).as_ref()
}

/// Classify a transcript for the given mode
pub fn classify(mode: InteractionMode, transcript: &str) -> Intent {
    let transcript = transcript.trim();
    match mode {
        InteractionMode::Setup => classify_setup(transcript),
        InteractionMode::Confirmation => classify_confirmation(transcript),
    }
}

fn classify_setup(transcript: &str) -> Intent {
    if cancel_pattern().is_some_and(|re| re.is_match(transcript)) {
        return Intent::Cancel;
    }

    match add_prefix_pattern().and_then(|re| re.find(transcript)) {
        Some(prefix) => Intent::AddMedication(transcript[prefix.end()..].trim().to_string()),
        None => Intent::AddMedication(transcript.to_string()),
    }
}

fn classify_confirmation(transcript: &str) -> Intent {
    let lower = transcript.to_lowercase();

    if lower.contains("done") || lower.contains("taken") {
        Intent::Confirm
    } else if lower.contains("repeat") {
        Intent::RepeatRequest
    } else {
        Intent::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_patterns_compile() {
        assert!(cancel_pattern().is_some());
        assert!(add_prefix_pattern().is_some());
    }

    #[test]
    fn test_setup_cancel_words() {
        for word in ["cancel", "stop", "exit", " Cancel ", "STOP"] {
            assert_eq!(classify(InteractionMode::Setup, word), Intent::Cancel, "{word}");
        }
        // Only an exact match aborts setup
        assert_eq!(
            classify(InteractionMode::Setup, "stop pills"),
            Intent::AddMedication("stop pills".to_string())
        );
    }

    #[test]
    fn test_setup_add_prefix() {
        assert_eq!(
            classify(InteractionMode::Setup, "add Tylenol"),
            Intent::AddMedication("Tylenol".to_string())
        );
        assert_eq!(
            classify(InteractionMode::Setup, "Add  vitamin D"),
            Intent::AddMedication("vitamin D".to_string())
        );
        assert_eq!(
            classify(InteractionMode::Setup, "Ibuprofen 200mg"),
            Intent::AddMedication("Ibuprofen 200mg".to_string())
        );
        // "add" with nothing after it is taken as a name
        assert_eq!(
            classify(InteractionMode::Setup, "add"),
            Intent::AddMedication("add".to_string())
        );
        assert_eq!(
            classify(InteractionMode::Setup, "   "),
            Intent::AddMedication(String::new())
        );
    }

    #[test]
    fn test_confirmation_keywords() {
        assert_eq!(classify(InteractionMode::Confirmation, "I'm done"), Intent::Confirm);
        assert_eq!(classify(InteractionMode::Confirmation, "Taken them"), Intent::Confirm);
        assert_eq!(
            classify(InteractionMode::Confirmation, "please repeat that"),
            Intent::RepeatRequest
        );
        assert_eq!(
            classify(InteractionMode::Confirmation, "what time is it"),
            Intent::Unrecognized
        );
    }

    #[test]
    fn test_confirm_wins_over_repeat() {
        assert_eq!(
            classify(InteractionMode::Confirmation, "done, no need to repeat"),
            Intent::Confirm
        );
    }

    #[test]
    fn test_cancel_is_not_special_in_confirmation() {
        assert_eq!(
            classify(InteractionMode::Confirmation, "cancel"),
            Intent::Unrecognized
        );
    }
}
