use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MIN_WORDS: usize = 10;

const FAILURE_PHRASES: [&str; 6] = [
    "i cannot",
    "i don't understand",
    "unclear",
    "error",
    "sorry",
    "unable to",
];

/// Why a successful answer was judged inadequate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTrigger {
    LowConfidence,
    FailurePhrase,
    TooShort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub confidence_threshold: f64,
    pub min_words: usize,
}

impl EscalationPolicy {
    pub fn new() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            min_words: DEFAULT_MIN_WORDS,
        }
    }

    /// First reason the answer should be retried at a larger tier, if any.
    pub fn trigger(&self, response_text: &str, confidence: f64) -> Option<EscalationTrigger> {
        if confidence < self.confidence_threshold {
            return Some(EscalationTrigger::LowConfidence);
        }

        let lowered = response_text.to_lowercase();
        if FAILURE_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
            return Some(EscalationTrigger::FailurePhrase);
        }

        if response_text.split_whitespace().count() < self.min_words {
            return Some(EscalationTrigger::TooShort);
        }

        None
    }

    pub fn should_escalate(&self, response_text: &str, confidence: f64) -> bool {
        self.trigger(response_text, confidence).is_some()
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::new()
    }
}

pub fn should_escalate(response_text: &str, confidence: f64) -> bool {
    EscalationPolicy::default().should_escalate(response_text, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_ANSWER: &str =
        "The capital of France is Paris, a city on the Seine known for its museums.";

    #[test]
    fn test_good_answer_with_high_confidence_stays() {
        assert!(!should_escalate(GOOD_ANSWER, 0.95));
    }

    #[test]
    fn test_low_confidence_escalates() {
        assert!(should_escalate(GOOD_ANSWER, 0.6));
        assert_eq!(
            EscalationPolicy::default().trigger(GOOD_ANSWER, 0.3),
            Some(EscalationTrigger::LowConfidence)
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!should_escalate(GOOD_ANSWER, 0.7));
        assert!(should_escalate(GOOD_ANSWER, 0.699_999));
    }

    #[test]
    fn test_single_crossing_as_confidence_decreases() {
        let mut flips = 0;
        let mut previous = should_escalate(GOOD_ANSWER, 1.0);
        for step in (0..=100).rev() {
            let current = should_escalate(GOOD_ANSWER, step as f64 / 100.0);
            if current != previous {
                flips += 1;
                assert!(!previous && current);
            }
            previous = current;
        }
        assert_eq!(flips, 1);
    }

    #[test]
    fn test_failure_phrases_escalate_case_insensitively() {
        let answer = "Sorry, I am not able to help with that particular request at all today.";
        assert_eq!(
            EscalationPolicy::default().trigger(answer, 0.99),
            Some(EscalationTrigger::FailurePhrase)
        );
        assert!(should_escalate(
            "The request was UNCLEAR so here is a long guess about what you might mean.",
            0.99
        ));
    }

    #[test]
    fn test_short_answer_escalates() {
        assert_eq!(
            EscalationPolicy::default().trigger("Paris.", 0.99),
            Some(EscalationTrigger::TooShort)
        );
        assert!(should_escalate("", 0.99));
    }
}
