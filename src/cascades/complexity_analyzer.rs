use std::sync::OnceLock;

use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::cascades::{ComplexityLevel, Domain};

const COMPLEX_KEYWORDS: [&str; 12] = [
    "explain",
    "analyze",
    "compare",
    "evaluate",
    "design",
    "architect",
    "strategy",
    "comprehensive",
    "detailed",
    "step-by-step",
    "pros and cons",
    "trade-offs",
];

const CODE_KEYWORDS: [&str; 18] = [
    "code",
    "function",
    "debug",
    "error",
    "python",
    "javascript",
    "rust",
    "java",
    "sql",
    "api",
    "class",
    "method",
    "variable",
    "loop",
    "array",
    "algorithm",
    "implement",
    "syntax",
];

const MATH_KEYWORDS: [&str; 5] = ["calculate", "solve", "equation", "math", "number"];

const DOMAIN_MATCH_THRESHOLD: usize = 2;

fn simple_patterns() -> &'static RegexSet {
    static SIMPLE_PATTERNS: OnceLock<RegexSet> = OnceLock::new();
    SIMPLE_PATTERNS.get_or_init(|| {
        RegexSet::new([
            r"^what is\b.*\?$",
            r"^who (is|was)\b.*\?$",
            r"^when\b.*\?$",
            r"^where\b.*\?$",
            r"^how many\b.*\?$",
            r"^yes or no\b.*\?$",
            r"^true or false\b.*\?$",
        ])
        .expect("Failed to compile simple question patterns")
    })
}

/// Whole-word patterns for a domain vocabulary, allowing a plural suffix.
fn word_set(vocabulary: &[&str]) -> RegexSet {
    RegexSet::new(
        vocabulary
            .iter()
            .map(|kw| format!(r"\b{}(?:s|es)?\b", regex::escape(kw))),
    )
    .expect("Failed to compile domain vocabulary")
}

fn code_words() -> &'static RegexSet {
    static CODE_WORDS: OnceLock<RegexSet> = OnceLock::new();
    CODE_WORDS.get_or_init(|| word_set(&CODE_KEYWORDS))
}

fn math_words() -> &'static RegexSet {
    static MATH_WORDS: OnceLock<RegexSet> = OnceLock::new();
    MATH_WORDS.get_or_init(|| word_set(&MATH_KEYWORDS))
}

// Complex keywords are stems: "explained" and "designs" still count.
fn count_stems(text: &str, vocabulary: &[&str]) -> usize {
    vocabulary.iter().filter(|kw| text.contains(*kw)).count()
}

fn count_words(text: &str, words: &RegexSet) -> usize {
    words.matches(text).iter().count()
}

/// Raw measurements taken from the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexitySignals {
    pub simple_pattern: bool,
    pub word_count: usize,
    pub complex_keyword_score: usize,
    pub question_marks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub level: ComplexityLevel,
    pub domain: Domain,
    pub signals: ComplexitySignals,
}

/// Classifies a query from its text alone. Implementations must be pure and total.
pub trait ComplexityAnalyzer: Send + Sync {
    fn classify_complexity(&self, query: &str) -> ComplexityLevel;

    fn detect_domain(&self, query: &str) -> Domain;

    fn analyze(&self, query: &str) -> QueryAnalysis;
}

#[derive(Debug, Clone)]
pub struct DefaultComplexityAnalyzer {
    pub short_query_words: usize,
    pub long_query_words: usize,
    pub complex_keyword_threshold: usize,
    pub question_mark_threshold: usize,
}

impl DefaultComplexityAnalyzer {
    pub fn new() -> Self {
        Self {
            short_query_words: 10,
            long_query_words: 50,
            complex_keyword_threshold: 2,
            question_mark_threshold: 2,
        }
    }

    pub fn signals(query: &str) -> ComplexitySignals {
        let lowered = query.trim().to_lowercase();

        ComplexitySignals {
            simple_pattern: simple_patterns().is_match(&lowered),
            word_count: lowered.split_whitespace().count(),
            complex_keyword_score: count_stems(&lowered, &COMPLEX_KEYWORDS),
            question_marks: lowered.matches('?').count(),
        }
    }

    fn level_from_signals(&self, signals: &ComplexitySignals) -> ComplexityLevel {
        if signals.simple_pattern {
            return ComplexityLevel::Simple;
        }

        if signals.word_count < self.short_query_words && signals.complex_keyword_score == 0 {
            ComplexityLevel::Simple
        } else if signals.word_count > self.long_query_words
            || signals.complex_keyword_score >= self.complex_keyword_threshold
            || signals.question_marks > self.question_mark_threshold
        {
            ComplexityLevel::Complex
        } else {
            ComplexityLevel::Moderate
        }
    }
}

impl Default for DefaultComplexityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplexityAnalyzer for DefaultComplexityAnalyzer {
    fn classify_complexity(&self, query: &str) -> ComplexityLevel {
        self.level_from_signals(&Self::signals(query))
    }

    fn detect_domain(&self, query: &str) -> Domain {
        let lowered = query.to_lowercase();

        if count_words(&lowered, code_words()) >= DOMAIN_MATCH_THRESHOLD {
            return Domain::Code;
        }

        if count_words(&lowered, math_words()) >= DOMAIN_MATCH_THRESHOLD {
            return Domain::Math;
        }

        Domain::General
    }

    fn analyze(&self, query: &str) -> QueryAnalysis {
        let signals = Self::signals(query);
        QueryAnalysis {
            level: self.level_from_signals(&signals),
            domain: self.detect_domain(query),
            signals,
        }
    }
}
