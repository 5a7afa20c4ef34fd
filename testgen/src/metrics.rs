//! Heuristics derived from generated test code.
//!
//! Everything here looks at the shape of the text only. Nothing checks that
//! the generated tests compile or pass.

use crate::analyzer::CodeAnalysis;
use regex::Regex;
use std::sync::OnceLock;

pub const EDGE_CASE_SUGGESTION: &str = "Consider adding more edge case tests";
pub const COMPLEXITY_SUGGESTION: &str = "Complex code detected - review test coverage";

/// Below this many counted tests the edge-case suggestion is made.
pub const MIN_TEST_COUNT: usize = 3;
/// Above this many functions the complexity suggestion is made.
pub const COMPLEXITY_THRESHOLD: usize = 3;

const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_TEST: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.9;

// pytest/unittest `def test_`, Jest `it(`, xUnit `Test...(`
const TEST_PATTERN: &str = r"def test_|it\(|Test.*\(";

fn test_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TEST_PATTERN).expect("test pattern is a valid regex"))
}

/// Counts test declarations in generated code.
///
/// Matches are non-overlapping and `Test.*\(` is greedy within a line, so the
/// count can drift when the model's output strays from the usual idioms.
pub fn count_tests(generated: &str) -> usize {
    test_pattern().find_iter(generated).count()
}

/// `min(0.9, 0.5 + 0.1 * test_count)`, rounded to two decimals.
pub fn confidence_score(test_count: usize) -> f64 {
    let raw = (BASE_CONFIDENCE + test_count as f64 * CONFIDENCE_PER_TEST).min(MAX_CONFIDENCE);
    (raw * 100.0).round() / 100.0
}

pub fn suggestions(test_count: usize, analysis: &CodeAnalysis) -> Vec<String> {
    let mut suggestions = Vec::new();

    if test_count < MIN_TEST_COUNT {
        suggestions.push(EDGE_CASE_SUGGESTION.to_string());
    }
    if analysis.complexity > COMPLEXITY_THRESHOLD {
        suggestions.push(COMPLEXITY_SUGGESTION.to_string());
    }

    suggestions
}
