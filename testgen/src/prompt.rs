//! Prompt template for test generation
//!
//! The model receives one user message naming the target framework and
//! language, the submitted code, the functions the analyzer discovered and a
//! short list of requirements. It is asked to reply with test code only.
//!
//! The code fence is always longer than any backtick run inside the code, so
//! a snippet containing its own fences cannot close the block early.

use crate::analyzer::CodeAnalysis;
use crate::types::{Framework, Language};

/// Test generation prompt
///
/// # Example
/// ```
/// use testgen::analyzer::{CodeAnalysis, FunctionInfo};
/// use testgen::prompt::GenerationPrompt;
/// use testgen::types::{Framework, Language};
///
/// let analysis = CodeAnalysis::from_functions(vec![FunctionInfo {
///     name: "add".to_string(),
///     args: vec!["a".to_string(), "b".to_string()],
///     has_return: true,
/// }]);
/// let prompt = GenerationPrompt::build(
///     "def add(a, b):\n    return a + b",
///     Language::Python,
///     Framework::Pytest,
///     &analysis,
///     true,
/// );
/// assert!(prompt.contains("Generate pytest test cases for this python code"));
/// assert!(prompt.contains("Functions found: add"));
/// ```
pub struct GenerationPrompt;

impl GenerationPrompt {
    /// Build the generation prompt
    ///
    /// # Arguments
    /// * `code` - Source submitted by the caller
    /// * `language` - Language of `code`
    /// * `framework` - Framework the tests should use
    /// * `analysis` - Analyzer output for `code`
    /// * `include_edge_cases` - Ask for null/empty/invalid input scenarios
    pub fn build(
        code: &str,
        language: Language,
        framework: Framework,
        analysis: &CodeAnalysis,
        include_edge_cases: bool,
    ) -> String {
        let functions = Self::function_summary(analysis);
        let fence = Self::fence_for(code);
        let scenarios = if include_edge_cases {
            "edge cases (null, empty, invalid inputs)"
        } else {
            "basic scenarios"
        };

        format!(
            "Generate {framework} test cases for this {language} code:\n\n\
             {fence}{language}\n{code}\n{fence}\n\n\
             Functions found: {functions}\n\n\
             Requirements:\n\
             1. Write complete, runnable {framework} test cases\n\
             2. Include imports and proper setup\n\
             3. Test normal cases and {scenarios}\n\
             4. Use descriptive test names\n\
             5. Add meaningful assertions\n\n\
             Return ONLY the test code, no explanations.",
            code = code.trim_end(),
        )
    }

    fn fence_for(code: &str) -> String {
        let longest_run = code
            .split(|c: char| c != '`')
            .map(str::len)
            .max()
            .unwrap_or(0);
        "`".repeat(longest_run.max(2) + 1)
    }

    fn function_summary(analysis: &CodeAnalysis) -> String {
        if analysis.functions.is_empty() {
            "none detected".to_string()
        } else {
            analysis.function_names().join(", ")
        }
    }
}
