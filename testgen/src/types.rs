use serde::{Deserialize, Serialize};
use std::fmt;

/// Source language of the submitted code.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    JavaScript,
    CSharp,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::CSharp => "csharp",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Test framework the generated code should target.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    Pytest,
    Unittest,
    Jest,
    Xunit,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Pytest => "pytest",
            Framework::Unittest => "unittest",
            Framework::Jest => "jest",
            Framework::Xunit => "xunit",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_include_edge_cases() -> bool {
    true
}

/// Body of `POST /generate-tests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRequest {
    pub code: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub framework: Framework,
    #[serde(default = "default_include_edge_cases")]
    pub include_edge_cases: bool,
}

impl TestRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: Language::default(),
            framework: Framework::default(),
            include_edge_cases: true,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_framework(mut self, framework: Framework) -> Self {
        self.framework = framework;
        self
    }

    pub fn with_edge_cases(mut self, include_edge_cases: bool) -> Self {
        self.include_edge_cases = include_edge_cases;
        self
    }
}

/// Generated tests plus the metrics derived from them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResponse {
    pub generated_tests: String,
    pub test_count: usize,
    pub confidence_score: f64,
    pub processing_time_ms: u64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}
