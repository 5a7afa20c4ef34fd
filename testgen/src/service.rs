//! Test generation pipeline: analyze, generate, then score.

use crate::analyzer::{AnalysisError, CodeAnalyzer};
use crate::generator::{GenerationError, TestGenerator};
use crate::metrics;
use crate::types::{TestRequest, TestResponse};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct TestService {
    analyzer: CodeAnalyzer,
    generator: TestGenerator,
}

impl TestService {
    pub fn new(analyzer: CodeAnalyzer, generator: TestGenerator) -> Self {
        Self {
            analyzer,
            generator,
        }
    }

    pub fn generator(&self) -> &TestGenerator {
        &self.generator
    }

    /// Runs one request through the pipeline.
    ///
    /// A syntax error in the submitted code ends the pipeline before the
    /// model is called.
    pub async fn create_tests(&self, request: &TestRequest) -> ServiceResult<TestResponse> {
        let started = Instant::now();

        let analysis = self.analyzer.analyze(&request.code, request.language)?;
        debug!(
            "Analysis found {} function(s): {:?}",
            analysis.complexity,
            analysis.function_names()
        );

        let generated_tests = self
            .generator
            .generate(
                &request.code,
                request.language,
                request.framework,
                &analysis,
                request.include_edge_cases,
            )
            .await?;

        let test_count = metrics::count_tests(&generated_tests);
        let confidence_score = metrics::confidence_score(test_count);
        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let suggestions = metrics::suggestions(test_count, &analysis);

        info!(
            "Pipeline finished: {} test(s), confidence {:.2}, {}ms",
            test_count, confidence_score, processing_time_ms
        );

        Ok(TestResponse {
            generated_tests,
            test_count,
            confidence_score,
            processing_time_ms,
            suggestions,
        })
    }
}
