use crate::service::{ServiceError, TestService};
use crate::types::{TestRequest, TestResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const INDEX_HTML: &str = include_str!("../static/index.html");

pub const HEALTH_STATUS: &str = "AI Test Generator is running";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Pipeline(#[from] ServiceError),
}

#[derive(Debug, Serialize)]
struct ErrorPayload {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let payload = ErrorPayload {
            detail: self.to_string(),
        };
        (status, Json(payload)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TestService>,
}

impl AppState {
    pub fn new(service: TestService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/generate-tests", post(generate_tests))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: HEALTH_STATUS,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn generate_tests(
    State(state): State<AppState>,
    Json(request): Json<TestRequest>,
) -> Result<Json<TestResponse>, ApiError> {
    info!(
        "Generating {} tests for {} code",
        request.framework, request.language
    );

    match state.service.create_tests(&request).await {
        Ok(response) => {
            info!(
                "Generated {} tests in {}ms",
                response.test_count, response.processing_time_ms
            );
            Ok(Json(response))
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            Err(e.into())
        }
    }
}
