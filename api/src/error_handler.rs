use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rag_store::RagError;
use thiserror::Error;

use crate::core::{app_state::ConfigError, http::response_envelope::ApiResponse};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request handling ---
    /// Document store or model failure, classified by where it happened.
    #[error("{0}")]
    Store(#[from] RagError),

    #[error("answer generation timed out after {0:?}")]
    Timeout(Duration),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Store(e) if e.is_upstream() => StatusCode::BAD_GATEWAY,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::Store(e) if e.is_upstream() => "UPSTREAM_ERROR",
            AppError::Store(_) => "STORE_MISCONFIGURED",
            AppError::Timeout(_) => "UPSTREAM_TIMEOUT",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::<()>::error(self.error_code(), self.to_string(), Vec::new())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
