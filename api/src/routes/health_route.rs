//! GET /health: reports whether the document store is reachable.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use serde::Serialize;
use tracing::warn;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub collection: String,
    pub collection_exists: bool,
    pub model: String,
}

pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let collection = state.search.collection.as_str();
    match state.store.collection_exists(collection).await {
        Ok(exists) => ApiResponse::success(HealthBody {
            collection: collection.to_string(),
            collection_exists: exists,
            model: state.model_name.clone(),
        })
        .into_response_with_status(StatusCode::OK),
        Err(err) => {
            warn!(error = %err, "health: document store unreachable");
            ApiResponse::<()>::error("STORE_UNAVAILABLE", err.to_string(), Vec::new())
                .into_response_with_status(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
