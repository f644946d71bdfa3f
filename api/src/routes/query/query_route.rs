//! POST /query: answers a documentation question with retrieved context.

use std::sync::Arc;

use axum::{Json, extract::State, http::HeaderMap};
use rag_store::{Collection, Document, PredictRequest};
use tracing::{debug, error, info};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    middleware_layer::request_id::request_id_of,
    routes::query::{query_request::QueryRequest, query_response::QueryResponse},
};

/// Handler: POST /query
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/query \
///   -H 'content-type: application/json' \
///   -d '{"query":"How do I create a VectorIndex?","collection_name":"questiondocs"}'
/// ```
pub async fn query_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<QueryRequest>,
) -> AppResult<Json<QueryResponse>> {
    let request_id = request_id_of(&headers);

    debug!(
        request_id = %request_id,
        query_len = payload.query.len(),
        collection_name = %payload.collection_name,
        "query_route: start"
    );

    let search = &state.search;
    let select = Collection::new(search.collection.as_str())
        .like(
            Document::new().with(search.key.as_str(), payload.query.as_str()),
            search.vector_index.as_str(),
            search.top_k,
        )
        .find();

    let req = PredictRequest {
        model_name: state.model_name.clone(),
        input: payload.query,
        context_select: Some(select),
        context_key: Some(search.key.clone()),
    };

    let prediction = match tokio::time::timeout(state.query_timeout, state.store.predict(req)).await
    {
        Ok(Ok(p)) => p,
        Ok(Err(err)) => {
            error!(
                request_id = %request_id,
                error = %err,
                upstream = err.is_upstream(),
                "query_route: predict failed"
            );
            return Err(AppError::Store(err));
        }
        Err(_) => {
            error!(
                request_id = %request_id,
                timeout_ms = state.query_timeout.as_millis(),
                "query_route: predict timed out"
            );
            return Err(AppError::Timeout(state.query_timeout));
        }
    };

    info!(
        request_id = %request_id,
        context_items = prediction.context.len(),
        answer_len = prediction.output.len(),
        "query_route: answered"
    );

    Ok(Json(QueryResponse {
        answer: prediction.output,
        source_urls: state.source_urls.clone(),
    }))
}
