//! HTTP service answering documentation questions.
//!
//! Lifecycle: [`start`] reads configuration, opens the document store,
//! registers the completion-model binding once via [`bootstrap`], then serves
//! [`build_router`] until Ctrl+C.

pub mod core;
pub mod error_handler;
pub mod middleware_layer;
pub mod routes;

use std::{sync::Arc, time::Duration};

use ai_llm_service::OpenAiService;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use rag_store::{DocumentStore, OpenAiEmbedder, RagStore, VectorIndex};
use tokio::signal;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::{
    core::{
        app_state::{AppConfig, AppState, ConfigError, DOCS_SOURCE_URL, SearchSettings},
        completion_binding::{PROMPT_TEMPLATE, register_completion_model},
    },
    error_handler::AppError,
    middleware_layer::{json_extractor::json_error_mapper, request_id::request_id},
    routes::{health_route::health_route, query::query_route::query_route},
};

/// Registers the completion-model binding in `store` and builds the shared
/// handler state. Call exactly once per process, before serving traffic.
pub async fn bootstrap(
    store: Arc<dyn DocumentStore>,
    model_identifier: &str,
    query_timeout: Duration,
) -> Result<Arc<AppState>, AppError> {
    let model_name =
        register_completion_model(store.as_ref(), model_identifier, PROMPT_TEMPLATE).await?;

    Ok(Arc::new(AppState {
        store,
        model_name,
        search: SearchSettings::default(),
        source_urls: vec![DOCS_SOURCE_URL.to_string()],
        query_timeout,
    }))
}

/// Builds the router: `POST /query`, `GET /health`, fully open CORS.
///
/// Origins, methods and headers are mirrored from the request so that
/// credentials can be allowed alongside "any origin".
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/query", post(query_route))
        .route("/health", get(health_route))
        .with_state(state)
        // Applied bottom to top: cors is outermost.
        .layer(middleware::from_fn(json_error_mapper))
        .layer(middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn start() -> Result<(), AppError> {
    let cfg = AppConfig::from_env()?;

    let chat = Arc::new(OpenAiService::new(cfg.chat.clone()).map_err(ConfigError::from)?);
    let embed = Arc::new(OpenAiService::new(cfg.embedding.clone()).map_err(ConfigError::from)?);

    let store = RagStore::connect(cfg.rag.clone(), chat)?;
    let search = SearchSettings::default();
    store
        .add_vector_index(VectorIndex::new(
            search.vector_index.as_str(),
            search.key.as_str(),
            Arc::new(OpenAiEmbedder::new(embed, cfg.embedding.model.as_str())),
        ))
        .await;

    match store.collection_exists(&search.collection).await {
        Ok(true) => info!(collection = %search.collection, "document collection found"),
        Ok(false) => warn!(
            collection = %search.collection,
            "document collection does not exist yet; queries will fail until it is populated"
        ),
        Err(err) => warn!(error = %err, "document store not reachable at startup"),
    }

    let state = bootstrap(Arc::new(store), &cfg.chat.model, cfg.query_timeout).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.api_address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %cfg.api_address, "listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
