//! Document store facade: similarity search over Qdrant plus a registry of
//! completion models, combined into one retrieval-augmented `predict` call.
//!
//! This crate provides:
//! - Similarity-search queries (`Collection::like(..).find()`)
//! - Vector index and completion-model registries
//! - `predict`: vector search → prompt rendering → remote chat completion
//!
//! Application code should depend on the [`DocumentStore`] trait so handlers
//! can be exercised without a live Qdrant or model provider.

mod config;
mod embed;
mod errors;
mod models;
mod qdrant_facade;
mod query;
mod record;
mod retrieve;
mod vector_index;

pub use config::RagConfig;
pub use embed::{EmbeddingsProvider, OpenAiEmbedder};
pub use errors::RagError;
pub use models::{CONTEXT_PLACEHOLDER, ChatCompletionModel};
pub use qdrant_facade::VectorSearch;
pub use query::{Collection, Like, Select};
pub use record::{Document, PredictRequest, Prediction, RagHit};
pub use vector_index::VectorIndex;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use ai_llm_service::OpenAiService;
use futures::future::BoxFuture;
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

/// Store operations the HTTP layer depends on.
pub trait DocumentStore: Send + Sync {
    /// Registers a completion model; repeated registration of an identical
    /// binding is a no-op.
    fn add(&self, model: ChatCompletionModel) -> BoxFuture<'_, Result<(), RagError>>;

    /// Retrieval + generation in one call.
    fn predict(&self, req: PredictRequest) -> BoxFuture<'_, Result<Prediction, RagError>>;

    /// Readiness probe for a collection.
    fn collection_exists<'a>(&'a self, collection: &'a str)
    -> BoxFuture<'a, Result<bool, RagError>>;
}

/// Qdrant-backed [`DocumentStore`].
///
/// Construct once at startup, wrap in `Arc`, and share across handlers. The
/// registries are written during startup and read on every request.
pub struct RagStore {
    cfg: RagConfig,
    client: Arc<dyn VectorSearch>,
    llm: Arc<OpenAiService>,
    models: RwLock<HashMap<String, Arc<ChatCompletionModel>>>,
    indexes: RwLock<HashMap<String, VectorIndex>>,
}

impl RagStore {
    /// Opens the store handle.
    ///
    /// # Errors
    /// Returns `RagError::Config` for invalid settings or `RagError::Qdrant`
    /// if the client cannot be built.
    pub fn connect(cfg: RagConfig, llm: Arc<OpenAiService>) -> Result<Self, RagError> {
        trace!("RagStore::connect url={}", cfg.qdrant_url);
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self::with_search(cfg, Arc::new(client), llm))
    }

    /// Builds the store over an already constructed search backend.
    pub fn with_search(
        cfg: RagConfig,
        client: Arc<dyn VectorSearch>,
        llm: Arc<OpenAiService>,
    ) -> Self {
        Self {
            cfg,
            client,
            llm,
            models: RwLock::new(HashMap::new()),
            indexes: RwLock::new(HashMap::new()),
        }
    }

    /// Registers (or replaces) a vector index.
    pub async fn add_vector_index(&self, index: VectorIndex) {
        info!(index = %index.identifier, key = %index.key, "vector index registered");
        self.indexes
            .write()
            .await
            .insert(index.identifier.clone(), index);
    }

    /// Registers a completion model under its identifier.
    ///
    /// An identical binding already present is left untouched; a different
    /// binding under the same identifier replaces it.
    pub async fn add(&self, model: ChatCompletionModel) -> Result<(), RagError> {
        let mut models = self.models.write().await;
        match models.get(&model.identifier) {
            Some(existing) if **existing == model => {
                debug!(model = %model.identifier, "model already registered");
                return Ok(());
            }
            Some(_) => warn!(model = %model.identifier, "replacing registered model"),
            None => info!(model = %model.identifier, remote = %model.model, "model registered"),
        }
        models.insert(model.identifier.clone(), Arc::new(model));
        Ok(())
    }

    /// Identifiers of all registered models.
    pub async fn model_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.models.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Runs the optional similarity search, renders the model's prompt with
    /// the retrieved texts and calls the remote chat model.
    ///
    /// # Errors
    /// - [`RagError::UnknownModel`] / [`RagError::UnknownVectorIndex`] for missing registrations
    /// - [`RagError::InvalidProbe`] if the probe lacks the index key
    /// - [`RagError::Qdrant`] / [`RagError::Llm`] for upstream failures
    pub async fn predict(&self, req: PredictRequest) -> Result<Prediction, RagError> {
        let started = Instant::now();
        let model = self
            .models
            .read()
            .await
            .get(&req.model_name)
            .cloned()
            .ok_or_else(|| RagError::UnknownModel(req.model_name.clone()))?;

        let context = match &req.context_select {
            Some(select) => {
                let index = self
                    .indexes
                    .read()
                    .await
                    .get(&select.vector_index)
                    .cloned()
                    .ok_or_else(|| RagError::UnknownVectorIndex(select.vector_index.clone()))?;
                let key = req.context_key.as_deref().unwrap_or(&index.key);
                retrieve::run_select(
                    self.client.as_ref(),
                    select,
                    &index,
                    key,
                    self.cfg.exact_search,
                )
                .await?
            }
            None => Vec::new(),
        };

        let texts: Vec<String> = context.iter().map(|h| h.text.clone()).collect();
        let prompt = model.render(&texts, &req.input);
        debug!(
            model = %model.identifier,
            context_items = texts.len(),
            prompt_len = prompt.len(),
            "prompt rendered"
        );

        let output = self.llm.chat(&model.model, &prompt, None).await?;

        info!(
            model = %model.identifier,
            context_items = context.len(),
            latency_ms = started.elapsed().as_millis(),
            "predict completed"
        );
        Ok(Prediction { output, context })
    }

    /// Returns whether `collection` exists in Qdrant.
    pub async fn collection_exists(&self, collection: &str) -> Result<bool, RagError> {
        self.client.collection_exists(collection).await
    }
}

impl DocumentStore for RagStore {
    fn add(&self, model: ChatCompletionModel) -> BoxFuture<'_, Result<(), RagError>> {
        Box::pin(RagStore::add(self, model))
    }

    fn predict(&self, req: PredictRequest) -> BoxFuture<'_, Result<Prediction, RagError>> {
        Box::pin(RagStore::predict(self, req))
    }

    fn collection_exists<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<bool, RagError>> {
        Box::pin(RagStore::collection_exists(self, collection))
    }
}
