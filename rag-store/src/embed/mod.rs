use std::sync::Arc;

use ai_llm_service::OpenAiService;
use futures::future::BoxFuture;

use crate::errors::RagError;

/// Provider interface for embedding generation.
///
/// Async is required because real providers perform HTTP requests.
/// Implement this trait to plug in another embedding backend.
pub trait EmbeddingsProvider: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>>;
}

/// Embeds through the OpenAI `/v1/embeddings` endpoint with a fixed model.
pub struct OpenAiEmbedder {
    llm: Arc<OpenAiService>,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(llm: Arc<OpenAiService>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }
}

impl EmbeddingsProvider for OpenAiEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async move { Ok(self.llm.embed(&self.model, text).await?) })
    }
}
