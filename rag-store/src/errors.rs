//! Unified error types for the crate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// Embedding or chat completion failure.
    #[error("llm error: {0}")]
    Llm(#[from] AiLlmError),

    /// `predict` named a model that was never registered.
    #[error("model '{0}' is not registered")]
    UnknownModel(String),

    /// A similarity query named a vector index that was never registered.
    #[error("vector index '{0}' is not registered")]
    UnknownVectorIndex(String),

    /// The probe document lacks the field the vector index embeds.
    #[error("probe document has no string field '{key}' required by vector index '{index}'")]
    InvalidProbe { index: String, key: String },

    /// Prompt template does not have exactly one `{context}` placeholder.
    #[error("invalid prompt template: {0}")]
    InvalidPrompt(String),
}

impl RagError {
    /// `true` when the failure happened in an external system (Qdrant or the
    /// model provider) rather than in local setup.
    pub fn is_upstream(&self) -> bool {
        match self {
            RagError::Qdrant(_) => true,
            RagError::Llm(e) => e.is_upstream(),
            RagError::Config(_)
            | RagError::UnknownModel(_)
            | RagError::UnknownVectorIndex(_)
            | RagError::InvalidProbe { .. }
            | RagError::InvalidPrompt(_) => false,
        }
    }
}
