//! Runtime configuration for the document store connection.

use std::time::Duration;

use crate::errors::RagError;

/// Connection settings for the vector-capable document store (Qdrant).
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`. This is the
    /// document-store connection string.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
    /// Per-call timeout applied by the Qdrant client.
    pub timeout: Duration,
}

impl RagConfig {
    /// Creates a sane default config for a Qdrant endpoint.
    pub fn new_default(url: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            exact_search: false,
            timeout: Duration::from_secs(30),
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        let url = self.qdrant_url.trim();
        if url.is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RagError::Config(
                "qdrant_url must start with http:// or https://".into(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(RagError::Config("timeout must be > 0".into()));
        }
        Ok(())
    }
}
