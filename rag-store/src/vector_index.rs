//! Vector index definitions.
//!
//! A vector index pairs an identifier (the Qdrant named vector holding the
//! chunk embeddings) with the document field it embeds and the provider used
//! to embed probes at query time.

use std::fmt;
use std::sync::Arc;

use crate::embed::EmbeddingsProvider;

#[derive(Clone)]
pub struct VectorIndex {
    pub identifier: String,
    /// Document field that was embedded, e.g. `txt`.
    pub key: String,
    pub embedder: Arc<dyn EmbeddingsProvider>,
}

impl VectorIndex {
    pub fn new(
        identifier: impl Into<String>,
        key: impl Into<String>,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            key: key.into(),
            embedder,
        }
    }
}

impl fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorIndex")
            .field("identifier", &self.identifier)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
