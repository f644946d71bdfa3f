//! Similarity-search queries.
//!
//! ```
//! use rag_store::{Collection, Document};
//!
//! let select = Collection::new("questiondocs")
//!     .like(Document::new().with("txt", "How do I create a VectorIndex?"), "my-index", 5)
//!     .find();
//! assert_eq!(select.n, 5);
//! ```

use crate::record::Document;

/// Handle naming a collection of document chunks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    name: String,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nearest neighbours of `probe` under `vector_index`, limited to `n`.
    pub fn like(&self, probe: Document, vector_index: impl Into<String>, n: u64) -> Like {
        Like {
            collection: self.name.clone(),
            probe,
            vector_index: vector_index.into(),
            n,
        }
    }
}

/// Pending similarity query; turn it into a [`Select`] with [`Like::find`].
#[derive(Clone, Debug, PartialEq)]
pub struct Like {
    collection: String,
    probe: Document,
    vector_index: String,
    n: u64,
}

impl Like {
    pub fn find(self) -> Select {
        Select {
            collection: self.collection,
            probe: self.probe,
            vector_index: self.vector_index,
            n: self.n,
        }
    }
}

/// Executable similarity search over one collection.
#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    pub collection: String,
    pub probe: Document,
    pub vector_index: String,
    pub n: u64,
}
