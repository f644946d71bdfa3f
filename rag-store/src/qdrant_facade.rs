//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind a minimal API,
//! hiding away the verbose builder pattern and keeping the rest of the
//! crate decoupled from `qdrant-client`.

use std::collections::HashMap;

use crate::config::RagConfig;
use crate::errors::RagError;

use futures::future::BoxFuture;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{SearchParamsBuilder, SearchPointsBuilder, Value as QValue};
use tracing::{debug, info};

/// Nearest-neighbour search over a named vector, plus a collection probe.
///
/// [`QdrantFacade`] is the production implementation; `RagStore::with_search`
/// accepts any other source of ranked payloads.
pub trait VectorSearch: Send + Sync {
    /// Returns `(score, payload)` pairs in descending score order.
    fn search<'a>(
        &'a self,
        collection: &'a str,
        vector_name: &'a str,
        vector: Vec<f32>,
        top_k: u64,
        exact: bool,
    ) -> BoxFuture<'a, Result<Vec<(f32, serde_json::Value)>, RagError>>;

    fn collection_exists<'a>(&'a self, collection: &'a str)
    -> BoxFuture<'a, Result<bool, RagError>>;
}

/// A facade over the Qdrant client.
///
/// One instance holds one long-lived gRPC channel; the channel is opened
/// lazily and multiplexes concurrent calls.
pub struct QdrantFacade {
    client: Qdrant,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Supports optional API key authentication. No network I/O happens here.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(cfg.qdrant_url.trim())
            .timeout(cfg.timeout)
            .skip_compatibility_check();
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(url = %cfg.qdrant_url, "Qdrant client configured");
        Ok(Self { client })
    }

    /// Returns whether `collection` exists on the server.
    pub async fn collection_exists(&self, collection: &str) -> Result<bool, RagError> {
        self.client
            .collection_exists(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))
    }

    /// Performs a similarity search against the named vector `vector_name`.
    ///
    /// Returns `(score, payload)` tuples in descending score order.
    pub async fn search(
        &self,
        collection: &str,
        vector_name: &str,
        vector: Vec<f32>,
        top_k: u64,
        exact: bool,
    ) -> Result<Vec<(f32, serde_json::Value)>, RagError> {
        debug!(
            collection,
            vector_name,
            top_k,
            exact,
            "Qdrant search"
        );

        let mut builder = SearchPointsBuilder::new(collection, vector, top_k)
            .vector_name(vector_name)
            .with_payload(true);
        if exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let out: Vec<_> = res
            .result
            .into_iter()
            .map(|r| (r.score, qpayload_to_json(r.payload)))
            .collect();

        debug!(hits = out.len(), "Qdrant search completed");
        Ok(out)
    }
}

impl VectorSearch for QdrantFacade {
    fn search<'a>(
        &'a self,
        collection: &'a str,
        vector_name: &'a str,
        vector: Vec<f32>,
        top_k: u64,
        exact: bool,
    ) -> BoxFuture<'a, Result<Vec<(f32, serde_json::Value)>, RagError>> {
        Box::pin(QdrantFacade::search(
            self,
            collection,
            vector_name,
            vector,
            top_k,
            exact,
        ))
    }

    fn collection_exists<'a>(
        &'a self,
        collection: &'a str,
    ) -> BoxFuture<'a, Result<bool, RagError>> {
        Box::pin(QdrantFacade::collection_exists(self, collection))
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
pub(crate) fn qpayload_to_json(p: HashMap<String, QValue>) -> serde_json::Value {
    serde_json::Value::Object(p.into_iter().map(|(k, v)| (k, qvalue_to_json(v))).collect())
}

fn qvalue_to_json(v: QValue) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    match v.kind {
        Some(K::StringValue(s)) => serde_json::Value::String(s),
        Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
        Some(K::DoubleValue(f)) => serde_json::json!(f),
        Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(K::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(qvalue_to_json).collect())
        }
        Some(K::StructValue(s)) => qpayload_to_json(s.fields),
        Some(K::NullValue(_)) | None => serde_json::Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::value::Kind;
    use qdrant_client::qdrant::{ListValue, Struct};
    use serde_json::json;

    fn v(kind: Kind) -> QValue {
        QValue { kind: Some(kind) }
    }

    #[test]
    fn converts_nested_payloads() {
        let mut inner = HashMap::new();
        inner.insert("line".to_string(), v(Kind::IntegerValue(7)));

        let mut p = HashMap::new();
        p.insert("txt".to_string(), v(Kind::StringValue("VectorIndex".into())));
        p.insert(
            "tags".to_string(),
            v(Kind::ListValue(ListValue {
                values: vec![v(Kind::BoolValue(true)), QValue { kind: None }],
            })),
        );
        p.insert("meta".to_string(), v(Kind::StructValue(Struct { fields: inner })));

        assert_eq!(
            qpayload_to_json(p),
            json!({"txt": "VectorIndex", "tags": [true, null], "meta": {"line": 7}})
        );
    }
}
