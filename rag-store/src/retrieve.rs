//! Retrieval helpers: run a [`Select`] and shape the hits into prompt context.

use crate::errors::RagError;
use crate::qdrant_facade::VectorSearch;
use crate::query::Select;
use crate::record::RagHit;
use crate::vector_index::VectorIndex;

use tracing::{trace, warn};

/// Reads the probe text the vector index embeds.
///
/// # Errors
/// [`RagError::InvalidProbe`] when the probe lacks `index.key` as a string.
pub(crate) fn probe_text<'a>(select: &'a Select, index: &VectorIndex) -> Result<&'a str, RagError> {
    select
        .probe
        .get_str(&index.key)
        .ok_or_else(|| RagError::InvalidProbe {
            index: index.identifier.clone(),
            key: index.key.clone(),
        })
}

/// Embeds the probe and returns the top `select.n` hits, reading `context_key`
/// from each payload.
///
/// # Errors
/// Returns embedding/provider errors or Qdrant failures.
pub(crate) async fn run_select(
    client: &dyn VectorSearch,
    select: &Select,
    index: &VectorIndex,
    context_key: &str,
    exact: bool,
) -> Result<Vec<RagHit>, RagError> {
    let probe = probe_text(select, index)?;
    trace!(
        collection = %select.collection,
        index = %index.identifier,
        n = select.n,
        probe_len = probe.len(),
        "retrieve::run_select"
    );

    let qv = index.embedder.embed(probe).await?;
    let hits = client
        .search(&select.collection, &index.identifier, qv, select.n, exact)
        .await?;

    Ok(hits_with_key(hits, context_key))
}

/// Keeps rank order; hits without a string `context_key` are dropped.
pub(crate) fn hits_with_key(
    hits: Vec<(f32, serde_json::Value)>,
    context_key: &str,
) -> Vec<RagHit> {
    let mut out = Vec::with_capacity(hits.len());
    for (score, payload) in hits {
        match payload.get(context_key).and_then(|v| v.as_str()) {
            Some(text) => out.push(RagHit {
                score,
                text: text.to_string(),
                payload,
            }),
            None => warn!(context_key, score, "retrieved chunk has no context field, skipped"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::EmbeddingsProvider;
    use crate::query::Collection;
    use crate::record::Document;
    use futures::future::BoxFuture;
    use serde_json::json;
    use std::sync::Arc;

    struct Fixed;

    impl EmbeddingsProvider for Fixed {
        fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
            Box::pin(async { Ok(vec![1.0]) })
        }
    }

    fn index() -> VectorIndex {
        VectorIndex::new("my-index", "txt", Arc::new(Fixed))
    }

    #[test]
    fn probe_must_carry_index_key() {
        let ok = Collection::new("c")
            .like(Document::new().with("txt", "q"), "my-index", 5)
            .find();
        assert_eq!(probe_text(&ok, &index()).unwrap(), "q");

        let bad = Collection::new("c")
            .like(Document::new().with("body", "q"), "my-index", 5)
            .find();
        assert!(matches!(
            probe_text(&bad, &index()),
            Err(RagError::InvalidProbe { .. })
        ));
    }

    #[test]
    fn hits_keep_rank_order_and_skip_missing_fields() {
        let hits = vec![
            (0.9, json!({"txt": "first"})),
            (0.8, json!({"other": "x"})),
            (0.7, json!({"txt": "third"})),
        ];
        let out = hits_with_key(hits, "txt");
        let texts: Vec<_> = out.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "third"]);
        assert_eq!(out[1].score, 0.7);
    }
}
