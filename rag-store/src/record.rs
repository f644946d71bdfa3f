//! Core data models used by the library.

use serde::Serialize;
use serde_json::{Map, Value};

/// A JSON document used as a similarity-search probe, e.g. `{"txt": "..."}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the field as a string slice when present and a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A single retrieval hit: score, extracted context text and the raw payload.
#[derive(Clone, Debug, Serialize)]
pub struct RagHit {
    pub score: f32,
    pub text: String,
    pub payload: Value,
}

/// Input of [`crate::DocumentStore::predict`].
#[derive(Clone, Debug)]
pub struct PredictRequest {
    /// Identifier of a registered completion model.
    pub model_name: String,
    /// Model input; appended to the rendered prompt.
    pub input: String,
    /// Similarity search whose results become the prompt context.
    pub context_select: Option<crate::Select>,
    /// Payload field read from each retrieved chunk.
    pub context_key: Option<String>,
}

/// Output of [`crate::DocumentStore::predict`].
#[derive(Clone, Debug)]
pub struct Prediction {
    pub output: String,
    /// Retrieved chunks in rank order, as substituted into the prompt.
    pub context: Vec<RagHit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_str_ignores_non_string_values() {
        let doc = Document::new().with("txt", "hello").with("n", 3);
        assert_eq!(doc.get_str("txt"), Some("hello"));
        assert_eq!(doc.get_str("n"), None);
        assert_eq!(doc.get_str("missing"), None);
    }
}
