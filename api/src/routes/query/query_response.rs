use serde::{Deserialize, Serialize};

/// Response payload for /query.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResponse {
    /// Model answer (plain text).
    pub answer: String,
    /// Fixed documentation links; independent of the retrieved chunks.
    pub source_urls: Vec<String>,
}
