use std::{sync::Arc, time::Duration};

use ai_llm_service::{
    AiLlmError, LlmModelConfig,
    config::default_config::{config_openai_chat_from, config_openai_embedding_from},
    error_handler::{EnvLookup, opt_var, process_env},
};
use rag_store::{DocumentStore, RagConfig};
use thiserror::Error;

/// Documentation site every answer is attributed to.
pub const DOCS_SOURCE_URL: &str = "https://docs.superduperdb.com";

/// Errors raised while reading startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value in {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(transparent)]
    Llm(#[from] AiLlmError),
}

/// Process configuration, read once at startup.
///
/// # Environment variables
/// - `QDRANT_URL` (required) document-store connection string
/// - `QDRANT_API_KEY` (optional)
/// - `QDRANT_EXACT_SEARCH` (optional, `true`/`false`)
/// - `OPENAI_API_KEY` (required) plus the optional `ai-llm-service` knobs
/// - `API_ADDRESS` (default `0.0.0.0:8000`)
/// - `QUERY_TIMEOUT_SECS` (default 120)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_address: String,
    pub rag: RagConfig,
    pub chat: LlmModelConfig,
    pub embedding: LlmModelConfig,
    pub query_timeout: Duration,
}

impl AppConfig {
    /// Loads config from the process environment, failing fast on missing secrets.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(env: EnvLookup<'_>) -> Result<Self, ConfigError> {
        let qdrant_url = opt_var(env, "QDRANT_URL").ok_or(ConfigError::MissingVar("QDRANT_URL"))?;

        let mut rag = RagConfig::new_default(qdrant_url.trim());
        rag.qdrant_api_key = opt_var(env, "QDRANT_API_KEY");
        rag.exact_search = match opt_var(env, "QDRANT_EXACT_SEARCH").as_deref().map(str::trim) {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "QDRANT_EXACT_SEARCH",
                    reason: format!("expected true/false, got {other:?}"),
                });
            }
        };
        rag.validate().map_err(|e| ConfigError::Invalid {
            var: "QDRANT_URL",
            reason: e.to_string(),
        })?;

        let query_timeout = match opt_var(env, "QUERY_TIMEOUT_SECS") {
            Some(v) => match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "QUERY_TIMEOUT_SECS",
                        reason: "expected a positive integer".into(),
                    });
                }
            },
            None => Duration::from_secs(120),
        };

        Ok(Self {
            api_address: opt_var(env, "API_ADDRESS").unwrap_or_else(|| "0.0.0.0:8000".into()),
            rag,
            chat: config_openai_chat_from(env)?,
            embedding: config_openai_embedding_from(env)?,
            query_timeout,
        })
    }
}

/// Fixed similarity-search parameters of the `/query` pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub collection: String,
    pub vector_index: String,
    pub top_k: u64,
    /// Field used both as the probe key and as the context field.
    pub key: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            collection: "questiondocs".into(),
            vector_index: "my-index".into(),
            top_k: 5,
            key: "txt".into(),
        }
    }
}

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Document store handle (retrieval + generation).
    pub store: Arc<dyn DocumentStore>,
    /// Identifier of the completion model registered at startup.
    pub model_name: String,
    pub search: SearchSettings,
    /// Returned verbatim with every answer; not derived from retrieved chunks.
    pub source_urls: Vec<String>,
    /// Upper bound for one retrieval + generation call.
    pub query_timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn loads_with_defaults() {
        let lookup = env(&[
            ("QDRANT_URL", "http://localhost:6334"),
            ("OPENAI_API_KEY", "sk-test"),
        ]);
        let cfg = AppConfig::from_lookup(&lookup).unwrap();
        assert_eq!(cfg.api_address, "0.0.0.0:8000");
        assert_eq!(cfg.query_timeout, Duration::from_secs(120));
        assert_eq!(cfg.chat.model, "gpt-3.5-turbo");
        assert_eq!(cfg.embedding.model, "text-embedding-ada-002");
        assert!(!cfg.rag.exact_search);
    }

    #[test]
    fn missing_store_url_fails_fast() {
        let lookup = env(&[("OPENAI_API_KEY", "sk-test")]);
        assert!(matches!(
            AppConfig::from_lookup(&lookup),
            Err(ConfigError::MissingVar("QDRANT_URL"))
        ));
    }

    #[test]
    fn missing_llm_key_fails_fast() {
        let lookup = env(&[("QDRANT_URL", "http://localhost:6334")]);
        assert!(matches!(
            AppConfig::from_lookup(&lookup),
            Err(ConfigError::Llm(_))
        ));
    }

    #[test]
    fn rejects_bad_timeout_and_flag() {
        let lookup = env(&[
            ("QDRANT_URL", "http://localhost:6334"),
            ("OPENAI_API_KEY", "sk-test"),
            ("QUERY_TIMEOUT_SECS", "0"),
        ]);
        assert!(AppConfig::from_lookup(&lookup).is_err());

        let lookup = env(&[
            ("QDRANT_URL", "http://localhost:6334"),
            ("OPENAI_API_KEY", "sk-test"),
            ("QDRANT_EXACT_SEARCH", "maybe"),
        ]);
        assert!(AppConfig::from_lookup(&lookup).is_err());
    }
}
