//! Default LLM configs loaded strictly from environment variables.
//!
//! Two roles are provided for the OpenAI provider:
//!
//! - **Chat**      → chat completion model answering questions
//! - **Embedding** → embedding generator used by vector indexes
//!
//! # Environment variables
//!
//! - `OPENAI_API_KEY`   = API key (mandatory)
//! - `OPENAI_BASE_URL`  = API base URL (default `https://api.openai.com`)
//! - `CHAT_MODEL`       = chat model (default `gpt-3.5-turbo`)
//! - `EMBEDDING_MODEL`  = embedding model (default `text-embedding-ada-002`)
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TEMPERATURE`  = optional temperature (0.0..=2.0)
//! - `LLM_TIMEOUT_SECS` = optional HTTP timeout (u64)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, EnvLookup, must_var, opt_f32, opt_u32, opt_u64, opt_var,
        validate_http_endpoint, validate_range_f32,
    },
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

fn openai_endpoint(env: EnvLookup<'_>) -> Result<String, AiLlmError> {
    let url = opt_var(env, "OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into());
    validate_http_endpoint("OPENAI_BASE_URL", url.trim())?;
    Ok(url.trim().to_string())
}

/// Constructs the **chat** config from `env`.
///
/// # Errors
/// - [`crate::error_handler::ConfigError::MissingVar`] if `OPENAI_API_KEY` is missing
/// - [`crate::error_handler::ConfigError::InvalidNumber`] for malformed numeric vars
pub fn config_openai_chat_from(env: EnvLookup<'_>) -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = openai_endpoint(env)?;
    let api_key = must_var(env, "OPENAI_API_KEY")?;
    let model = opt_var(env, "CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.into());
    let max_tokens = opt_u32(env, "LLM_MAX_TOKENS")?;
    let temperature = opt_f32(env, "LLM_TEMPERATURE")?;
    if let Some(t) = temperature {
        validate_range_f32("temperature", t, 0.0, 2.0)?;
    }
    let timeout_secs = opt_u64(env, "LLM_TIMEOUT_SECS")?.or(Some(60));

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens,
        temperature,
        top_p: None,
        timeout_secs,
    })
}

/// Constructs the **embedding** config from `env`.
///
/// Sampling options stay unset; `timeout_secs` is 30.
pub fn config_openai_embedding_from(env: EnvLookup<'_>) -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = openai_endpoint(env)?;
    let api_key = must_var(env, "OPENAI_API_KEY")?;
    let model = opt_var(env, "EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into());

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(30),
    })
}
