//! OpenAI-compatible LLM client shared by the document store and the HTTP API.
//!
//! - [`config`]: model configs built strictly from environment variables
//! - [`services::open_ai_service`]: chat completion and embeddings over REST
//! - [`error_handler`]: unified error type for the crate
//! - [`telemetry`]: crate-scoped `tracing` layer

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use services::open_ai_service::OpenAiService;
