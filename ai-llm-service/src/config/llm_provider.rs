/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// Only OpenAI-compatible REST APIs are supported. Any gateway that speaks
/// `/v1/chat/completions` and `/v1/embeddings` (Azure proxies, vLLM, LiteLLM)
/// can be targeted by pointing the endpoint at it.
///
/// Adding more providers in the future can be done by extending this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// OpenAI's chat completion and embeddings API.
    OpenAI,
}
