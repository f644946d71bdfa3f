//! The completion-model binding answering documentation questions.

use rag_store::{ChatCompletionModel, DocumentStore, RagError};
use tracing::info;

/// Prompt sent to the chat model; `{context}` receives the retrieved snippets
/// and the user's question is appended after the last line.
pub const PROMPT_TEMPLATE: &str = "Use the following description and code snippets about SuperDuperDB to answer this question about SuperDuperDB\n\
Do not use any other information you might have learned about other python packages\n\
Only base your answer on the code snippets retrieved and provide a very concise answer\n\
{context}\n\n\
Here's the question:\n";

/// Builds the binding for `model_identifier` and registers it in `store`.
///
/// Returns the name under which the binding is registered.
pub async fn register_completion_model(
    store: &dyn DocumentStore,
    model_identifier: &str,
    prompt_template: &str,
) -> Result<String, RagError> {
    let model = ChatCompletionModel::new(model_identifier, prompt_template)?;
    let name = model.identifier.clone();
    store.add(model).await?;
    info!(model = %name, "completion model binding registered");
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_a_valid_binding() {
        let m = ChatCompletionModel::new("gpt-3.5-turbo", PROMPT_TEMPLATE).unwrap();
        let rendered = m.render(&["snippet".into()], "How?");
        assert!(rendered.contains("concise answer\nsnippet\n\nHere's the question:\nHow?"));
    }
}
