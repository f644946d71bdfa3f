//! Completion-model bindings.
//!
//! A binding pairs a remote chat model with a prompt template. The template
//! carries exactly one `{context}` placeholder; at predict time it is replaced
//! by the retrieved chunk texts joined with newlines and the model input is
//! appended after the rendered template.

use crate::errors::RagError;

/// Placeholder substituted with retrieved context.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// A registered chat completion model with its prompt template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatCompletionModel {
    /// Registry key; defaults to the model id.
    pub identifier: String,
    /// Remote model id, e.g. `gpt-3.5-turbo`.
    pub model: String,
    pub prompt: String,
}

impl ChatCompletionModel {
    /// Builds a binding named after `model`.
    ///
    /// # Errors
    /// [`RagError::InvalidPrompt`] unless `prompt` contains exactly one
    /// `{context}` placeholder; [`RagError::Config`] for an empty model id.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Result<Self, RagError> {
        let model = model.into();
        let prompt = prompt.into();

        if model.trim().is_empty() {
            return Err(RagError::Config("model id must not be empty".into()));
        }
        match prompt.matches(CONTEXT_PLACEHOLDER).count() {
            1 => {}
            0 => {
                return Err(RagError::InvalidPrompt(format!(
                    "template has no {CONTEXT_PLACEHOLDER} placeholder"
                )));
            }
            n => {
                return Err(RagError::InvalidPrompt(format!(
                    "template has {n} {CONTEXT_PLACEHOLDER} placeholders, expected 1"
                )));
            }
        }

        Ok(Self {
            identifier: model.clone(),
            model,
            prompt,
        })
    }

    /// Renders the final prompt: template with context substituted, then `input`.
    pub fn render(&self, context: &[String], input: &str) -> String {
        let mut out = self
            .prompt
            .replacen(CONTEXT_PLACEHOLDER, &context.join("\n"), 1);
        out.push_str(input);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identifier_defaults_to_model() {
        let m = ChatCompletionModel::new("gpt-3.5-turbo", "ctx: {context}\nQ: ").unwrap();
        assert_eq!(m.identifier, "gpt-3.5-turbo");
    }

    #[test]
    fn template_needs_exactly_one_placeholder() {
        assert!(matches!(
            ChatCompletionModel::new("m", "no placeholder"),
            Err(RagError::InvalidPrompt(_))
        ));
        assert!(matches!(
            ChatCompletionModel::new("m", "{context} and {context}"),
            Err(RagError::InvalidPrompt(_))
        ));
        assert!(matches!(
            ChatCompletionModel::new(" ", "{context}"),
            Err(RagError::Config(_))
        ));
    }

    #[test]
    fn render_joins_context_and_appends_input() {
        let m = ChatCompletionModel::new("m", "Snippets:\n{context}\n\nHere's the question:\n").unwrap();
        let ctx = vec!["a VectorIndex".to_string(), "b VectorIndex".to_string()];
        assert_eq!(
            m.render(&ctx, "How?"),
            "Snippets:\na VectorIndex\nb VectorIndex\n\nHere's the question:\nHow?"
        );
    }

    #[test]
    fn render_with_empty_context_keeps_template() {
        let m = ChatCompletionModel::new("m", "[{context}] ").unwrap();
        assert_eq!(m.render(&[], "q"), "[] q");
    }
}
