//! Delegation of queries to the external generation service.
//!
//! The relay never interprets a question itself. It shapes the prompt,
//! hands it to a [`Delegate`], and cleans up whatever text comes back.

mod gemini;
mod imaging;

pub use gemini::GeminiDelegate;
pub use imaging::prepare_image;

use async_trait::async_trait;
use nova_common::RelayError;

/// Input accepted by the delegate service
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// Plain question text
    Text(String),
    /// PNG image plus the instruction to apply to it
    Image { png: Vec<u8>, instruction: String },
}

impl Prompt {
    /// Length of the text part, for logging
    pub fn text_len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Image { instruction, .. } => instruction.len(),
        }
    }
}

/// An external text/image generation service
#[async_trait]
pub trait Delegate: Send + Sync {
    /// Raw generated text. Any upstream fault is `RelayError::Upstream`.
    async fn generate(&self, prompt: Prompt) -> Result<String, RelayError>;
}

/// Run a prompt through the delegate and normalize the answer
pub async fn ask(delegate: &dyn Delegate, prompt: Prompt) -> Result<String, RelayError> {
    let prompt_len = prompt.text_len();
    let raw = delegate.generate(prompt).await?;
    let answer = normalize_whitespace(&raw);

    tracing::info!(prompt_len, answer_len = answer.len(), "Generated response");

    Ok(answer)
}

/// Prefix a question with stored article text, if any
pub fn with_article(question: &str, article: Option<&str>) -> String {
    match article {
        Some(article) if !article.is_empty() => format!("{}\n\n{}", article, question),
        _ => question.to_string(),
    }
}

/// Collapse whitespace runs to one space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
