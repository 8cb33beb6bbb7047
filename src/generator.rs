//! The text-generation capability the recipe service depends on.
//!
//! The service only needs `generate(prompt) -> text`; everything model
//! specific lives behind this trait so the response parser can be exercised
//! against canned text.

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("Malformed model response: {0}")]
    Malformed(String),
    #[error("No text content found in response")]
    NoText,
}

#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    /// Send one prompt to the model and return its raw text output.
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;

    fn model_name(&self) -> &str;
}

/// Canned generator for tests and offline runs. Records every prompt it sees.
#[derive(Debug)]
pub struct FakeGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(text: impl Into<String>) -> Self {
        Self { reply: Ok(text.into()), prompts: Mutex::new(Vec::new()) }
    }

    /// Every call fails with `GeneratorError::Http(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { reply: Err(message.into()), prompts: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl RecipeGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        self.prompts.lock().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(GeneratorError::Http(message.clone())),
        }
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}
