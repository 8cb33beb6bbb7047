use async_trait::async_trait;
use serde_json::json;
use serde::{Deserialize, de::IgnoredAny};
use reqwest::Client;
use tracing::{info, error, debug};

use crate::generator::{GeneratorError, RecipeGenerator};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent?key={}", self.base_url, self.model, self.api_key)
    }

    fn request_body(prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "responseMimeType": "application/json"
            }
        })
    }
}

#[async_trait]
impl RecipeGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let url = self.endpoint();
        info!("🔗 Making request to: {}", url.replace(&self.api_key, "***"));
        debug!("📤 Prompt ({} chars): {}", prompt.len(), preview(prompt, 200));

        let response = self.client
            .post(&url)
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|e| GeneratorError::Http(e.to_string()))?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| GeneratorError::Http(e.to_string()))?;
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            error!("❌ Gemini API text generation failed with status {}: {}", status, response_text);
            return Err(GeneratorError::Api { status: status.as_u16(), message: api_error_message(&response_text) });
        }

        debug!("📥 Raw Gemini API response: {}", preview(&response_text, 1000));
        extract_text(&response_text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn preview(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...[{} chars total]", &s[..idx], s.len()),
        None => s.to_string(),
    }
}

/// Pulls `error.message` out of a Gemini error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<GeminiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Concatenates the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String, GeneratorError> {
    let parsed: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| GeneratorError::Malformed(format!("Failed to parse response: {}", e)))?;

    let candidate = parsed.candidates.into_iter().next().ok_or(GeneratorError::NoText)?;
    let text: String = candidate.content.parts.into_iter()
        .filter_map(|p| match p { Part::Text { text } => Some(text), Part::Other(_) => None })
        .collect();

    if text.is_empty() { Err(GeneratorError::NoText) } else { Ok(text) }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody { error: GeminiErrorDetail }

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail { message: String }
