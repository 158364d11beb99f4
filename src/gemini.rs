//! Minimal client for the Gemini `generateContent` endpoint.
//!
//! The response text is returned untouched; callers decide what to do with it.

use crate::problem::Problem;
use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum GeminiModel {
    #[default]
    #[strum(serialize = "gemini-2.5-flash")]
    Gemini25Flash,
    #[strum(serialize = "gemini-2.5-pro")]
    Gemini25Pro,
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini20Flash,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
    temperature: Option<f32>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: GeminiModel) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model,
            base_url: GEMINI_API_BASE.to_string(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Sends `prompt` as a single user turn and returns the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::new(prompt, self.temperature);
        let url = self.endpoint();
        debug!(%url, prompt_len = prompt.len(), "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("Gemini API error ({status}): {error_text}");
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        body.into_text()
    }

    pub async fn request_hints(&self, problem: &Problem) -> Result<String> {
        let prompt = problem.prompt()?;
        info!(model = %self.model, id = problem.id, "requesting hints");
        self.generate(&prompt).await
    }
}

impl GenerateContentRequest {
    fn new(prompt: &str, temperature: Option<f32>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
        }
    }
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => bail!("Gemini blocked the prompt: {reason}"),
                None => bail!("Gemini returned no candidates"),
            }
        };

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            bail!("Gemini returned an empty candidate (finish reason: {reason})");
        }

        Ok(text)
    }
}
