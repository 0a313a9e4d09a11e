//! finrag-llm
//!
//! Client for the Gemini `generateContent` endpoint.
//!
//! The API key is optional at construction: a missing key only surfaces as
//! [`LlmError::MissingApiKey`] when a prompt is actually sent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use finrag_core::config::LlmSettings;
use finrag_core::traits::TextGenerator;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("request to {model} failed: {source}")]
    Http { model: String, #[source] source: reqwest::Error },

    #[error("{model} returned {status}: {message}")]
    Api { model: String, status: u16, message: String },

    #[error("{model} returned no text ({reason})")]
    EmptyResponse { model: String, reason: String },
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub role: &'static str,
    pub parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RequestPart<'a> {
    pub text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn from_prompt(prompt: &'a str) -> Self {
        Self { contents: vec![Content { role: "user", parts: vec![RequestPart { text: prompt }] }] }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None } else { Some(text)
        }
    }

    fn empty_reason(&self) -> String {
        if let Some(reason) = self.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref()) {
            return format!("blocked: {reason}");
        }
        match self.candidates.first() {
            Some(c) => c.finish_reason.clone().unwrap_or_else(|| "empty candidate".to_string()),
            None => "no candidates".to_string(),
        }
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(settings: &LlmSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    pub async fn generate_content(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let http_err = |source| LlmError::Http { model: self.model.clone(), source };
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "generateContent");
        let response = self.http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            tracing::warn!(model = %self.model, status = status.as_u16(), "generateContent failed");
            return Err(LlmError::Api { model: self.model.clone(), status: status.as_u16(), message });
        }
        let body: GenerateContentResponse = response.json().await.map_err(http_err)?;
        body.text().ok_or_else(|| LlmError::EmptyResponse { model: self.model.clone(), reason: body.empty_reason() })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        Ok(self.generate_content(prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shape() {
        let req = GenerateContentRequest::from_prompt("hello");
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]}));
    }

    #[test]
    fn text_joins_parts_of_first_candidate() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"File "},{"text":"online."}]},"finishReason":"STOP"},
                       {"content":{"parts":[{"text":"ignored"}]}}]}"#;
        let resp: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.text().as_deref(), Some("File online."));
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let resp: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert!(resp.text().is_none());
        assert_eq!(resp.empty_reason(), "blocked: SAFETY");
    }
}
