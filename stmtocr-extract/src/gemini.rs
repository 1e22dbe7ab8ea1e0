//! Extraction client for the Gemini `generateContent` endpoint.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stmtocr_core::Transaction;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::prompt::{EXTRACTION_PROMPT, response_schema};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Turns an encoded statement into transaction rows.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, payload: &str, mime_type: &str) -> Result<Vec<Transaction>, PipelineError>;
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Checked at call time; `None` fails each extraction with a config error.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ExtractionConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    temperature: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect::<String>())
            .unwrap_or_default()
    }
}

pub struct GeminiExtractor {
    config: ExtractionConfig,
    client: reqwest::Client,
}

impl GeminiExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    async fn extract(&self, payload: &str, mime_type: &str) -> Result<Vec<Transaction>, PipelineError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(PipelineError::missing_api_key)?;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type,
                            data: payload,
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(EXTRACTION_PROMPT),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                temperature: self.config.temperature,
            },
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(key).map_err(|e| PipelineError::Config(format!("invalid API key: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        info!(model = %self.config.model, mime_type, "requesting extraction");
        let resp = self
            .client
            .post(self.config.endpoint())
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Extraction(format!("extraction request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(PipelineError::Extraction(error_message(status, &txt)));
        }

        let out: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| PipelineError::Extraction(format!("failed to parse extraction response: {e}")))?;

        let text = out.text();
        debug!(len = text.len(), "extraction response text");
        parse_transactions(&text)
    }
}

/// Parse the model's JSON text. Blank text means nothing was found.
pub fn parse_transactions(text: &str) -> Result<Vec<Transaction>, PipelineError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text)
        .map_err(|e| PipelineError::Extraction(format!("malformed transaction JSON: {e}")))
}

/// Prefer the service's own `error.message` when the body carries one.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    if detail.is_empty() {
        format!("extraction service error: {status}")
    } else {
        format!("extraction service error: {status} {detail}")
    }
}
