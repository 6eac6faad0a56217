/// LLM client: the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the generative-language API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: gemini-2.5-pro (fixed, not configurable)
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1/models";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-pro";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("No candidates in response")]
    NoCandidates,

    #[error("Response was cut off due to token limit")]
    Truncated,

    #[error("Response incomplete. Finish reason: {0}")]
    Incomplete(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

// reqwest errors print the request URL. Strip it before the error reaches logs or
// the usage ledger.
impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Http(e.without_url())
    }
}

/// Sampling settings for one call.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
    /// Some models return text directly on the content object.
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Text produced by one call and the tokens it consumed (prompt + candidates).
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: u32,
}

impl GenerateResponse {
    fn into_completion(self) -> Result<Completion, LlmError> {
        let tokens_used = self
            .usage_metadata
            .map(|u| u.prompt_token_count.saturating_add(u.candidates_token_count))
            .unwrap_or(0);

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(LlmError::NoCandidates)?;

        match candidate.finish_reason.as_deref() {
            Some("MAX_TOKENS") => return Err(LlmError::Truncated),
            Some(reason) if reason != "STOP" => {
                return Err(LlmError::Incomplete(reason.to_string()))
            }
            _ => {}
        }

        let content = candidate.content.ok_or(LlmError::EmptyContent)?;
        let text = match content.parts.into_iter().next() {
            Some(part) => part.text,
            None => content.text,
        }
        .filter(|t| !t.is_empty())
        .ok_or(LlmError::EmptyContent)?;

        Ok(Completion { text, tokens_used })
    }
}

/// The single LLM client used by all services.
/// Wraps the Gemini `generateContent` endpoint with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, GEMINI_API_BASE.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
            base_url,
        })
    }

    /// Makes a raw call to Gemini, returning the text and token usage.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn generate(
        &self,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<Completion, LlmError> {
        let url = format!("{}/{}:generateContent", self.base_url, MODEL);
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: config,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(e.into());
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GeminiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let completion = response.json::<GenerateResponse>().await?.into_completion()?;

            debug!("LLM call succeeded: tokens_used={}", completion.tokens_used);

            return Ok(completion);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the LLM and deserializes the text response as JSON, returning the value
    /// with the tokens consumed. The prompt must instruct the model to return JSON.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        config: GenerationConfig,
    ) -> Result<(T, u32), LlmError> {
        let completion = self.generate(prompt, config).await?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&completion.text);

        let value = serde_json::from_str(text)?;
        Ok((value, completion.tokens_used))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
