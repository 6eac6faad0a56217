//! Text improvement: rewrites one form answer to read more professionally.

use serde::Deserialize;

use crate::assist::prompts::improve_text_prompt;
use crate::errors::AppError;
use crate::llm_client::{GenerationConfig, LlmClient};

pub const MAX_IMPROVE_CHARS: usize = 5_000;

const IMPROVE_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.7,
    max_output_tokens: 8192,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveRequest {
    pub text: String,
    pub field_name: String,
}

impl ImproveRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.text.is_empty() {
            return Err(AppError::Validation("Text is required".to_string()));
        }
        if self.text.chars().count() > MAX_IMPROVE_CHARS {
            return Err(AppError::Validation(format!(
                "Text must be at most {MAX_IMPROVE_CHARS} characters"
            )));
        }
        if self.field_name.is_empty() {
            return Err(AppError::Validation("Field name is required".to_string()));
        }
        Ok(())
    }
}

/// Returns the improved text (trimmed) with the tokens used.
pub async fn improve_text(
    llm: &LlmClient,
    text: &str,
    field_name: &str,
) -> Result<(String, u32), AppError> {
    let completion = llm
        .generate(&improve_text_prompt(text, field_name), IMPROVE_CONFIG)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to improve text: {e}")))?;

    Ok((completion.text.trim().to_string(), completion.tokens_used))
}
