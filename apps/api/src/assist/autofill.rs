//! Resume autofill: extracts application-form fields from pasted resume text.

use serde::{Deserialize, Serialize};

use crate::assist::prompts::resume_extract_prompt;
use crate::errors::AppError;
use crate::llm_client::{GenerationConfig, LlmClient};

pub const MIN_RESUME_CHARS: usize = 50;
pub const MAX_RESUME_CHARS: usize = 50_000;

const EXTRACT_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.3,
    max_output_tokens: 8192,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutofillRequest {
    pub resume_text: String,
}

impl AutofillRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let len = self.resume_text.chars().count();
        if len < MIN_RESUME_CHARS {
            return Err(AppError::Validation(format!(
                "Resume text must be at least {MIN_RESUME_CHARS} characters"
            )));
        }
        if len > MAX_RESUME_CHARS {
            return Err(AppError::Validation(format!(
                "Resume text must be at most {MAX_RESUME_CHARS} characters"
            )));
        }
        Ok(())
    }
}

/// Form fields recovered from a resume. Anything the model could not find is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedResume {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub current_position: Option<String>,
    pub company: Option<String>,
    pub years_experience: Option<f64>,
    pub key_achievements: Option<String>,
    pub primary_skills: Option<String>,
    pub programming_languages: Option<String>,
    pub frameworks: Option<String>,
}

/// Runs the extraction prompt and returns the parsed fields with the tokens used.
pub async fn extract_resume_data(
    llm: &LlmClient,
    resume_text: &str,
) -> Result<(ExtractedResume, u32), AppError> {
    llm.generate_json::<ExtractedResume>(&resume_extract_prompt(resume_text), EXTRACT_CONFIG)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to extract resume data: {e}")))
}
