// Prompt templates for the application-form assists.

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, PLAIN_TEXT_INSTRUCTION};

/// Resume extraction prompt. Replace `{json_only}` and `{resume_text}` before sending.
const RESUME_EXTRACT_TEMPLATE: &str = r#"You are a resume parser. Extract structured information from the following resume text.

{json_only}
The JSON must match this exact schema:
{
  "fullName": "string or null",
  "email": "string or null",
  "phone": "string or null",
  "location": "string or null",
  "currentPosition": "string or null",
  "company": "string or null",
  "yearsExperience": number or null,
  "keyAchievements": "string or null",
  "primarySkills": "string or null",
  "programmingLanguages": "string or null",
  "frameworks": "string or null"
}

If any field cannot be found, use null for that field.
For keyAchievements, extract 2-3 key accomplishments from the resume.
For primarySkills, extract the main technical skills mentioned.
For programmingLanguages, list the programming languages mentioned (comma-separated).
For frameworks, list frameworks/libraries mentioned (comma-separated).

Resume text:
{resume_text}"#;

/// Text improvement prompt. Replace `{plain_text}`, `{text}` and `{field_name}` before sending.
const IMPROVE_TEXT_TEMPLATE: &str = r#"You are a professional career coach. Improve the following text to be more professional and compelling for a job application.

Keep the core meaning but make it more impactful. Use strong action verbs and quantify achievements where possible.
{plain_text}

Original text:
{text}

Context: This is for the "{field_name}" field in a job application."#;

pub fn resume_extract_prompt(resume_text: &str) -> String {
    RESUME_EXTRACT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{resume_text}", resume_text)
}

pub fn improve_text_prompt(text: &str, field_name: &str) -> String {
    IMPROVE_TEXT_TEMPLATE
        .replace("{plain_text}", PLAIN_TEXT_INSTRUCTION)
        .replace("{field_name}", field_name)
        .replace("{text}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_prompt_embeds_text_and_schema() {
        let p = resume_extract_prompt("Jane Doe, Staff Engineer at Acme");
        assert!(p.ends_with("Jane Doe, Staff Engineer at Acme"));
        assert!(p.contains("\"yearsExperience\": number or null"));
        assert!(p.contains(JSON_ONLY_INSTRUCTION));
        assert!(!p.contains("{resume_text}"));
    }

    #[test]
    fn test_improve_prompt_names_the_field() {
        let p = improve_text_prompt("I did backend stuff", "keyAchievements");
        assert!(p.contains("Original text:\nI did backend stuff"));
        assert!(p.contains("the \"keyAchievements\" field"));
    }

    #[test]
    fn test_improve_prompt_does_not_expand_placeholders_inside_user_text() {
        let p = improve_text_prompt("literal {field_name} here", "whyInterested");
        assert!(p.contains("literal {field_name} here"));
    }
}
