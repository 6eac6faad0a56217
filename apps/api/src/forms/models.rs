use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Number of wizard steps; step 5 is the review page.
pub const FORM_STEPS: i32 = 5;

/// Partially filled application, as saved between wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    // Step 1: personal information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    // Step 2: work experience
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_achievements: Option<String>,

    // Step 3: technical skills
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub programming_languages: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frameworks: Option<String>,

    // Step 4: motivation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_interested: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_salary: Option<String>,
}

/// A finished application. Every field except `expected_salary` must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteFormData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub current_position: String,
    pub company: String,
    pub years_experience: f64,
    pub key_achievements: String,
    pub primary_skills: String,
    pub programming_languages: String,
    pub frameworks: String,
    pub why_interested: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_salary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FormProgressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub form_data: Value,
    pub current_step: i32,
    pub last_saved_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FormSubmissionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub form_data: Value,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_form_omits_unset_fields() {
        let data = FormData {
            full_name: Some("Ada Lovelace".to_string()),
            years_experience: Some(7.5),
            ..FormData::default()
        };
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({ "fullName": "Ada Lovelace", "yearsExperience": 7.5 })
        );
    }

    #[test]
    fn test_complete_form_requires_every_step() {
        let missing_motivation = json!({
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "+44 20 7946 0000",
            "location": "London",
            "currentPosition": "Analyst",
            "company": "Analytical Engines Ltd",
            "yearsExperience": 7,
            "keyAchievements": "Wrote the first published algorithm",
            "primarySkills": "Mathematics, notation design",
            "programmingLanguages": "Note G",
            "frameworks": "Difference Engine"
        });
        assert!(serde_json::from_value::<CompleteFormData>(missing_motivation.clone()).is_err());

        let mut complete = missing_motivation;
        complete["whyInterested"] = json!("I want to build general-purpose machines.");
        complete["startDate"] = json!("2025-09-01");
        let form: CompleteFormData = serde_json::from_value(complete).unwrap();
        assert_eq!(form.expected_salary, None);
    }
}
