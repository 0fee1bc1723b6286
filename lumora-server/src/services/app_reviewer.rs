//! AI app reviews
//!
//! Builds the reviewer prompt for an app and turns the model reply into
//! ratings the marketplace accepts.

use lumora_common::db::App;
use lumora_common::scoring::{is_category, Ratings, MAX_RATING, MIN_RATING};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::llm::{ChatMessage, ChatModel, ChatRequest, LlmError};
use super::reply_parser::{null_as_default, number_from_value, parse_reply};

const SYSTEM_PROMPT: &str = "You are an expert app reviewer with deep experience in UI/UX design, \
software engineering, and product management. Analyze the app based on the provided information \
and give honest, constructive feedback. Rate each category from 1-10 where 1 is poor and 10 is \
exceptional. Provide specific, actionable suggestions. Always respond with valid JSON only.";

const RESPONSE_SCHEMA: &str = r#"Respond with a JSON object (no markdown, just raw JSON) with this exact structure:
{
  "ratings": {
    "uiDesign": <1-10>,
    "uxFlow": <1-10>,
    "performance": <1-10>,
    "functionality": <1-10>,
    "innovation": <1-10>,
    "overall": <1-10>
  },
  "feedback": "<detailed feedback paragraph>",
  "suggestions": ["<suggestion 1>", "<suggestion 2>", "<suggestion 3>"]
}"#;

pub const DEFAULT_FEEDBACK: &str = "AI review generated.";

/// Review content ready to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReview {
    pub ratings: Ratings,
    pub feedback: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReviewReply {
    #[serde(deserialize_with = "null_as_default")]
    ratings: BTreeMap<String, serde_json::Value>,
    feedback: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    suggestions: Vec<serde_json::Value>,
}

/// Build the user prompt describing `app`
pub fn build_prompt(app: &App) -> String {
    let mut prompt = String::from("Please review the following app:\n\n");
    prompt.push_str(&format!("Name: {}\n", app.name));
    prompt.push_str(&format!("Description: {}\n", app.description));

    if let Some(url) = app.url.as_deref() {
        prompt.push_str(&format!("URL: {}\n", url));
    }
    if let Some(audience) = app.target_audience.as_deref() {
        prompt.push_str(&format!("Target Audience: {}\n", audience));
    }

    if !app.questions.is_empty() {
        prompt.push_str("\nSpecific questions from the developer:\n");
        for (i, question) in app.questions.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, question));
        }
    }

    if !app.screenshots.is_empty() {
        prompt.push_str(&format!(
            "\nScreenshots provided: {} screenshot(s)\n",
            app.screenshots.len()
        ));
    }

    prompt.push('\n');
    prompt.push_str(RESPONSE_SCHEMA);
    prompt
}

/// Ask the model to review `app`
pub async fn generate_review(model: &dyn ChatModel, app: &App) -> Result<GeneratedReview, LlmError> {
    let request = ChatRequest::new(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_prompt(app)),
    ])
    .temperature(0.7);

    let reply = model.complete(request).await?;
    debug!(app_id = %app.id, reply_len = reply.len(), "AI review reply received");

    parse_review(&reply)
}

/// Parse and sanitize a reviewer reply
///
/// Unknown categories and non-numeric values are dropped (numeric strings
/// count as numbers); values are clamped into the rating range.
pub fn parse_review(reply: &str) -> Result<GeneratedReview, LlmError> {
    let parsed: ReviewReply = parse_reply(reply).map_err(|e| LlmError::Malformed(e.to_string()))?;

    let ratings = parsed
        .ratings
        .into_iter()
        .filter(|(key, _)| is_category(key))
        .filter_map(|(key, value)| {
            number_from_value(&value).map(|v| (key, v.clamp(MIN_RATING, MAX_RATING)))
        })
        .collect();

    let feedback = parsed
        .feedback
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string());

    let suggestions = parsed
        .suggestions
        .into_iter()
        .filter_map(|s| s.as_str().map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect();

    Ok(GeneratedReview { ratings, feedback, suggestions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lumora_common::db::AppStatus;
    use sqlx::types::Json;

    fn sample_app() -> App {
        let now = Utc::now();
        App {
            id: "app-1".to_string(),
            name: "Taskly".to_string(),
            description: "A to-do list".to_string(),
            url: Some("https://taskly.example".to_string()),
            target_audience: None,
            questions: Json(vec!["Is onboarding clear?".to_string(), "Too many colors?".to_string()]),
            screenshots: Json(vec!["https://taskly.example/s.png".to_string()]),
            status: AppStatus::Draft,
            user_id: "u1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_prompt_contents() {
        let prompt = build_prompt(&sample_app());
        assert!(prompt.contains("Name: Taskly"));
        assert!(prompt.contains("URL: https://taskly.example"));
        assert!(!prompt.contains("Target Audience"));
        assert!(prompt.contains("1. Is onboarding clear?"));
        assert!(prompt.contains("2. Too many colors?"));
        assert!(prompt.contains("Screenshots provided: 1 screenshot(s)"));
        assert!(prompt.contains("\"uiDesign\": <1-10>"));
    }

    #[test]
    fn test_parse_clamps_and_filters() {
        let reply = r#"```json
{"ratings": {"uiDesign": 12, "uxFlow": 0, "performance": 7.5, "vibes": 9, "innovation": "high"},
 "feedback": "Solid", "suggestions": ["Add dark mode", 3, ""]}
```"#;
        let review = parse_review(reply).unwrap();

        assert_eq!(review.ratings.get("uiDesign"), Some(&10.0));
        assert_eq!(review.ratings.get("uxFlow"), Some(&1.0));
        assert_eq!(review.ratings.get("performance"), Some(&7.5));
        assert!(!review.ratings.contains_key("vibes"));
        assert!(!review.ratings.contains_key("innovation"));
        assert_eq!(review.feedback, "Solid");
        assert_eq!(review.suggestions, vec!["Add dark mode".to_string()]);
    }

    #[test]
    fn test_parse_defaults() {
        let review = parse_review("{}").unwrap();
        assert!(review.ratings.is_empty());
        assert_eq!(review.feedback, DEFAULT_FEEDBACK);
        assert!(review.suggestions.is_empty());
    }

    #[test]
    fn test_parse_tolerates_nulls() {
        let reply = r#"{"ratings": {"uiDesign": "8", "uxFlow": null}, "feedback": null, "suggestions": null}"#;
        let review = parse_review(reply).unwrap();

        assert_eq!(review.ratings.get("uiDesign"), Some(&8.0));
        assert!(!review.ratings.contains_key("uxFlow"));
        assert_eq!(review.feedback, DEFAULT_FEEDBACK);
        assert!(review.suggestions.is_empty());

        let review = parse_review(r#"{"ratings": null, "feedback": "Fine"}"#).unwrap();
        assert!(review.ratings.is_empty());
        assert_eq!(review.feedback, "Fine");
    }

    #[test]
    fn test_unparseable_reply() {
        assert!(matches!(
            parse_review("Sorry, I can't review this."),
            Err(LlmError::Malformed(_))
        ));
    }
}
