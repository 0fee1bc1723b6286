//! Database row models
//!
//! Every struct maps one table row (`sqlx::FromRow`) and serializes to the
//! camelCase JSON the HTTP API returns. JSON-valued columns are wrapped in
//! [`sqlx::types::Json`], which serializes transparently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ========================================
// Enumerations
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

/// Marketplace lifecycle of an app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AppStatus {
    Draft,
    Published,
    Archived,
}

impl AppStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppStatus::Draft => "draft",
            AppStatus::Published => "published",
            AppStatus::Archived => "archived",
        }
    }
}

impl FromStr for AppStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(AppStatus::Draft),
            "published" => Ok(AppStatus::Published),
            "archived" => Ok(AppStatus::Archived),
            other => Err(format!("Invalid status: {}", other)),
        }
    }
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Research methodology of a study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum StudyType {
    Exploratory,
    ConceptTest,
    UsabilityTest,
    JourneyMap,
}

impl StudyType {
    /// Human-readable label used in prompts and the UI
    pub fn label(&self) -> &'static str {
        match self {
            StudyType::Exploratory => "Exploratory Research",
            StudyType::ConceptTest => "Concept Testing",
            StudyType::UsabilityTest => "Usability Testing",
            StudyType::JourneyMap => "Customer Journey Mapping",
        }
    }
}

impl FromStr for StudyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exploratory" => Ok(StudyType::Exploratory),
            "concept_test" => Ok(StudyType::ConceptTest),
            "usability_test" => Ok(StudyType::UsabilityTest),
            "journey_map" => Ok(StudyType::JourneyMap),
            other => Err(format!("Invalid study type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    InProgress,
    Completed,
}

/// Author of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Ai,
    Participant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl Sentiment {
    /// Lenient parse; anything unrecognised is neutral
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            "mixed" => Sentiment::Mixed,
            _ => Sentiment::Neutral,
        }
    }
}

// ========================================
// Accounts
// ========================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }
}

// ========================================
// Marketplace
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: Option<String>,
    pub target_audience: Option<String>,
    pub questions: Json<Vec<String>>,
    pub screenshots: Json<Vec<String>>,
    pub status: AppStatus,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    #[serde(rename = "isAI")]
    pub is_ai: bool,
    pub ratings: Json<BTreeMap<String, f64>>,
    pub overall_score: f64,
    pub feedback: String,
    pub suggestions: Json<Vec<String>>,
    pub owner_response: Option<String>,
    pub owner_responded_at: Option<DateTime<Utc>>,
    pub app_id: String,
    pub reviewer_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewVote {
    pub id: String,
    pub review_id: String,
    pub voter_id: String,
    pub helpful: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ========================================
// Customer research
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    pub id: String,
    pub name: String,
    pub goal: String,
    pub target_audience: String,
    #[serde(rename = "type")]
    pub study_type: StudyType,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One block of a discussion guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideSection {
    pub title: String,
    pub objective: String,
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionGuide {
    pub id: String,
    pub study_id: String,
    pub sections: Json<Vec<GuideSection>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: String,
    pub study_id: String,
    pub participant_name: String,
    pub status: InterviewStatus,
    pub messages: Json<Vec<Message>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub description: String,
    pub sentiment: Sentiment,
    pub quotes: Vec<String>,
    pub frequency: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub study_id: String,
    pub summary: String,
    pub themes: Json<Vec<Theme>>,
    pub recommendations: Json<Vec<String>>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_type_labels_and_parse() {
        assert_eq!(StudyType::from_str("concept_test"), Ok(StudyType::ConceptTest));
        assert_eq!(StudyType::JourneyMap.label(), "Customer Journey Mapping");
        assert!(StudyType::from_str("focus_group").is_err());
    }

    #[test]
    fn test_app_status_parse() {
        assert_eq!("archived".parse::<AppStatus>(), Ok(AppStatus::Archived));
        assert!("deleted".parse::<AppStatus>().is_err());
        assert_eq!(AppStatus::Published.to_string(), "published");
    }

    #[test]
    fn test_sentiment_lenient() {
        assert_eq!(Sentiment::parse_lenient("Positive"), Sentiment::Positive);
        assert_eq!(Sentiment::parse_lenient("ecstatic"), Sentiment::Neutral);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::new(MessageRole::Participant, "Hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "participant");
        assert_eq!(json["content"], "Hello");
        assert_eq!(json["id"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn test_study_serializes_type_field() {
        let now = Utc::now();
        let study = Study {
            id: "s1".to_string(),
            name: "Onboarding".to_string(),
            goal: "Understand onboarding".to_string(),
            target_audience: "New users".to_string(),
            study_type: StudyType::UsabilityTest,
            user_id: "u1".to_string(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&study).unwrap();
        assert_eq!(json["type"], "usability_test");
        assert_eq!(json["targetAudience"], "New users");
    }
}
