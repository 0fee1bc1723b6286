//! Discussion guide generation

use lumora_common::db::{GuideSection, Study};
use serde::Deserialize;

use super::llm::{ChatMessage, ChatModel, ChatRequest, LlmError};
use super::reply_parser::{null_as_default, parse_reply, string_list};

const SYSTEM_PROMPT: &str = r#"You are an expert user researcher. Generate a structured discussion guide for a customer research study.

Return ONLY a JSON array of sections (no markdown, no code fences, no additional text). Each section should have:
- "title": string (section name)
- "objective": string (what this section aims to uncover)
- "questions": string[] (3-5 open-ended questions)

Generate 4-5 sections that progressively dive deeper into the research goal. Start with warm-up/context questions and end with forward-looking or wrap-up questions."#;

#[derive(Debug, Deserialize)]
struct SectionReply {
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    objective: String,
    #[serde(default, deserialize_with = "string_list")]
    questions: Vec<String>,
}

pub fn build_prompt(study: &Study) -> String {
    format!(
        "Study Name: {}\nResearch Goal: {}\nTarget Audience: {}\nStudy Type: {}",
        study.name,
        study.goal,
        study.target_audience,
        study.study_type.label()
    )
}

/// Generate guide sections for `study`
pub async fn generate_guide(model: &dyn ChatModel, study: &Study) -> Result<Vec<GuideSection>, LlmError> {
    let request = ChatRequest::new(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_prompt(study)),
    ])
    .temperature(0.7);

    let reply = model.complete(request).await?;
    parse_sections(&reply)
}

/// Parse a guide reply; an empty array is rejected
pub fn parse_sections(reply: &str) -> Result<Vec<GuideSection>, LlmError> {
    let sections: Vec<SectionReply> =
        parse_reply(reply).map_err(|e| LlmError::Malformed(e.to_string()))?;

    if sections.is_empty() {
        return Err(LlmError::Malformed("Discussion guide has no sections".to_string()));
    }

    Ok(sections
        .into_iter()
        .map(|s| GuideSection {
            title: s.title,
            objective: s.objective,
            questions: s.questions,
        })
        .collect())
}
