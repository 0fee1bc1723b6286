//! Insight synthesis across completed interviews

use lumora_common::db::{Interview, MessageRole, Sentiment, Study, Theme};
use serde::Deserialize;

use super::llm::{ChatMessage, ChatModel, ChatRequest, LlmError};
use super::reply_parser::{lenient_number, null_as_default, parse_reply, string_list};

const MAX_REPLY_TOKENS: u32 = 3000;

const RESPONSE_SCHEMA: &str = r#"Return ONLY valid JSON (no markdown, no code fences) with this exact structure:
{
  "summary": "2-3 paragraph executive summary",
  "themes": [
    {
      "name": "Theme name",
      "description": "Theme description",
      "sentiment": "positive|negative|neutral|mixed",
      "quotes": ["exact quote 1", "exact quote 2"],
      "frequency": 1-10
    }
  ],
  "recommendations": ["recommendation 1", "recommendation 2", "...5-8 total"]
}"#;

/// Parsed synthesis result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Synthesis {
    pub summary: String,
    pub themes: Vec<Theme>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SynthesisReply {
    #[serde(deserialize_with = "null_as_default")]
    summary: String,
    #[serde(deserialize_with = "null_as_default")]
    themes: Vec<ThemeReply>,
    #[serde(deserialize_with = "string_list")]
    recommendations: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThemeReply {
    #[serde(deserialize_with = "null_as_default")]
    name: String,
    #[serde(deserialize_with = "null_as_default")]
    description: String,
    #[serde(deserialize_with = "null_as_default")]
    sentiment: String,
    #[serde(deserialize_with = "string_list")]
    quotes: Vec<String>,
    #[serde(deserialize_with = "lenient_number")]
    frequency: Option<f64>,
}

/// Render one interview as `Interviewer:` / `<participant>:` lines
pub fn render_transcript(interview: &Interview) -> String {
    let lines = interview
        .messages
        .iter()
        .map(|m| {
            let speaker = match m.role {
                MessageRole::Ai => "Interviewer",
                MessageRole::Participant => interview.participant_name.as_str(),
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("--- Interview with {} ---\n{}", interview.participant_name, lines)
}

pub fn system_prompt(study: &Study) -> String {
    format!(
        "You are an expert research analyst. Analyze the following interview transcripts from a customer research study about: \"{}\".\n\n\
Identify key themes, sentiment patterns, and actionable recommendations.\n\n{}",
        study.goal, RESPONSE_SCHEMA
    )
}

/// Synthesize insights from `interviews` (callers pass completed ones only)
pub async fn synthesize(
    model: &dyn ChatModel,
    study: &Study,
    interviews: &[Interview],
) -> Result<Synthesis, LlmError> {
    let transcripts = interviews
        .iter()
        .map(render_transcript)
        .collect::<Vec<_>>()
        .join("\n\n");

    let request = ChatRequest::new(vec![
        ChatMessage::system(system_prompt(study)),
        ChatMessage::user(format!("Here are the interview transcripts:\n\n{}", transcripts)),
    ])
    .max_tokens(MAX_REPLY_TOKENS)
    .json_response();

    let reply = model.complete(request).await?;
    parse_synthesis(&reply)
}

/// Parse a synthesis reply, normalizing sentiment and frequency
pub fn parse_synthesis(reply: &str) -> Result<Synthesis, LlmError> {
    let parsed: SynthesisReply = parse_reply(reply).map_err(|e| LlmError::Malformed(e.to_string()))?;

    let themes = parsed
        .themes
        .into_iter()
        .map(|t| Theme {
            name: t.name,
            description: t.description,
            sentiment: Sentiment::parse_lenient(&t.sentiment),
            quotes: t.quotes,
            frequency: t.frequency.unwrap_or(1.0).round().clamp(1.0, 10.0) as u8,
        })
        .collect();

    Ok(Synthesis {
        summary: parsed.summary,
        themes,
        recommendations: parsed.recommendations,
    })
}
