//! AI-moderated interviews
//!
//! The moderator persona is rebuilt on every turn from the study goal and
//! the discussion guide, then handed the whole transcript.

use lumora_common::db::{GuideSection, Message, MessageRole, Study};
use serde::Serialize;
use tracing::warn;

use super::llm::{ChatMessage, ChatModel, ChatRequest, LlmError};

pub const NO_GUIDE_TEXT: &str =
    "No discussion guide available. Conduct a general exploratory interview about the study goal.";

pub const OPENING_FALLBACK: &str =
    "Hi! Thank you for joining this interview. Could you start by telling me a bit about yourself?";

pub const FOLLOW_UP_FALLBACK: &str = "Could you tell me more about that?";

const MAX_REPLY_TOKENS: u32 = 500;

const PERSONA: &str = "Follow the discussion guide but adapt based on responses. Ask follow-up \
questions when answers are interesting or vague. Be conversational and warm. Keep questions \
open-ended. Move to the next section when you've covered the current one thoroughly.";

/// Position of an interview within its guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current_section: usize,
    pub total_sections: usize,
    pub percent: u32,
}

impl Progress {
    /// Estimate progress from the number of interviewer turns
    ///
    /// Each section is assumed to take `questions_per_section` AI messages.
    pub fn estimate(section_count: usize, messages: &[Message], questions_per_section: usize) -> Self {
        let total = section_count.max(1);
        let per_section = questions_per_section.max(1);
        let ai_turns = messages.iter().filter(|m| m.role == MessageRole::Ai).count();

        let current = ai_turns.div_ceil(per_section).min(total);
        let percent = ((current as f64 / total as f64) * 100.0).round().min(100.0) as u32;

        Self {
            current_section: current,
            total_sections: total,
            percent,
        }
    }
}

/// Render the guide as plain text for the moderator prompt
pub fn render_guide(sections: &[GuideSection]) -> String {
    if sections.is_empty() {
        return NO_GUIDE_TEXT.to_string();
    }

    sections
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let questions = section
                .questions
                .iter()
                .map(|q| format!("- {}", q))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "Section {}: {}\nObjective: {}\nQuestions:\n{}",
                i + 1,
                section.title,
                section.objective,
                questions
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// System prompt for the first turn
pub fn opening_prompt(study: &Study, participant_name: &str, sections: &[GuideSection]) -> String {
    format!(
        "You are a skilled, empathetic user researcher conducting an interview for a study about: \"{}\". \
The participant's name is {}. {}\n\nDiscussion guide sections:\n{}\n\n\
Start by introducing yourself warmly, explaining the purpose of the interview briefly, and asking the first question from the guide.",
        study.goal,
        participant_name,
        PERSONA,
        render_guide(sections)
    )
}

/// System prompt for every later turn
pub fn conversation_prompt(study: &Study, participant_name: &str, sections: &[GuideSection]) -> String {
    format!(
        "You are a skilled, empathetic user researcher conducting an interview. {} \
The participant's name is {}.\n\nThe study goal is: \"{}\"\n\nDiscussion guide sections:\n{}",
        PERSONA,
        participant_name,
        study.goal,
        render_guide(sections)
    )
}

/// Map the transcript onto chat roles behind `system_prompt`
pub fn build_history(system_prompt: String, messages: &[Message]) -> Vec<ChatMessage> {
    std::iter::once(ChatMessage::system(system_prompt))
        .chain(messages.iter().map(|m| match m.role {
            MessageRole::Ai => ChatMessage::assistant(m.content.clone()),
            MessageRole::Participant => ChatMessage::user(m.content.clone()),
        }))
        .collect()
}

/// Generate the moderator's opening message
pub async fn opening_message(
    model: &dyn ChatModel,
    study: &Study,
    participant_name: &str,
    sections: &[GuideSection],
) -> Result<String, LlmError> {
    let request = ChatRequest::new(vec![ChatMessage::system(opening_prompt(
        study,
        participant_name,
        sections,
    ))])
    .max_tokens(MAX_REPLY_TOKENS);

    with_fallback(model.complete(request).await, OPENING_FALLBACK)
}

/// Generate the moderator's reply to the transcript so far
///
/// `messages` must already include the participant's latest message.
pub async fn next_message(
    model: &dyn ChatModel,
    study: &Study,
    participant_name: &str,
    sections: &[GuideSection],
    messages: &[Message],
) -> Result<String, LlmError> {
    let system = conversation_prompt(study, participant_name, sections);
    let request = ChatRequest::new(build_history(system, messages)).max_tokens(MAX_REPLY_TOKENS);

    with_fallback(model.complete(request).await, FOLLOW_UP_FALLBACK)
}

fn with_fallback(reply: Result<String, LlmError>, fallback: &str) -> Result<String, LlmError> {
    match reply {
        Err(LlmError::EmptyResponse) => {
            warn!("Interviewer reply was empty, using fallback question");
            Ok(fallback.to_string())
        }
        other => other,
    }
}
