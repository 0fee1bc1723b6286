//! AI services: prompt construction, model calls and reply parsing

pub mod app_reviewer;
pub mod guide_generator;
pub mod interviewer;
pub mod llm;
pub mod reply_parser;
pub mod site_analyzer;
pub mod synthesizer;

pub use llm::{ChatMessage, ChatModel, ChatRequest, ChatRole, LlmError, OpenAiChatModel, UnconfiguredChatModel};
