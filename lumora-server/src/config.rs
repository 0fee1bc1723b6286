//! Chat model configuration resolution
//!
//! The API key follows a three-tier priority: database setting, then the
//! `OPENAI_API_KEY` environment variable, then `[ai] api_key` in the TOML
//! config. The model name comes from the `ai_model` setting unless the TOML
//! config names one.

use lumora_common::config::TomlConfig;
use lumora_common::{Error, Result};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::{info, warn};

use crate::services::llm::{
    ChatModel, OpenAiChatModel, UnconfiguredChatModel, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECONDS,
};

/// Environment variable holding the chat model API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the API base URL
pub const API_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Check that a key is non-empty and not just whitespace
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the API key from database, environment and TOML
///
/// Returns `None` when no source holds a usable key.
pub async fn resolve_api_key(db: &Pool<Sqlite>, toml_config: &TomlConfig) -> Result<Option<String>> {
    let db_key = crate::db::settings::get_openai_api_key(db)
        .await?
        .filter(|k| is_valid_key(k));
    let env_key = std::env::var(API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config.ai.api_key.clone().filter(|k| is_valid_key(k));

    let sources: Vec<&str> = [
        db_key.as_ref().map(|_| "database"),
        env_key.as_ref().map(|_| "environment"),
        toml_key.as_ref().map(|_| "TOML"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sources.len() > 1 {
        warn!(
            "AI API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(key) = db_key {
        info!("AI API key loaded from database");
        return Ok(Some(key));
    }
    if let Some(key) = env_key {
        info!("AI API key loaded from environment variable");
        return Ok(Some(key));
    }
    if let Some(key) = toml_key {
        info!("AI API key loaded from TOML config");
        return Ok(Some(key));
    }

    Ok(None)
}

/// Save `key` as the database-tier API key
///
/// The stored key outranks the environment and TOML on every later start.
pub async fn store_api_key(db: &Pool<Sqlite>, key: &str) -> Result<()> {
    if !is_valid_key(key) {
        return Err(Error::Config("AI API key must not be empty".to_string()));
    }
    crate::db::settings::set_openai_api_key(db, key.trim().to_string()).await?;
    info!("AI API key stored in database");
    Ok(())
}

/// Build the chat model the server will use
///
/// Without an API key the returned model fails every call, so AI endpoints
/// answer `AI_ERROR` instead of the server refusing to start.
pub async fn build_chat_model(db: &Pool<Sqlite>, toml_config: &TomlConfig) -> Result<Arc<dyn ChatModel>> {
    let Some(api_key) = resolve_api_key(db, toml_config).await? else {
        warn!("No AI API key configured; AI features are disabled");
        warn!("Set {} or add api_key under [ai] in config.toml", API_KEY_ENV);
        return Ok(Arc::new(UnconfiguredChatModel));
    };

    let model = match toml_config.ai.model.clone() {
        Some(model) if !model.trim().is_empty() => model,
        _ => crate::db::settings::get_ai_model(db).await?,
    };

    let base_url = std::env::var(API_BASE_URL_ENV)
        .ok()
        .filter(|u| !u.trim().is_empty())
        .or_else(|| toml_config.ai.api_base_url.clone())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    let timeout = toml_config.ai.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

    let chat = OpenAiChatModel::new(&base_url, model, api_key, timeout)
        .map_err(|e| Error::Config(e.to_string()))?;
    info!(model = %chat.model(), base_url = %base_url, "Chat model configured");

    Ok(Arc::new(chat))
}
