//! Website analysis for one-click app submission
//!
//! Fetches a public page, pulls its title/description/Open Graph metadata and
//! visible text, then asks the model to draft the marketplace listing.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::llm::{ChatMessage, ChatModel, ChatRequest, LlmError};
use super::reply_parser::{null_as_default, parse_reply, string_list};

/// User-Agent sent when fetching submitted sites
pub const BOT_USER_AGENT: &str = "Mozilla/5.0 (compatible; LumoraBot/1.0; +https://lumora.app)";

/// Most bytes of a page that are read; the rest is discarded
pub const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<title[^>]*>([^<]*)</title>").expect("title pattern"));
static BODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body[^>]*>(.*)</body>").expect("body pattern"));
static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").expect("script pattern"));
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").expect("style pattern"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

static META_DESCRIPTION: Lazy<MetaPattern> = Lazy::new(|| MetaPattern::new("name", "description"));
static OG_TITLE: Lazy<MetaPattern> = Lazy::new(|| MetaPattern::new("property", "og:title"));
static OG_DESCRIPTION: Lazy<MetaPattern> =
    Lazy::new(|| MetaPattern::new("property", "og:description"));
static OG_IMAGE: Lazy<MetaPattern> = Lazy::new(|| MetaPattern::new("property", "og:image"));

/// `<meta {attr}="{name}" content="...">`, matched in either attribute order
struct MetaPattern {
    forward: Regex,
    reverse: Regex,
}

impl MetaPattern {
    fn new(attr: &str, name: &str) -> Self {
        let name = regex::escape(name);
        Self {
            forward: Regex::new(&format!(
                r#"(?i)<meta[^>]+{attr}=["']{name}["'][^>]+content=["']([^"']*)["']"#
            ))
            .expect("meta pattern"),
            reverse: Regex::new(&format!(
                r#"(?i)<meta[^>]+content=["']([^"']*)["'][^>]+{attr}=["']{name}["']"#
            ))
            .expect("meta pattern"),
        }
    }

    fn find(&self, html: &str) -> String {
        self.forward
            .captures(html)
            .or_else(|| self.reverse.captures(html))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }
}

const SYSTEM_PROMPT: &str = r#"You are an expert AI Product Manager. Given a webpage's content, extract and generate app metadata for a review platform. Respond with valid JSON only (no markdown).

{
  "name": "<concise app name, max 60 chars>",
  "description": "<2-3 sentence description of what the app does and its value proposition>",
  "targetAudience": "<who this app is for, 1 sentence>",
  "questions": ["<smart review question 1>", "<smart review question 2>", "<smart review question 3>"]
}

For questions, generate 3 thoughtful questions that a product reviewer should evaluate, specific to this app. Focus on UX, value prop, and differentiation."#;

#[derive(Debug, Error)]
pub enum SiteFetchError {
    #[error("Invalid URL format")]
    InvalidUrl,

    #[error("Could not access that URL: {0}")]
    Unreachable(String),
}

/// Metadata scraped from a page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub title: String,
    pub meta_description: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    /// Visible text with scripts, styles and tags removed
    pub body_text: String,
}

/// Listing draft produced by the model
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteAnalysis {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target_audience: String,
    #[serde(deserialize_with = "string_list")]
    pub questions: Vec<String>,
}

/// Parse `raw` and accept only http/https URLs
pub fn validate_url(raw: &str) -> Result<Url, SiteFetchError> {
    let url = Url::parse(raw.trim()).map_err(|_| SiteFetchError::InvalidUrl)?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(SiteFetchError::InvalidUrl),
    }
}

/// Download the page HTML, keeping at most `max_bytes` of the body
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    timeout: Duration,
    max_bytes: usize,
) -> Result<String, SiteFetchError> {
    let unreachable = |e: reqwest::Error| {
        warn!(url = %url, error = %e, "Site fetch failed");
        SiteFetchError::Unreachable(e.to_string())
    };

    let mut response = client
        .get(url.as_str())
        .header(reqwest::header::USER_AGENT, BOT_USER_AGENT)
        .timeout(timeout)
        .send()
        .await
        .map_err(unreachable)?;

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(unreachable)? {
        let room = max_bytes - body.len();
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if body.len() >= max_bytes {
            debug!(url = %url, max_bytes, "Page body truncated");
            break;
        }
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Extract metadata and visible text from `html`
///
/// Body text is truncated to `max_chars` characters.
pub fn extract_metadata(html: &str, max_chars: usize) -> PageMetadata {
    let title = TITLE_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let body = BODY_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(html);

    let without_scripts = SCRIPT_RE.replace_all(body, "");
    let without_styles = STYLE_RE.replace_all(&without_scripts, "");
    let without_tags = TAG_RE.replace_all(&without_styles, " ");
    let collapsed = WHITESPACE_RE.replace_all(&without_tags, " ");
    let body_text: String = collapsed.trim().chars().take(max_chars).collect();

    PageMetadata {
        title,
        meta_description: META_DESCRIPTION.find(html),
        og_title: OG_TITLE.find(html),
        og_description: OG_DESCRIPTION.find(html),
        og_image: OG_IMAGE.find(html),
        body_text,
    }
}

/// Render the page summary handed to the model
pub fn build_site_context(url: &str, meta: &PageMetadata) -> String {
    let title = if meta.og_title.is_empty() { &meta.title } else { &meta.og_title };
    let description = if meta.og_description.is_empty() {
        &meta.meta_description
    } else {
        &meta.og_description
    };

    let mut context = format!(
        "URL: {}\nPage Title: {}\nMeta Description: {}\n",
        url, title, description
    );
    if !meta.og_image.is_empty() {
        context.push_str(&format!("OG Image: {}\n", meta.og_image));
    }
    context.push_str("\nPage Content (truncated):\n");
    context.push_str(&meta.body_text);
    context
}

/// Ask the model to draft a listing from `site_context`
pub async fn analyze_site(model: &dyn ChatModel, site_context: &str) -> Result<SiteAnalysis, LlmError> {
    let request = ChatRequest::new(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(site_context),
    ])
    .temperature(0.5);

    let reply = model.complete(request).await?;
    debug!(reply_len = reply.len(), "Site analysis reply received");

    parse_reply(&reply).map_err(|e| LlmError::Malformed(e.to_string()))
}
