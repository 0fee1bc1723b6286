//! Parsing of JSON-shaped model replies
//!
//! Models asked for "raw JSON" still wrap it in markdown fences or add a
//! sentence around it often enough that every caller goes through here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Strip surrounding markdown code fences (```json ... ``` or ``` ... ```)
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json", "JSON", ...) on the opening fence line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Deserialize a model reply into `T`
///
/// Tries the fence-stripped text first, then the outermost `{...}` or `[...]`
/// span to tolerate prose around the payload.
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T, serde_json::Error> {
    let text = strip_code_fences(reply);

    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(err) => match outermost_json_span(text) {
            Some(span) if span.len() < text.len() => serde_json::from_str(span),
            _ => Err(err),
        },
    }
}

/// `deserialize_with` helper reading an explicit `null` as `T::default()`
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `deserialize_with` helper for string lists; non-string entries are dropped
/// and anything other than an array reads as empty
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// `deserialize_with` helper accepting `7`, `7.5` or `"7"`; anything else is `None`
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.as_ref().and_then(number_from_value))
}

/// Numeric value of a JSON number or numeric string
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn outermost_json_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let closing = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closing)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
    }

    #[test]
    fn test_plain_json() {
        let parsed: Sample = parse_reply(r#"{"name": "Lumora"}"#).unwrap();
        assert_eq!(parsed.name, "Lumora");
    }

    #[test]
    fn test_json_fence() {
        let reply = "```json\n{\"name\": \"Fenced\"}\n```";
        assert_eq!(strip_code_fences(reply), "{\"name\": \"Fenced\"}");
        let parsed: Sample = parse_reply(reply).unwrap();
        assert_eq!(parsed.name, "Fenced");
    }

    #[test]
    fn test_bare_fence() {
        let reply = "```\n[1, 2, 3]\n```\n";
        let parsed: Vec<u32> = parse_reply(reply).unwrap();
        assert_eq!(parsed, vec![1, 2, 3]);
    }

    #[test]
    fn test_prose_around_payload() {
        let reply = "Here is the analysis:\n{\"name\": \"Wrapped\"}\nLet me know!";
        let parsed: Sample = parse_reply(reply).unwrap();
        assert_eq!(parsed.name, "Wrapped");
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Loose {
        #[serde(deserialize_with = "null_as_default")]
        title: String,
        #[serde(deserialize_with = "string_list")]
        tags: Vec<String>,
        #[serde(deserialize_with = "lenient_number")]
        score: Option<f64>,
    }

    #[test]
    fn test_lenient_fields() {
        let parsed: Loose =
            parse_reply(r#"{"title": null, "tags": ["a", null, 3, "b"], "score": " 7.5 "}"#).unwrap();
        assert_eq!(parsed.title, "");
        assert_eq!(parsed.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(parsed.score, Some(7.5));

        let parsed: Loose = parse_reply(r#"{"tags": null, "score": "lots"}"#).unwrap();
        assert!(parsed.tags.is_empty());
        assert_eq!(parsed.score, None);

        let parsed: Loose = parse_reply(r#"{"score": 4}"#).unwrap();
        assert_eq!(parsed.score, Some(4.0));
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(parse_reply::<Sample>("I cannot help with that.").is_err());
        assert!(parse_reply::<Sample>("").is_err());
    }
}
