//! Parsing of the optional auxiliary manifest JSON referenced by §4.5's
//! author-resolution and summary/source-url extraction rules.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub additional_authors: Vec<AdditionalAuthorEntry>,
    #[serde(default)]
    pub summary: Option<Value>,
    #[serde(default)]
    pub source_url: Option<Value>,
    #[serde(default)]
    pub metamodule: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdditionalAuthorEntry {
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Parse `text` as a [`Manifest`]. Malformed JSON (or no manifest at all)
/// yields an empty manifest rather than a failure (§4.5).
pub fn parse_manifest(text: Option<&str>) -> Manifest {
    match text {
        Some(text) => serde_json::from_str(text).unwrap_or_else(|err| {
            tracing::debug!(%err, "auxiliary manifest failed to parse, treating as absent");
            Manifest::default()
        }),
        None => Manifest::default(),
    }
}

/// Trim, ellipsize to 512 characters, trim again. Returns `None` for an
/// empty or non-string `summary` value.
pub fn extract_summary(summary: &Option<Value>) -> Option<String> {
    const MAX_CHARS: usize = 512;
    const MARKER: &str = "...";

    let raw = summary.as_ref()?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }

    let char_count = raw.chars().count();
    let ellipsized = if char_count <= MAX_CHARS {
        raw.to_string()
    } else {
        let keep = MAX_CHARS - MARKER.len();
        let truncated: String = raw.chars().take(keep).collect();
        format!("{}{MARKER}", truncated.trim_end())
    };

    let trimmed = ellipsized.trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Strip CR/LF then trim. Returns `None` for an empty or non-string
/// `sourceUrl` value.
pub fn extract_source_url(source_url: &Option<Value>) -> Option<String> {
    let raw = source_url.as_ref()?.as_str()?;
    let stripped: String = raw.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn extract_metamodule(metamodule: &Option<Value>) -> bool {
    matches!(metamodule, Some(Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_manifest_json_yields_defaults() {
        let manifest = parse_manifest(Some("{not json"));
        assert!(manifest.additional_authors.is_empty());
        assert!(manifest.summary.is_none());
    }

    #[test]
    fn absent_manifest_yields_defaults() {
        let manifest = parse_manifest(None);
        assert!(manifest.additional_authors.is_empty());
    }

    #[test]
    fn summary_is_ellipsized_past_512_chars() {
        let long = "a".repeat(600);
        let summary = extract_summary(&Some(Value::String(long)));
        let summary = summary.unwrap();
        assert_eq!(summary.chars().count(), 512);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn short_summary_is_trimmed_only() {
        let summary = extract_summary(&Some(Value::String("  hello  ".into())));
        assert_eq!(summary, Some("hello".to_string()));
    }

    #[test]
    fn non_string_summary_yields_none() {
        assert_eq!(extract_summary(&Some(Value::Bool(true))), None);
        assert_eq!(extract_summary(&None), None);
    }

    #[test]
    fn source_url_strips_newlines() {
        let url = extract_source_url(&Some(Value::String("https://example.com\r\n".into())));
        assert_eq!(url, Some("https://example.com".to_string()));
    }

    #[test]
    fn metamodule_defaults_false_for_anything_but_literal_true() {
        assert!(!extract_metamodule(&None));
        assert!(!extract_metamodule(&Some(Value::String("true".into()))));
        assert!(extract_metamodule(&Some(Value::Bool(true))));
    }
}
