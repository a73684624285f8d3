//! Strict validation of the model's JSON reply.
//!
//! The model is asked for a single object; anything that does not fit is a
//! `SchemaViolation` and the caller falls back to `unclassified`.

use pl_protocol::{Category, ClassificationResult, SmalltalkKind};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::SchemaViolation;

/// Exact JSON shape accepted from the model.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClassification {
    category: String,
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    sub_intent: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    smalltalk_kind: Option<String>,
    confidence: f64,
}

/// JSON schema passed as Ollama's `format`, constraining the reply shape.
pub fn response_format() -> Value {
    let categories: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
    let kinds: Vec<Value> = SmalltalkKind::ALL
        .iter()
        .map(|k| Value::from(k.as_str()))
        .chain([Value::Null])
        .collect();

    json!({
        "type": "object",
        "properties": {
            "category": { "type": "string", "enum": categories },
            "intent": { "type": ["string", "null"] },
            "sub_intent": { "type": ["string", "null"] },
            "region": { "type": ["string", "null"] },
            "smalltalk_kind": { "type": ["string", "null"], "enum": kinds },
            "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 }
        },
        "required": ["category", "confidence"],
        "additionalProperties": false
    })
}

/// Extract JSON from model output that may be wrapped in markdown code blocks.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    trimmed
}

/// Parse and validate the model's message content.
pub fn parse_classification(content: &str) -> Result<ClassificationResult, SchemaViolation> {
    let raw: RawClassification = serde_json::from_str(extract_json(content))
        .map_err(|e| SchemaViolation::InvalidJson(e.to_string()))?;

    let category = Category::parse(raw.category.trim())
        .ok_or_else(|| SchemaViolation::UnknownCategory(raw.category.clone()))?;

    if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
        return Err(SchemaViolation::ConfidenceOutOfRange(raw.confidence));
    }

    let smalltalk_kind = match clean_key(raw.smalltalk_kind) {
        Some(kind) => SmalltalkKind::parse(&kind).ok_or(SchemaViolation::UnknownSmalltalkKind(kind))?,
        None => SmalltalkKind::default(),
    };

    Ok(ClassificationResult {
        category,
        intent: clean_key(raw.intent),
        sub_intent: clean_key(raw.sub_intent),
        region: clean_text(raw.region),
        smalltalk_kind,
        confidence: raw.confidence,
    })
}

/// Trimmed, lowercased; empty and "null"-like strings become absent.
fn clean_key(value: Option<String>) -> Option<String> {
    clean_text(value).map(|v| v.to_lowercase())
}

fn clean_text(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") || value.eq_ignore_ascii_case("none")
    {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── extract_json ─────────────────────────────────────────────

    #[test]
    fn extract_json_raw() {
        let input = r#"{"category": "off_topic", "confidence": 0.9}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn extract_json_markdown_json_block() {
        let input = "```json\n{\"category\": \"smalltalk\"}\n```";
        assert_eq!(extract_json(input), "{\"category\": \"smalltalk\"}");
    }

    #[test]
    fn extract_json_with_surrounding_text() {
        let input = "Ecco:\n```\n{\"category\": \"smalltalk\"}\n```\nFine.";
        assert_eq!(extract_json(input), "{\"category\": \"smalltalk\"}");
    }

    // ── parse_classification ─────────────────────────────────────

    #[test]
    fn parses_service_request() {
        let result = parse_classification(
            r#"{"category": "service_request", "intent": " Bollo_Auto ", "sub_intent": "calcolo_bollo",
                "region": " Lombardia ", "confidence": 0.92}"#,
        )
        .unwrap();
        assert_eq!(result.category, Category::ServiceRequest);
        assert_eq!(result.intent.as_deref(), Some("bollo_auto"));
        assert_eq!(result.sub_intent.as_deref(), Some("calcolo_bollo"));
        assert_eq!(result.region.as_deref(), Some("Lombardia"));
        assert!((result.confidence - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_and_null_strings_become_absent() {
        let result = parse_classification(
            r#"{"category": "service_request", "intent": "spid", "sub_intent": "",
                "region": "null", "smalltalk_kind": null, "confidence": 0.8}"#,
        )
        .unwrap();
        assert!(result.sub_intent.is_none());
        assert!(result.region.is_none());
        assert_eq!(result.smalltalk_kind, SmalltalkKind::Chitchat);
    }

    #[test]
    fn parses_smalltalk_kind() {
        let result = parse_classification(
            r#"{"category": "smalltalk", "smalltalk_kind": "greeting", "confidence": 0.97}"#,
        )
        .unwrap();
        assert_eq!(result.smalltalk_kind, SmalltalkKind::Greeting);
    }

    #[test]
    fn unknown_intent_is_kept() {
        let result = parse_classification(
            r#"{"category": "service_request", "intent": "passaporto_lunare", "confidence": 0.9}"#,
        )
        .unwrap();
        assert_eq!(result.intent.as_deref(), Some("passaporto_lunare"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = parse_classification(
            r#"{"category": "service_request", "intent": "cup", "needs_region": true, "confidence": 0.9}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaViolation::InvalidJson(_)));
    }

    #[test]
    fn rejects_unknown_category() {
        let err = parse_classification(r#"{"category": "weather", "confidence": 0.9}"#).unwrap_err();
        assert_eq!(err, SchemaViolation::UnknownCategory("weather".into()));
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let err =
            parse_classification(r#"{"category": "off_topic", "confidence": 1.5}"#).unwrap_err();
        assert_eq!(err, SchemaViolation::ConfidenceOutOfRange(1.5));

        assert!(parse_classification(r#"{"category": "off_topic", "confidence": -0.1}"#).is_err());
    }

    #[test]
    fn rejects_missing_confidence() {
        assert!(parse_classification(r#"{"category": "off_topic"}"#).is_err());
        assert!(parse_classification(r#"{"category": "off_topic", "confidence": "high"}"#).is_err());
    }

    #[test]
    fn rejects_unknown_smalltalk_kind() {
        let err = parse_classification(
            r#"{"category": "smalltalk", "smalltalk_kind": "joke", "confidence": 0.9}"#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaViolation::UnknownSmalltalkKind(_)));
    }

    #[test]
    fn rejects_prose() {
        assert!(parse_classification("I think the user wants SPID.").is_err());
        assert!(parse_classification("").is_err());
    }

    // ── response_format ──────────────────────────────────────────

    #[test]
    fn response_format_lists_categories() {
        let format = response_format();
        let categories = format["properties"]["category"]["enum"].as_array().unwrap();
        assert_eq!(categories.len(), 4);
        assert_eq!(format["additionalProperties"], false);
        assert_eq!(format["required"], json!(["category", "confidence"]));
    }
}
