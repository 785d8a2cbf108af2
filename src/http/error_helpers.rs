//! Error handling utilities for response bodies and error context formatting.

use crate::errors::RedactError;
use serde_json::Value;

/// Maximum characters to include from a response body in context messages
const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

/// Deserializes a JSON body into `T`, wrapping failures with the target type
/// name and a preview of the offending payload.
///
/// serde's error text names the missing or mistyped field, so the resulting
/// [`RedactError::MalformedResponse`] identifies exactly which part of the
/// endpoint contract the response violated.
pub fn deserialize_with_context<T: serde::de::DeserializeOwned>(
    body: Value,
    type_name: &str,
) -> Result<T, RedactError> {
    let preview = truncate_for_context(&body.to_string(), ERROR_BODY_PREVIEW_LENGTH);
    serde_json::from_value(body).map_err(|err| {
        RedactError::MalformedResponse(format!("invalid {type_name}: {err} | body: {preview}"))
    })
}

/// Truncates a string to specified length, adding "..." if truncated.
///
/// Uses character-boundary-aware slicing to prevent panics on multi-byte UTF-8 characters.
fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let truncate_at = s
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..truncate_at])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        media_id: String,
    }

    #[test]
    fn test_deserialize_with_context_success() {
        let body = serde_json::json!({ "media_id": "m1" });
        let probe: Probe = deserialize_with_context(body, "Probe").unwrap();
        assert_eq!(probe.media_id, "m1");
    }

    #[test]
    fn test_deserialize_with_context_names_missing_field() {
        let body = serde_json::json!({ "other": true });
        let err = deserialize_with_context::<Probe>(body, "Probe").unwrap_err();
        assert!(matches!(err, RedactError::MalformedResponse(_)));
        assert_eq!(err.status_code(), 500);
        let message = err.to_string();
        assert!(message.contains("Probe"));
        assert!(message.contains("media_id"));
    }

    #[test]
    fn test_deserialize_with_context_names_mistyped_field() {
        let body = serde_json::json!({ "media_id": 7 });
        let err = deserialize_with_context::<Probe>(body, "Probe").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid type"));
        assert!(message.contains(r#""media_id":7"#));
    }

    #[test]
    fn test_truncate_for_context_short_string() {
        assert_eq!(truncate_for_context("Short", 100), "Short");
    }

    #[test]
    fn test_truncate_for_context_long_string() {
        let long_str = "a".repeat(300);
        let result = truncate_for_context(&long_str, 200);
        assert_eq!(result.len(), 203); // 200 + "..."
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_for_context_multibyte_boundary() {
        let s = "é".repeat(150); // 2 bytes per char
        let result = truncate_for_context(&s, 201);
        assert!(result.ends_with("..."));
        assert!(result.len() <= 204);
    }
}
