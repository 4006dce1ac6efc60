//! Turns free-form completion text into structured output
//!
//! Models asked for "only a JSON object" still wrap it in markdown fences or surround it with
//! prose often enough that parsing the raw text fails. The sanitizer looks for the object in the
//! places it usually ends up, in order:
//!
//! 1. a ```` ```json ```` (or bare ```` ``` ````) fenced block
//! 2. the whole text
//! 3. the span from the first `{` to the last `}`
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::errors::AnalysisError;

/// Parses a JSON object out of completion text.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(fenced) = fenced_block(text) {
        candidates.push(fenced);
    }
    candidates.push(text.trim());
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}'))
        && start < end
    {
        candidates.push(&text[start..=end]);
    }

    candidates
        .into_iter()
        .filter_map(|candidate| serde_json::from_str::<Value>(candidate).ok())
        .find(Value::is_object)
}

/// Decodes completion text into `T`. On failure the raw text is kept on the error so the caller
/// can still see what the model said.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, AnalysisError> {
    let Some(value) = extract_json_object(text) else {
        error!("No JSON object found in completion: {}", text);
        return Err(AnalysisError::InvalidCompletion {
            message: "Invalid JSON response from the API.".to_string(),
            raw_response: Some(text.to_string()),
        });
    };

    serde_json::from_value(value).map_err(|e| {
        error!("Completion JSON has unexpected shape: {}", e);
        AnalysisError::InvalidCompletion {
            message: format!("Unexpected JSON structure from the API: {e}"),
            raw_response: Some(text.to_string()),
        }
    })
}

/// Contents of the first fenced code block, preferring one tagged `json`.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```json").map(|i| i + "```json".len()).or_else(|| {
        text.find("```").map(|i| i + "```".len())
    })?;
    let rest = &text[open..];
    let close = rest.find("```")?;
    debug!("Found fenced block in completion");
    Some(rest[..close].trim())
}

/// Forces a Mermaid flowchart into a left-to-right layout.
///
/// A diagram without a `graph` directive gets `graph LR` prepended; a top-down directive is
/// rewritten. Empty diagrams stay empty.
pub fn normalize_mermaid(diagram: &str) -> String {
    let trimmed = diagram.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let (first, rest) = match trimmed.split_once('\n') {
        Some((first, rest)) => (first, Some(rest)),
        None => (trimmed, None),
    };
    let first = first.trim_end();

    let directive = first.trim_start();
    let first = if let Some(tail) = directive
        .strip_prefix("graph TD")
        .or_else(|| directive.strip_prefix("graph TB"))
    {
        format!("graph LR{tail}")
    } else if directive.starts_with("graph") {
        first.to_string()
    } else {
        return format!("graph LR\n{trimmed}");
    };

    match rest {
        Some(rest) => format!("{first}\n{rest}"),
        None => first,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TechStack;
    use serde_json::json;

    #[test]
    fn test_bare_json() {
        let value = extract_json_object(r#"{"industry": "Retail"}"#).unwrap();
        assert_eq!(value, json!({"industry": "Retail"}));
    }

    #[test]
    fn test_fenced_json_with_prose() {
        let text = "Here is the plan:\n```json\n{\"technical_details\": \"Use Rust\", \"mermaid_diagram\": \"graph LR\\nA-->B\"}\n```\nLet me know!";
        let stack: TechStack = decode(text).unwrap();
        assert_eq!(stack.technical_details, "Use Rust");
        assert_eq!(stack.mermaid_diagram, "graph LR\nA-->B");
    }

    #[test]
    fn test_untagged_fence() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_object(text).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_object_embedded_in_prose() {
        let text = "Sure! {\"market_overview\": \"Growing\"} Hope this helps.";
        assert_eq!(
            extract_json_object(text).unwrap(),
            json!({"market_overview": "Growing"})
        );
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        assert!(extract_json_object("[1, 2, 3]").is_none());
        assert!(extract_json_object("\"just a string\"").is_none());
    }

    #[test]
    fn test_decode_failure_keeps_raw_text() {
        let text = "I cannot produce JSON today.";
        let err = decode::<TechStack>(text).unwrap_err();
        match err {
            AnalysisError::InvalidCompletion { raw_response, .. } => {
                assert_eq!(raw_response.as_deref(), Some(text));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_wrong_shape_keeps_raw_text() {
        let text = r#"{"mermaid_diagram": "graph LR"}"#;
        let err = decode::<TechStack>(text).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidCompletion {
                raw_response: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_mermaid_top_down_rewritten() {
        assert_eq!(
            normalize_mermaid("graph TD\n  A --> B"),
            "graph LR\n  A --> B"
        );
        assert_eq!(normalize_mermaid("graph TB;"), "graph LR;");
    }

    #[test]
    fn test_mermaid_missing_directive_prepended() {
        assert_eq!(normalize_mermaid("A --> B\nB --> C"), "graph LR\nA --> B\nB --> C");
    }

    #[test]
    fn test_mermaid_left_to_right_untouched() {
        assert_eq!(normalize_mermaid("graph LR\nA --> B\n"), "graph LR\nA --> B");
        assert_eq!(normalize_mermaid("   "), "");
    }
}
