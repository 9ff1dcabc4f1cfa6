//! Error code mapping
//!
//! Maps error codes reported by the injected page runtime onto `DomError`
//! variants so live and in-memory documents fail the same way.

use crate::error::DomError;
use crate::protocol::ElementId;
use serde_json::Value;

/// Maps a page runtime error code and message to a `DomError`.
pub fn map_page_error(code: &str, message: &str, details: Option<&Value>) -> DomError {
    match code {
        "STALE_ELEMENT" => DomError::StaleElement {
            id: ElementId(extract_u64(details, "element")),
        },
        "INVALID_SELECTOR" => DomError::InvalidSelector {
            selector: extract_str(details, "selector"),
            reason: message.to_string(),
        },
        "NOT_SUPPORTED" => DomError::NotSupported(message.to_string()),
        "SCRIPT_ERROR" => DomError::Script(message.to_string()),
        "TIMEOUT" => DomError::Timeout,
        // UNKNOWN_OP, INVALID_REQUEST and codes from newer runtimes.
        _ => DomError::Script(format!("[{}] {}", code, message)),
    }
}

fn extract_u64(details: Option<&Value>, key: &str) -> u64 {
    details
        .and_then(|d| d.get(key))
        .and_then(|v| v.as_u64())
        .unwrap_or(0)
}

fn extract_str(details: Option<&Value>, key: &str) -> String {
    details
        .and_then(|d| d.get(key))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_stale_element() {
        let details = json!({"element": 12});
        let err = map_page_error("STALE_ELEMENT", "Element 12 is gone", Some(&details));
        assert!(matches!(err, DomError::StaleElement { id: ElementId(12) }));
        assert_eq!(err.code(), "STALE_ELEMENT");
    }

    #[test]
    fn test_map_invalid_selector() {
        let details = json!({"selector": "input[name="});
        let err = map_page_error("INVALID_SELECTOR", "not a valid selector", Some(&details));
        match err {
            DomError::InvalidSelector { selector, reason } => {
                assert_eq!(selector, "input[name=");
                assert_eq!(reason, "not a valid selector");
            }
            other => panic!("Expected InvalidSelector, got {:?}", other),
        }
    }

    #[test]
    fn test_map_script_error() {
        let err = map_page_error("SCRIPT_ERROR", "TypeError: x is undefined", None);
        assert!(matches!(err, DomError::Script(msg) if msg.contains("TypeError")));
    }

    #[test]
    fn test_map_unknown_code_fallback() {
        let err = map_page_error("SOMETHING_NEW", "Something happened", None);
        match err {
            DomError::Script(msg) => {
                assert!(msg.contains("SOMETHING_NEW"));
                assert!(msg.contains("Something happened"));
            }
            other => panic!("Expected Script, got {:?}", other),
        }
    }

    #[test]
    fn test_map_runtime_protocol_errors_to_script() {
        let err = map_page_error("UNKNOWN_OP", "No handler for frobnicate", None);
        assert!(matches!(err, DomError::Script(msg) if msg.starts_with("[UNKNOWN_OP]")));
        assert_eq!(
            map_page_error("INVALID_REQUEST", "bad", None).code(),
            "SCRIPT_ERROR"
        );
    }
}
