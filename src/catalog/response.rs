//! Interpretation of Eagle API responses.

use std::fmt;

use serde_json::Value;

/// Maximum characters of a response body kept for diagnostics.
const SNIPPET_CHARS: usize = 200;

/// What happened to one add-from-URL request.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// Eagle answered `{"status": "success"}`.
    Imported,
    /// Non-200 status. The body is not parsed.
    HttpStatus { status: u16, body: String },
    /// 200, but the body is not JSON.
    InvalidBody { body: String },
    /// JSON response whose `status` is missing or not `"success"`.
    Rejected { response: Value },
    /// The request never completed (timeout, connection refused, ...).
    Transport(String),
}

impl ImportOutcome {
    pub fn is_imported(&self) -> bool {
        matches!(self, ImportOutcome::Imported)
    }
}

impl fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportOutcome::Imported => write!(f, "imported"),
            ImportOutcome::HttpStatus { status, body } => write!(f, "HTTP {}: {}", status, body),
            ImportOutcome::InvalidBody { body } => write!(f, "Non-JSON response: {}", body),
            ImportOutcome::Rejected { response } => write!(f, "Failed: {}", response),
            ImportOutcome::Transport(e) => write!(f, "Request failed: {}", e),
        }
    }
}

/// First [`SNIPPET_CHARS`] characters of a body.
pub fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_CHARS).collect()
}

/// Classify a completed HTTP exchange.
pub fn interpret(status: u16, body: &str) -> ImportOutcome {
    if status != 200 {
        return ImportOutcome::HttpStatus {
            status,
            body: snippet(body),
        };
    }

    let response: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => {
            return ImportOutcome::InvalidBody {
                body: snippet(body),
            }
        }
    };

    if response.get("status").and_then(Value::as_str) == Some("success") {
        ImportOutcome::Imported
    } else {
        ImportOutcome::Rejected { response }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_status() {
        assert_eq!(interpret(200, r#"{"status":"success"}"#), ImportOutcome::Imported);
    }

    #[test]
    fn test_error_status_is_rejected() {
        let outcome = interpret(200, r#"{"status":"error","msg":"x"}"#);
        assert_eq!(
            outcome,
            ImportOutcome::Rejected {
                response: json!({"status": "error", "msg": "x"})
            }
        );
        assert!(!outcome.is_imported());
    }

    #[test]
    fn test_missing_or_non_string_status_is_rejected() {
        assert!(matches!(
            interpret(200, r#"{"data":{}}"#),
            ImportOutcome::Rejected { .. }
        ));
        assert!(matches!(
            interpret(200, r#"{"status":true}"#),
            ImportOutcome::Rejected { .. }
        ));
    }

    #[test]
    fn test_non_200_not_parsed() {
        // A success body behind a 503 must still fail
        let outcome = interpret(503, r#"{"status":"success"}"#);
        assert!(matches!(outcome, ImportOutcome::HttpStatus { status: 503, .. }));
    }

    #[test]
    fn test_non_json_body() {
        let outcome = interpret(200, "<html>oops</html>");
        assert_eq!(
            outcome,
            ImportOutcome::InvalidBody {
                body: "<html>oops</html>".to_string()
            }
        );
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let body = "가".repeat(300);
        assert_eq!(snippet(&body).chars().count(), 200);
    }
}
