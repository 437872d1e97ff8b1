use serde_json::Value;

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

/// Pulls a human-readable message out of an error response body.
///
/// The backend reports errors as `{"detail": "..."}`; validation failures come
/// back as `{"field": ["message", ...]}`, in which case the first message wins.
/// Any other body (HTML error pages, plain text, bare JSON values) yields `None`.
pub fn error_message_from_body(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Object(map)) => {
            if let Some(detail) = map.get("detail").and_then(Value::as_str) {
                return Some(truncate(detail)).filter(|d| !d.is_empty());
            }
            map.iter().find_map(|(field, value)| {
                first_string(value).map(|message| truncate(&format!("{}: {}", field, message)))
            })
        }
        _ => None,
    }
}

/// Shortened raw body for log lines.
pub fn body_excerpt(body: &str) -> String {
    truncate(body)
}

fn first_string(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Array(items) => items.iter().find_map(first_string),
        _ => None,
    }
}

fn truncate(s: &str) -> String {
    s.trim().chars().take(MAX_ERROR_CHARS).collect()
}

/// Joins a base URL and a path with exactly one slash between them.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_field_is_preferred() {
        let body = r#"{"detail": "No active account found with the given credentials"}"#;
        assert_eq!(
            error_message_from_body(body).as_deref(),
            Some("No active account found with the given credentials")
        );
    }

    #[test]
    fn test_field_errors_are_flattened() {
        let body = r#"{"password": ["Die Passwörter stimmen nicht überein"]}"#;
        assert_eq!(
            error_message_from_body(body).as_deref(),
            Some("password: Die Passwörter stimmen nicht überein")
        );
    }

    #[test]
    fn test_non_json_bodies_carry_no_message() {
        assert_eq!(error_message_from_body("   "), None);
        assert_eq!(error_message_from_body(" Bad Gateway "), None);
        assert_eq!(
            error_message_from_body("<html><body><h1>502 Bad Gateway</h1></body></html>"),
            None
        );
        assert_eq!(error_message_from_body(r#""just a string""#), None);
        assert_eq!(error_message_from_body(r#"{"detail": ""}"#), None);
    }

    #[test]
    fn test_long_detail_and_excerpt_are_truncated() {
        let long = "x".repeat(500);
        let body = format!(r#"{{"detail": "{}"}}"#, long);
        assert_eq!(
            error_message_from_body(&body).unwrap().len(),
            MAX_ERROR_CHARS
        );
        assert_eq!(body_excerpt(&long).len(), MAX_ERROR_CHARS);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8000/", "/api/auth/login/"),
            "http://localhost:8000/api/auth/login/"
        );
        assert_eq!(join_url("", "/api/listings/"), "/api/listings/");
    }
}
