//! String-match boolean derivation for Sensor bindings

use serde_json::Value;
use std::borrow::Cow;

/// String form of an upstream state value
///
/// Strings are taken verbatim, null becomes the empty string, everything else
/// uses its JSON text.
pub fn state_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Exact comparison, optionally negated
pub fn is_match(value: &str, match_string: &str, reverse: bool) -> bool {
    (value == match_string) != reverse
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_match() {
        assert!(is_match("Open", "Open", false));
        assert!(!is_match("Open", "Open", true));
        assert!(!is_match("Closed", "Open", false));
        assert!(is_match("Closed", "Open", true));
    }

    #[test]
    fn test_no_coercion() {
        assert!(!is_match("open", "Open", false));
        assert!(!is_match("1.0", "1", false));
        assert!(!is_match(" Open", "Open", false));
    }

    #[test]
    fn test_state_text() {
        assert_eq!(state_text(&json!("Open")), "Open");
        assert_eq!(state_text(&json!(true)), "true");
        assert_eq!(state_text(&json!(12)), "12");
        assert_eq!(state_text(&json!(21.5)), "21.5");
        assert_eq!(state_text(&Value::Null), "");
    }
}
