//! Small text and clock helpers.

/// Longest API error body quoted back to the user
const ERROR_EXCERPT_CHARS: usize = 180;

/// Trimmed copy of `value`, or `None` when only whitespace is left.
pub fn non_empty_trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Trimmed head of a response body, short enough for an error message.
pub fn error_excerpt(body: &str) -> String {
    body.trim().chars().take(ERROR_EXCERPT_CHARS).collect()
}

/// Current Unix timestamp in milliseconds; note ids come from this clock.
pub fn unix_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
