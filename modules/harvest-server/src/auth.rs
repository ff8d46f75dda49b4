use axum::http::{header, HeaderMap};

/// Check `Authorization: Bearer <token>` against the configured API token.
pub fn check_bearer(headers: &HeaderMap, expected: &str) -> bool {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return false;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    let Some(token) = value.strip_prefix("Bearer ") else {
        return false;
    };
    !expected.is_empty() && constant_time_eq(token.as_bytes(), expected.as_bytes())
}

/// Constant-time byte comparison to prevent timing attacks on token checks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn matching_bearer_token_passes() {
        assert!(check_bearer(&headers("Bearer s3cret"), "s3cret"));
    }

    #[test]
    fn wrong_or_malformed_tokens_fail() {
        assert!(!check_bearer(&headers("Bearer nope"), "s3cret"));
        assert!(!check_bearer(&headers("s3cret"), "s3cret"));
        assert!(!check_bearer(&headers("Basic s3cret"), "s3cret"));
        assert!(!check_bearer(&HeaderMap::new(), "s3cret"));
    }

    #[test]
    fn empty_configured_token_never_matches() {
        assert!(!check_bearer(&headers("Bearer "), ""));
    }

    #[test]
    fn constant_time_eq_compares_lengths_first() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"abc", b"abd"));
    }
}
