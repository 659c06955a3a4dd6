//! Request scanner
//!
//! Finds JWTs in the header section of a raw HTTP request.

use regex::Regex;
use std::sync::LazyLock;

/// Two `eyJ` segments (base64url of `{"`) and an optional signature
static JWT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"eyJ[A-Za-z0-9_-]*=*\.eyJ[A-Za-z0-9_-]*=*\.[A-Za-z0-9_-]*=*")
        .expect("JWT pattern is a valid regex")
});

/// Token found in a request header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedToken {
    /// Header the token was found in
    pub header_name: String,
    /// Full header value
    pub header_value: String,
    /// Token literal as it appears in the request
    pub token: String,
}

/// Extract every token from the request headers, in header order
///
/// The first line is the request line. Headers run until the first blank line and
/// anything after that is body, which is not searched.
pub fn extract(request: &str) -> Vec<ExtractedToken> {
    let mut tokens = Vec::new();

    for line in request.lines().skip(1) {
        if line.trim().is_empty() {
            break;
        }

        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        for m in JWT_PATTERN.find_iter(value) {
            tracing::debug!(header = name, "Found candidate token");
            tokens.push(ExtractedToken {
                header_name: name.to_string(),
                header_value: value.to_string(),
                token: m.as_str().to_string(),
            });
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0In0.sig123";

    #[test]
    fn test_extract_bearer_token() {
        let request = format!(
            "GET /api/me HTTP/1.1\nHost: example.com\nAuthorization: Bearer {}\n\n",
            TOKEN
        );
        let tokens = extract(&request);

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].header_name, "Authorization");
        assert_eq!(tokens[0].header_value, format!("Bearer {}", TOKEN));
        assert_eq!(tokens[0].token, TOKEN);
    }

    #[test]
    fn test_extract_multiple_in_header_order() {
        let other = "eyJhbGciOiJub25lIn0.eyJhIjoxfQ.";
        let request = format!(
            "GET / HTTP/1.1\r\nCookie: a={}; b={}\r\nX-Token: {}\r\n\r\n",
            other, TOKEN, TOKEN
        );
        let tokens = extract(&request);

        let found: Vec<(&str, &str)> = tokens
            .iter()
            .map(|t| (t.header_name.as_str(), t.token.as_str()))
            .collect();
        assert_eq!(
            found,
            [("Cookie", other), ("Cookie", TOKEN), ("X-Token", TOKEN)]
        );
    }

    #[test]
    fn test_extract_ignores_body() {
        let request = format!("POST / HTTP/1.1\nHost: a\n\n{{\"token\":\"{}\"}}", TOKEN);
        assert!(extract(&request).is_empty());
    }

    #[test]
    fn test_extract_no_headers() {
        let request = format!("GET / HTTP/1.1\n\nAuthorization: Bearer {}", TOKEN);
        assert!(extract(&request).is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_extract_skips_lines_without_colon() {
        let request = format!("GET / HTTP/1.1\ngarbage {}\nHost: a\n\n", TOKEN);
        assert!(extract(&request).is_empty());
    }

    #[test]
    fn test_extract_keeps_padding() {
        let padded = "eyJhbGciOiJub25lIn0=.eyJzdWIiOiIxMjM0In0=.";
        let request = format!("GET / HTTP/1.1\nAuthorization: Bearer {}\n\n", padded);
        assert_eq!(extract(&request)[0].token, padded);
    }
}
