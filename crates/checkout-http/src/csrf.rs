//! Anti-forgery token handling

/// Cookie the server sets with the anti-forgery token
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

/// Header every command request carries the token in
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

/// Anti-forgery token sent with every command.
///
/// An empty token is allowed; the header is then sent empty and the server
/// decides.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    /// Read the token from a `Cookie`-style header (`a=1; csrftoken=xyz`)
    pub fn from_cookie_header(cookies: &str) -> Option<Self> {
        parse_cookie_value(cookies, CSRF_COOKIE_NAME).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            f.write_str("CsrfToken(<empty>)")
        } else {
            f.write_str("CsrfToken(<redacted>)")
        }
    }
}

/// Find a cookie value by name. Values are returned as stored, without
/// percent-decoding.
pub fn parse_cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_token_among_other_cookies() {
        let token = CsrfToken::from_cookie_header("sessionid=abc; csrftoken=tok123; theme=dark");
        assert_eq!(token.as_ref().map(CsrfToken::as_str), Some("tok123"));
    }

    #[test]
    fn test_missing_cookie() {
        assert!(CsrfToken::from_cookie_header("sessionid=abc").is_none());
        assert!(CsrfToken::from_cookie_header("").is_none());
    }

    #[test]
    fn test_name_must_match_exactly() {
        assert!(CsrfToken::from_cookie_header("xcsrftoken=nope").is_none());
        assert_eq!(
            parse_cookie_value("xcsrftoken=nope;csrftoken=yes", CSRF_COOKIE_NAME).as_deref(),
            Some("yes")
        );
    }

    #[test]
    fn test_debug_hides_value() {
        let token = CsrfToken::new("secret");
        assert!(!format!("{token:?}").contains("secret"));
        assert!(CsrfToken::default().is_empty());
    }
}
