//! Web session checks.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use subtle::ConstantTimeEq;

use crate::config::WebConfig;

/// Decides whether a request carries an administrator session.
pub trait Authenticator: Send + Sync {
    /// Whether the request headers carry a valid session.
    fn is_authenticated(&self, headers: &HeaderMap) -> bool;

    /// Whether the login form credentials are correct.
    fn verify_login(&self, username: &str, password: &str) -> bool;

    /// `Set-Cookie` value issued after a successful login.
    fn session_cookie(&self) -> String;

    /// Name of the session cookie, cleared again on logout.
    fn cookie_name(&self) -> &str;
}

/// Placeholder session check: any `Cookie` header mentioning the session
/// cookie name is accepted, whatever its value.
///
/// This is not a security boundary. It exists so the dashboard works the
/// same way as on the device; swap in a real [`Authenticator`] before
/// exposing the interface on an untrusted network.
#[derive(Debug, Clone)]
pub struct PresenceCookieAuth {
    username: String,
    password: String,
    cookie_name: String,
    cookie_value: String,
}

impl PresenceCookieAuth {
    pub fn new(config: &WebConfig) -> Self {
        Self {
            username: config.admin_username.clone(),
            password: config.admin_password.clone(),
            cookie_name: config.session_cookie.clone(),
            cookie_value: config.session_value.clone(),
        }
    }
}

impl Authenticator for PresenceCookieAuth {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        let marker = format!("{}=", self.cookie_name);
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|cookies| cookies.contains(&marker))
    }

    fn verify_login(&self, username: &str, password: &str) -> bool {
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        (user_ok & pass_ok).into()
    }

    fn session_cookie(&self) -> String {
        format!("{}={}; Path=/", self.cookie_name, self.cookie_value)
    }

    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    fn auth() -> PresenceCookieAuth {
        PresenceCookieAuth::new(&WebConfig::default())
    }

    #[rstest]
    #[case("session_id=admin_session", true)]
    #[case("theme=dark; session_id=anything", true)]
    #[case("session_id=", true)]
    #[case("theme=dark", false)]
    #[case("session=admin_session", false)]
    fn test_cookie_presence(#[case] cookie: &str, #[case] expected: bool) {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        assert_eq!(auth().is_authenticated(&headers), expected);
    }

    #[test]
    fn test_no_cookie_header() {
        assert!(!auth().is_authenticated(&HeaderMap::new()));
    }

    #[rstest]
    #[case("admin", "123", true)]
    #[case("admin", "1234", false)]
    #[case("Admin", "123", false)]
    #[case("", "", false)]
    fn test_verify_login(#[case] user: &str, #[case] pass: &str, #[case] expected: bool) {
        assert_eq!(auth().verify_login(user, pass), expected);
    }

    #[test]
    fn test_session_cookie() {
        assert_eq!(auth().session_cookie(), "session_id=admin_session; Path=/");
        assert_eq!(auth().cookie_name(), "session_id");
    }
}
