//! Session cookie handling

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;

/// How the session token is carried to and from the browser
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
    max_age: Duration,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secure: bool, max_age: Duration) -> Self {
        Self {
            name: name.into(),
            secure,
            max_age,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session token presented by the client, if any
    pub fn token(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    }

    /// Cookie carrying `token`, valid for one full session window
    pub fn issue(&self, token: &str) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::seconds(self.max_age.num_seconds()))
            .build()
    }

    /// Drop the session cookie from the jar
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build((self.name.clone(), "")).path("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};

    #[test]
    fn test_issued_cookie_attributes() {
        let cookie = SessionCookie::new("sid", true, Duration::hours(24)).issue("abc");

        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86_400)));
    }

    #[test]
    fn test_token_ignores_other_and_empty_cookies() {
        let settings = SessionCookie::new("sid", false, Duration::hours(1));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; sid=tok123"));
        assert_eq!(
            settings.token(&CookieJar::from_headers(&headers)),
            Some("tok123".to_string())
        );

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sid="));
        assert_eq!(settings.token(&CookieJar::from_headers(&headers)), None);

        assert_eq!(settings.token(&CookieJar::new()), None);
    }
}
