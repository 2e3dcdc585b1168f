//! Session cookie transport.
//!
//! The server token travels in an HTTP-only cookie; the client token is
//! returned in the body and mirrored in a script-readable cookie.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use budgetdesk_core::config::AppConfig;

/// Cookie names and attributes derived from configuration.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    server_name: String,
    client_name: String,
    secure: bool,
    same_site: SameSite,
    server_max_age: time::Duration,
    client_max_age: time::Duration,
}

impl CookieSettings {
    /// Production deployments get `Secure` and `SameSite=Strict`.
    pub fn new(config: &AppConfig) -> Self {
        let production = config.is_production();
        Self {
            server_name: config.cookies.server_cookie_name.clone(),
            client_name: config.cookies.client_cookie_name.clone(),
            secure: production,
            same_site: if production {
                SameSite::Strict
            } else {
                SameSite::Lax
            },
            server_max_age: to_time(config.auth.server_token_ttl()),
            client_max_age: to_time(config.auth.client_token_ttl()),
        }
    }

    /// Name of the server token cookie.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Name of the client token cookie.
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// HTTP-only cookie carrying the server token.
    pub fn server_cookie(&self, token: impl Into<String>) -> Cookie<'static> {
        Cookie::build((self.server_name.clone(), token.into()))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path("/")
            .max_age(self.server_max_age)
            .build()
    }

    /// Script-readable cookie carrying the client token.
    pub fn client_cookie(&self, token: impl Into<String>) -> Cookie<'static> {
        Cookie::build((self.client_name.clone(), token.into()))
            .http_only(false)
            .secure(self.secure)
            .same_site(self.same_site)
            .path("/")
            .max_age(self.client_max_age)
            .build()
    }

    /// Store both tokens in the jar.
    pub fn with_tokens(&self, jar: CookieJar, client: &str, server: &str) -> CookieJar {
        jar.add(self.server_cookie(server))
            .add(self.client_cookie(client))
    }

    /// Expire both session cookies, whether or not the caller sent them.
    pub fn cleared(&self, jar: CookieJar) -> CookieJar {
        jar.add(expired(&self.server_name))
            .add(expired(&self.client_name))
    }

    /// The server token presented by the caller: the server cookie, or an
    /// `Authorization: Bearer` header when no cookie is sent.
    pub fn server_token(&self, jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
        jar.get(&self.server_name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
            })
    }
}

fn expired(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

fn to_time(ttl: std::time::Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use budgetdesk_core::config::AuthConfig;

    fn config(environment: &str) -> AppConfig {
        AppConfig {
            environment: environment.to_string(),
            server: Default::default(),
            database: Default::default(),
            cache: Default::default(),
            auth: AuthConfig::with_secret("cookie-test-secret"),
            cookies: Default::default(),
            logging: Default::default(),
        }
    }

    #[test]
    fn test_server_cookie_attributes() {
        let settings = CookieSettings::new(&config("production"));
        let cookie = settings.server_cookie("abc");
        assert_eq!(cookie.name(), "auth_token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(1)));

        let dev = CookieSettings::new(&config("development"));
        assert_eq!(dev.server_cookie("abc").same_site(), Some(SameSite::Lax));
        assert_eq!(dev.server_cookie("abc").secure(), Some(false));
    }

    #[test]
    fn test_client_cookie_is_script_readable() {
        let settings = CookieSettings::new(&config("development"));
        let cookie = settings.client_cookie("xyz");
        assert_eq!(cookie.name(), "client_token");
        assert_eq!(cookie.http_only(), Some(false));
        assert_eq!(cookie.max_age(), Some(time::Duration::minutes(15)));
    }

    #[test]
    fn test_server_token_prefers_cookie() {
        let settings = CookieSettings::new(&config("development"));
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        let empty = CookieJar::new();
        assert_eq!(
            settings.server_token(&empty, &headers).as_deref(),
            Some("from-header")
        );

        let jar = CookieJar::new().add(settings.server_cookie("from-cookie"));
        assert_eq!(
            settings.server_token(&jar, &headers).as_deref(),
            Some("from-cookie")
        );

        assert_eq!(settings.server_token(&empty, &HeaderMap::new()), None);
    }

    #[test]
    fn test_cleared_expires_both_cookies() {
        let settings = CookieSettings::new(&config("development"));
        let jar = settings.cleared(CookieJar::new());
        for name in ["auth_token", "client_token"] {
            let cookie = jar.get(name).unwrap();
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        }
    }
}
