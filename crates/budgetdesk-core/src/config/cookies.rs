//! Session cookie configuration.

use serde::{Deserialize, Serialize};

/// Names of the cookies carrying the session tokens.
///
/// Lifetimes are not configured here: each cookie lives exactly as long
/// as the token it carries (see [`AuthConfig`](super::AuthConfig)).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// HTTP-only cookie holding the long-lived server token.
    #[serde(default = "default_server_cookie")]
    pub server_cookie_name: String,
    /// Script-readable cookie holding the short-lived client token.
    #[serde(default = "default_client_cookie")]
    pub client_cookie_name: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            server_cookie_name: default_server_cookie(),
            client_cookie_name: default_client_cookie(),
        }
    }
}

fn default_server_cookie() -> String {
    "auth_token".to_string()
}

fn default_client_cookie() -> String {
    "client_token".to_string()
}
