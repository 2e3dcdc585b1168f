//! Access middleware for authenticated routes.
//!
//! Runs the [`AccessGuard`](budgetdesk_auth::AccessGuard) check, exposes
//! the caller as a [`RequestContext`] extension and hands the rotated
//! server token back as a cookie.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};

use budgetdesk_auth::AccessLevel;
use budgetdesk_service::RequestContext;

use crate::state::AppState;

/// Admits any active user.
pub async fn require_authenticated(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    guard_request(state, jar, request, next, AccessLevel::Authenticated).await
}

/// Admits active administrators.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    guard_request(state, jar, request, next, AccessLevel::Admin).await
}

async fn guard_request(
    state: AppState,
    jar: CookieJar,
    mut request: Request,
    next: Next,
    level: AccessLevel,
) -> Response {
    let token = state.cookies.server_token(&jar, request.headers());

    let granted = match state.guard.authorize(token.as_deref(), level).await {
        Ok(granted) => granted,
        Err(denied) => {
            debug!(
                path = %request.uri().path(),
                kind = %denied.error.kind,
                clear_cookie = denied.clear_cookie,
                "Request rejected"
            );
            if denied.clear_cookie {
                return (state.cookies.cleared(jar), denied.error).into_response();
            }
            return denied.error.into_response();
        }
    };

    let rotated = granted.rotated.token.clone();
    request.extensions_mut().insert(RequestContext::new(
        granted.principal.id,
        granted.principal.username,
        rotated.clone(),
    ));

    let mut response = next.run(request).await;

    if !sets_cookie(&response, state.cookies.server_name()) {
        let cookie = state.cookies.server_cookie(rotated);
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => error!(error = %e, "Rotated server cookie is not a valid header value"),
        }
    }

    response
}

/// Whether the handler already set the cookie named `name`.
fn sets_cookie(response: &Response, name: &str) -> bool {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| {
            v.split_once('=')
                .is_some_and(|(cookie_name, _)| cookie_name.trim() == name)
        })
}
