//! Auth handlers: accounts, login, logout and token renewal.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use budgetdesk_auth::TokenPayload;
use budgetdesk_core::error::AppError;

use crate::dto::request::{AdminUpdateUserRequest, LoginRequest, RegisterRequest, UpdateUserRequest};
use crate::dto::response::{ClientTokenResponse, MessageResponse, UserMessageResponse};
use crate::extractors::{AuthUser, IdPath, ValidatedJson};
use crate::state::AppState;

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserMessageResponse>), AppError> {
    let user = state.authority.register(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserMessageResponse {
            message: "User registered successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ClientTokenResponse>), AppError> {
    let pair = state.authority.login(req.into()).await?;
    let jar = state
        .cookies
        .with_tokens(jar, &pair.client_token, &pair.server_token);

    Ok((
        jar,
        Json(ClientTokenResponse {
            client_token: pair.client_token,
        }),
    ))
}

/// PATCH /auth/update
///
/// Both tokens are reissued; the server cookie set here replaces the one
/// the access middleware would otherwise attach.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<(CookieJar, Json<ClientTokenResponse>), AppError> {
    let rotated = state
        .authority
        .update_user(auth.user_id, &auth.server_token, req.into())
        .await?;
    let jar = state
        .cookies
        .with_tokens(jar, &rotated.client.token, &rotated.server.token);

    Ok((
        jar,
        Json(ClientTokenResponse {
            client_token: rotated.client.token,
        }),
    ))
}

/// PATCH /auth/update/{id}
pub async fn update_by_admin(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    ValidatedJson(req): ValidatedJson<AdminUpdateUserRequest>,
) -> Result<Json<UserMessageResponse>, AppError> {
    let user = state.authority.update_user_as_admin(id, req.into()).await?;

    Ok(Json(UserMessageResponse {
        message: "User updated successfully".to_string(),
        user: user.into(),
    }))
}

/// POST /auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ClientTokenResponse>), AppError> {
    let client = state
        .authority
        .refresh_client_token(&TokenPayload::identity(auth.user_id, auth.username.clone()))
        .await?;
    let jar = jar.add(state.cookies.client_cookie(client.token.clone()));

    Ok((
        jar,
        Json(ClientTokenResponse {
            client_token: client.token,
        }),
    ))
}

/// POST /auth/logout
///
/// Always clears the session cookies; the server token, when present, is
/// revoked first.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let token = state.cookies.server_token(&jar, &headers);

    if let Some(claims) = token.as_deref().and_then(|t| state.codec.decode(t)) {
        info!(user_id = %claims.id, "User logging out");
    }
    state.authority.logout(token.as_deref()).await?;

    Ok((
        state.cookies.cleared(jar),
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

/// DELETE /auth/delete/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, AppError> {
    state.authority.delete_user(id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// PATCH /auth/activate/{id}
pub async fn activate_user(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<MessageResponse>, AppError> {
    state.authority.activate_user(id).await?;
    Ok(Json(MessageResponse::new("User activated successfully")))
}
