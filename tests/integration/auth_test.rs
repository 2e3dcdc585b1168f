//! Integration tests for the account and session flow.

mod helpers;

use http::StatusCode;

use helpers::{ADMIN_EMAIL, ADMIN_PASSWORD, CLIENT_COOKIE, SERVER_COOKIE, TestApp};

#[tokio::test]
async fn test_login_sets_both_tokens() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": ADMIN_EMAIL,
                "password": ADMIN_PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let client_token = response.body["clientToken"].as_str().unwrap();
    assert_eq!(response.cookie(CLIENT_COOKIE), Some(client_token));

    let server_token = response.cookie(SERVER_COOKIE).unwrap();
    let client = app.state.codec.verify(client_token).unwrap();
    let server = app.state.codec.verify(server_token).unwrap();
    assert_eq!(client.id, server.id);
    assert!(client.exp < server.exp);
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new().await;

    let wrong_password = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({ "email": ADMIN_EMAIL, "password": "Wrong123!" })),
            None,
        )
        .await;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);

    let unknown = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({ "email": "nobody@example.com", "password": "Secreto1!" })),
            None,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let malformed = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({ "email": "not-an-email", "password": "x" })),
            None,
        )
        .await;
    assert_eq!(malformed.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_requires_admin() {
    let app = TestApp::new().await;
    let body = serde_json::json!({
        "username": "mgarcia",
        "email": "mgarcia@example.com",
        "password": "Secreto1!",
    });

    let anonymous = app
        .request("POST", "/auth/register", Some(body.clone()), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body["message"], "User is not authenticated");

    let mut admin = app.login_admin().await;
    let mut user = app.create_user(&mut admin, "lrojas").await;
    let forbidden = app
        .call(&mut user, "POST", "/auth/register", Some(body.clone()))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let created = app
        .call(&mut admin, "POST", "/auth/register", Some(body.clone()))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["user"]["username"], "mgarcia");
    assert_eq!(created.body["user"]["role"], "USER");
    assert!(created.body["user"].get("passwordHash").is_none());

    let duplicate = app
        .call(&mut admin, "POST", "/auth/register", Some(body))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new().await;
    let mut admin = app.login_admin().await;

    let short_username = app
        .call(
            &mut admin,
            "POST",
            "/auth/register",
            Some(serde_json::json!({
                "username": "abc",
                "email": "abc@example.com",
                "password": "Secreto1!",
            })),
        )
        .await;
    assert_eq!(short_username.status, StatusCode::UNPROCESSABLE_ENTITY);

    let weak_password = app
        .call(
            &mut admin,
            "POST",
            "/auth/register",
            Some(serde_json::json!({
                "username": "mgarcia",
                "email": "mgarcia@example.com",
                "password": "secreto12",
            })),
        )
        .await;
    assert_eq!(weak_password.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_every_request_rotates_the_server_token() {
    let app = TestApp::new().await;
    let mut admin = app.login_admin().await;
    let first = admin.server_token.clone();

    let response = app
        .call(&mut admin, "POST", "/auth/refresh-token", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["clientToken"].is_string());
    assert_ne!(admin.server_token, first);

    let replay = app
        .request("POST", "/auth/refresh-token", None, Some(&first))
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert!(replay.clears(SERVER_COOKIE));

    let current = app
        .call(&mut admin, "POST", "/auth/refresh-token", None)
        .await;
    assert_eq!(current.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_the_token() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;

    let response = app
        .request("POST", "/auth/logout", None, Some(&admin.server_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.clears(SERVER_COOKIE));
    assert!(response.clears(CLIENT_COOKIE));

    assert!(app.state.codec.verify(&admin.server_token).is_ok());
    let after = app
        .request("POST", "/auth/refresh-token", None, Some(&admin.server_token))
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    let anonymous = app.request("POST", "/auth/logout", None, None).await;
    assert_eq!(anonymous.status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_own_profile_reissues_tokens() {
    let app = TestApp::new().await;
    let mut admin = app.login_admin().await;
    let mut user = app.create_user(&mut admin, "lrojas").await;
    let before = user.server_token.clone();

    let empty = app
        .call(&mut user, "PATCH", "/auth/update", Some(serde_json::json!({})))
        .await;
    assert_eq!(empty.status, StatusCode::UNPROCESSABLE_ENTITY);

    let updated = app
        .call(
            &mut user,
            "PATCH",
            "/auth/update",
            Some(serde_json::json!({ "username": "lrojas2025" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    let claims = app.state.codec.verify(&user.client_token).unwrap();
    assert_eq!(claims.username, "lrojas2025");

    let stale = app
        .request("POST", "/auth/refresh-token", None, Some(&before))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let fresh = app
        .call(&mut user, "POST", "/auth/refresh-token", None)
        .await;
    assert_eq!(fresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_update_changes_role() {
    let app = TestApp::new().await;
    let mut admin = app.login_admin().await;
    let user = app.create_user(&mut admin, "lrojas").await;
    let user_id = app.state.codec.verify(&user.server_token).unwrap().id;

    let response = app
        .call(
            &mut admin,
            "PATCH",
            &format!("/auth/update/{user_id}"),
            Some(serde_json::json!({ "role": "ADMIN" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["role"], "ADMIN");

    let bad_id = app
        .call(
            &mut admin,
            "PATCH",
            "/auth/update/not-a-uuid",
            Some(serde_json::json!({ "role": "ADMIN" })),
        )
        .await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_and_activate_user() {
    let app = TestApp::new().await;
    let mut admin = app.login_admin().await;
    let admin_id = app.state.codec.verify(&admin.server_token).unwrap().id;
    let mut user = app.create_user(&mut admin, "lrojas").await;
    let user_id = app.state.codec.verify(&user.server_token).unwrap().id;

    let own = app
        .call(&mut admin, "DELETE", &format!("/auth/delete/{admin_id}"), None)
        .await;
    assert_eq!(own.status, StatusCode::FORBIDDEN);

    let deleted = app
        .call(&mut admin, "DELETE", &format!("/auth/delete/{user_id}"), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let inactive = app
        .call(&mut user, "POST", "/auth/refresh-token", None)
        .await;
    assert_eq!(inactive.status, StatusCode::UNAUTHORIZED);
    assert!(inactive.clears(SERVER_COOKIE));

    let blocked = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "lrojas@example.com",
                "password": "Secreto1!",
            })),
            None,
        )
        .await;
    assert_eq!(blocked.status, StatusCode::UNAUTHORIZED);

    let activated = app
        .call(&mut admin, "PATCH", &format!("/auth/activate/{user_id}"), None)
        .await;
    assert_eq!(activated.status, StatusCode::OK);
    app.login("lrojas@example.com", "Secreto1!").await;
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["cache"], "connected");
}
