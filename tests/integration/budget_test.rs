//! Integration tests for budget certificate routes.

mod helpers;

use http::StatusCode;
use serde_json::{Value, json};

use helpers::{Session, TestApp};

fn certificate(number: &str, date: &str) -> Value {
    json!({
        "certificateNumber": number,
        "issuanceDate": date,
        "totalAssignedAmount": 2500.5,
        "rubros": [
            { "name": "Materiales de oficina", "code": "5.3.04", "assignedAmount": 1000 },
            { "name": "Servicios básicos", "code": "5.3.01", "assignedAmount": 1500.5 }
        ]
    })
}

async fn create(app: &TestApp, session: &mut Session, number: &str, date: &str) -> StatusCode {
    app.call(
        session,
        "POST",
        "/budget/create-budget-info",
        Some(certificate(number, date)),
    )
    .await
    .status
}

fn numbers(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|r| r["certificateNumber"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_budget_routes_require_authentication() {
    let app = TestApp::new().await;

    let create = app
        .request(
            "POST",
            "/budget/create-budget-info",
            Some(certificate("1", "2025-01-01")),
            None,
        )
        .await;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);

    let list = app
        .request("GET", "/budget/get-budget-info", None, None)
        .await;
    assert_eq!(list.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_issuance_dates_follow_certificate_order() {
    let app = TestApp::new().await;
    let mut admin = app.login_admin().await;
    let mut user = app.create_user(&mut admin, "lrojas").await;

    assert_eq!(create(&app, &mut user, "1", "2025-01-01").await, StatusCode::CREATED);
    assert_eq!(create(&app, &mut user, "3", "2025-03-01").await, StatusCode::CREATED);

    let too_late = app
        .call(
            &mut user,
            "POST",
            "/budget/create-budget-info",
            Some(certificate("2", "2025-03-15")),
        )
        .await;
    assert_eq!(too_late.status, StatusCode::CONFLICT);
    assert!(too_late.body["message"].as_str().unwrap().contains("2025-03-01"));

    assert_eq!(create(&app, &mut user, "2", "2024-12-01").await, StatusCode::CONFLICT);
    assert_eq!(create(&app, &mut user, "2", "2025-02-01").await, StatusCode::CREATED);
    assert_eq!(create(&app, &mut user, "2", "2025-02-01").await, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_listing_is_sorted_and_filterable() {
    let app = TestApp::new().await;
    let mut admin = app.login_admin().await;
    let mut user = app.create_user(&mut admin, "lrojas").await;

    for (number, date) in [("10", "2025-10-01"), ("2", "2025-02-01"), ("1", "2025-01-01")] {
        assert_eq!(create(&app, &mut user, number, date).await, StatusCode::CREATED);
    }

    let all = app
        .call(&mut user, "GET", "/budget/get-budget-info", None)
        .await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(numbers(&all.body), vec!["1", "2", "10"]);
    assert_eq!(all.body[0]["issuanceDate"], "2025-01-01");
    assert_eq!(all.body[0]["rubros"].as_array().unwrap().len(), 2);

    let filtered = app
        .call(
            &mut user,
            "GET",
            "/budget/get-budget-info?certificateNumber=1",
            None,
        )
        .await;
    assert_eq!(filtered.status, StatusCode::OK);
    assert_eq!(numbers(&filtered.body), vec!["1", "10"]);

    let others = app
        .call(&mut admin, "GET", "/budget/get-budget-info", None)
        .await;
    assert_eq!(others.status, StatusCode::OK);
    assert!(others.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_certificates() {
    let app = TestApp::new().await;
    let mut admin = app.login_admin().await;

    assert_eq!(create(&app, &mut admin, "abc", "2025-01-01").await, StatusCode::CONFLICT);
    assert_eq!(create(&app, &mut admin, "4", "31/12/2025").await, StatusCode::CONFLICT);

    let no_rubros = app
        .call(
            &mut admin,
            "POST",
            "/budget/create-budget-info",
            Some(json!({
                "certificateNumber": "5",
                "issuanceDate": "2025-01-01",
                "totalAssignedAmount": 100,
                "rubros": []
            })),
        )
        .await;
    assert_eq!(no_rubros.status, StatusCode::UNPROCESSABLE_ENTITY);

    let negative = app
        .call(
            &mut admin,
            "POST",
            "/budget/create-budget-info",
            Some(json!({
                "certificateNumber": "5",
                "issuanceDate": "2025-01-01",
                "totalAssignedAmount": -1,
                "rubros": [{ "name": "Viáticos", "code": "5.3.03", "assignedAmount": 1 }]
            })),
        )
        .await;
    assert_eq!(negative.status, StatusCode::UNPROCESSABLE_ENTITY);
}
