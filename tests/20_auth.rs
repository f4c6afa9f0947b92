mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use family_finance_api::auth::generate_jwt;
use uuid::Uuid;

use common::{TestApp, TEST_SECRET};

async fn expenses_with_authorization(app: &TestApp, value: &str) -> StatusCode {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/expenses")
        .header(header::AUTHORIZATION, value)
        .body(Body::empty())
        .unwrap();
    app.send(request).await.status
}

#[tokio::test]
async fn missing_header_is_unauthorized() -> Result<()> {
    let app = TestApp::new();
    let res = app.request(Method::GET, "/api/expenses", None, None).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["code"], "UNAUTHORIZED");
    assert_eq!(res.body["error"], "Missing Authorization header");
    Ok(())
}

#[tokio::test]
async fn malformed_tokens_are_rejected() -> Result<()> {
    let app = TestApp::new();

    assert_eq!(expenses_with_authorization(&app, "Basic abc").await, StatusCode::UNAUTHORIZED);
    assert_eq!(expenses_with_authorization(&app, "Bearer ").await, StatusCode::UNAUTHORIZED);
    assert_eq!(expenses_with_authorization(&app, "Bearer not.a.jwt").await, StatusCode::UNAUTHORIZED);

    let foreign = generate_jwt(Uuid::new_v4(), "some-other-secret", chrono::Duration::hours(1))?;
    assert_eq!(
        expenses_with_authorization(&app, &format!("Bearer {}", foreign)).await,
        StatusCode::UNAUTHORIZED
    );

    let expired = generate_jwt(Uuid::new_v4(), TEST_SECRET, chrono::Duration::hours(-2))?;
    assert_eq!(
        expenses_with_authorization(&app, &format!("Bearer {}", expired)).await,
        StatusCode::UNAUTHORIZED
    );
    Ok(())
}

#[tokio::test]
async fn valid_token_reaches_handler() -> Result<()> {
    let app = TestApp::new();
    let ana = app.user("Ana").await;

    let res = app.get("/api/expenses", &ana).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"], serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn public_routes_need_no_token() -> Result<()> {
    let app = TestApp::new();
    let res = app.request(Method::GET, "/api/categories", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}
