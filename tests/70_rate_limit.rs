mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};

use common::{test_config, RecordingAssistant, TestApp};

#[tokio::test]
async fn the_101st_api_request_is_rejected() -> Result<()> {
    let app = TestApp::new();

    // Mixed paths, including unknown ones, share one counter
    for i in 0..100 {
        let uri = match i % 3 {
            0 => "/api/categories",
            1 => "/api/expenses",
            _ => "/api/unknown",
        };
        let res = app.request(Method::GET, uri, None, None).await;
        assert_ne!(res.status, StatusCode::TOO_MANY_REQUESTS, "request {} was limited", i + 1);
    }

    let res = app.request(Method::GET, "/api/categories", None, None).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.body["error"], "Too many requests from this IP, please try again later.");
    assert!(res.headers.contains_key("retry-after"));

    // Non-API routes are not counted
    let res = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn limit_headers_count_down() -> Result<()> {
    let app = TestApp::new();

    let first = app.request(Method::GET, "/api/categories", None, None).await;
    assert_eq!(first.headers["x-ratelimit-limit"], "100");
    assert_eq!(first.headers["x-ratelimit-remaining"], "99");

    let second = app.request(Method::GET, "/api/categories", None, None).await;
    assert_eq!(second.headers["x-ratelimit-remaining"], "98");
    Ok(())
}

#[tokio::test]
async fn forwarded_clients_are_counted_separately_when_trusted() -> Result<()> {
    let mut config = test_config();
    config.api.rate_limit_requests = 1;
    config.api.trust_proxy_headers = true;
    let app = TestApp::build(config, RecordingAssistant::default());

    let from = |ip: &str| {
        Request::builder()
            .uri("/api/categories")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(app.send(from("203.0.113.1")).await.status, StatusCode::OK);
    assert_eq!(app.send(from("203.0.113.1")).await.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(app.send(from("203.0.113.2")).await.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn disabled_limiter_never_rejects() -> Result<()> {
    let mut config = test_config();
    config.api.rate_limit_requests = 1;
    config.api.enable_rate_limiting = false;
    let app = TestApp::build(config, RecordingAssistant::default());

    for _ in 0..3 {
        let res = app.request(Method::GET, "/api/categories", None, None).await;
        assert_eq!(res.status, StatusCode::OK);
    }
    Ok(())
}
