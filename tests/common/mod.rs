#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use family_finance_api::ai::{AiError, CompletionClient};
use family_finance_api::auth::generate_jwt;
use family_finance_api::config::AppConfig;
use family_finance_api::database::{DatabaseManager, MemoryStore, PgStore, Store, UserRepository};
use family_finance_api::models::NewUser;
use family_finance_api::{app, AppState};

// ---------------------------------------------------------------------------
// Spawned binary
// ---------------------------------------------------------------------------

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_family-finance-api"));
        cmd.env("PORT", port.to_string())
            .env("HOST", "127.0.0.1")
            .env("APP_ENV", "development")
            // Empty selects the in-memory store even if .env names a database
            .env("DATABASE_URL", "")
            .env("JWT_SECRET", TEST_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

// ---------------------------------------------------------------------------
// In-process router
// ---------------------------------------------------------------------------

pub const TEST_SECRET: &str = "integration-test-secret";

/// Completion client that records prompts and replies with a canned answer.
#[derive(Default)]
pub struct RecordingAssistant {
    pub prompts: Mutex<Vec<String>>,
    /// `None` makes every call fail.
    pub answer: Option<String>,
}

impl RecordingAssistant {
    pub fn answering(answer: &str) -> Self {
        Self {
            prompts: Mutex::default(),
            answer: Some(answer.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for RecordingAssistant {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.clone().ok_or(AiError::MissingApiKey)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_SECRET.to_string();
    config
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub assistant: Arc<RecordingAssistant>,
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(test_config(), RecordingAssistant::answering("Track every expense."))
    }

    pub fn build(config: AppConfig, assistant: RecordingAssistant) -> Self {
        let store = Arc::new(MemoryStore::new());
        let assistant = Arc::new(assistant);
        let state = AppState::with_assistant(config, store.clone() as Arc<dyn Store>, assistant.clone());
        Self {
            router: app(state),
            store,
            assistant,
        }
    }

    /// Register a user directly in the store and mint a token for them.
    pub async fn user(&self, name: &str) -> TestUser {
        let email = format!("{}@example.com", name.to_lowercase());
        let user = self
            .store
            .insert_user(NewUser::new(name, email, "not-a-real-hash"))
            .await
            .expect("insert user");
        let token = generate_jwt(user.id, TEST_SECRET, chrono::Duration::hours(1)).expect("token");
        TestUser { id: user.id, token }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, headers, body }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> TestResponse {
        self.request(Method::GET, uri, Some(&user.token), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(&user.token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &TestUser, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(&user.token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> TestResponse {
        self.request(Method::DELETE, uri, Some(&user.token), None).await
    }
}

// ---------------------------------------------------------------------------
// Live database
// ---------------------------------------------------------------------------

/// Postgres store for `DATABASE_URL`, migrated. `None` (and the calling test
/// returns early) when the variable is unset or empty.
pub async fn pg_store() -> Result<Option<PgStore>> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set; skipping Postgres test");
            return Ok(None);
        }
    };

    let settings = AppConfig::development().database;
    let pool = DatabaseManager::connect(&url, &settings).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Some(PgStore::new(pool)))
}

/// Address unique to one test run, so repeated runs never collide.
pub fn unique_email(name: &str) -> String {
    format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4())
}
