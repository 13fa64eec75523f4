// Shared helpers for the integration tests: an in-memory store, recording fakes
// for the summarizer and identity provider, and request builders.

#![allow(dead_code)]

use api_lib::adapters::MemoryDatabase;
use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use summarizer_core::domain::{ExternalIdentity, FileUpload, RelayResponse};
use summarizer_core::ports::{
    DatabaseService, IdentityVerifier, PortError, PortResult, SummarizationService,
};
use tower::ServiceExt;

pub const CLIENT_ID: &str = "test-client.apps.example";
pub const SECRET: &str = "integration-test-secret";
pub const BOUNDARY: &str = "----summarizer-test-boundary";

//=========================================================================================
// Fake summarizer
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayCall {
    File {
        filename: String,
        data: Vec<u8>,
        word_count: String,
    },
    Text {
        text: String,
        word_count: String,
    },
}

#[derive(Clone)]
enum Reply {
    Respond(RelayResponse),
    Unreachable,
}

pub struct FakeSummarizer {
    reply: Mutex<Reply>,
    calls: Mutex<Vec<RelayCall>>,
}

impl FakeSummarizer {
    pub fn new() -> Self {
        Self {
            reply: Mutex::new(Reply::Respond(json_reply(200, r#"{"summary":""}"#))),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond_json(&self, status: u16, body: &str) {
        *self.reply.lock().unwrap() = Reply::Respond(json_reply(status, body));
    }

    pub fn go_unreachable(&self) {
        *self.reply.lock().unwrap() = Reply::Unreachable;
    }

    pub fn calls(&self) -> Vec<RelayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: RelayCall) -> PortResult<RelayResponse> {
        self.calls.lock().unwrap().push(call);
        match self.reply.lock().unwrap().clone() {
            Reply::Respond(response) => Ok(response),
            Reply::Unreachable => Err(PortError::Unavailable("connection refused".to_string())),
        }
    }
}

fn json_reply(status: u16, body: &str) -> RelayResponse {
    RelayResponse {
        status,
        content_type: Some("application/json".to_string()),
        body: Bytes::from(body.to_string()),
    }
}

#[async_trait]
impl SummarizationService for FakeSummarizer {
    async fn summarize_file(&self, file: FileUpload, word_count: &str) -> PortResult<RelayResponse> {
        self.answer(RelayCall::File {
            filename: file.filename,
            data: file.data.to_vec(),
            word_count: word_count.to_string(),
        })
    }

    async fn summarize_text(&self, text: &str, word_count: &str) -> PortResult<RelayResponse> {
        self.answer(RelayCall::Text {
            text: text.to_string(),
            word_count: word_count.to_string(),
        })
    }
}

//=========================================================================================
// Fake identity provider
//=========================================================================================

pub struct FakeIdentityProvider {
    tokens: Mutex<HashMap<String, ExternalIdentity>>,
    unreachable: Mutex<bool>,
}

impl FakeIdentityProvider {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            unreachable: Mutex::new(false),
        }
    }

    /// Makes `token` verify as belonging to `email`, issued for `audience`.
    pub fn accept(&self, token: &str, email: &str, audience: &str) {
        self.tokens.lock().unwrap().insert(
            token.to_string(),
            ExternalIdentity {
                email: email.to_string(),
                audience: audience.to_string(),
            },
        );
    }

    pub fn go_unreachable(&self) {
        *self.unreachable.lock().unwrap() = true;
    }
}

#[async_trait]
impl IdentityVerifier for FakeIdentityProvider {
    async fn verify_id_token(&self, token: &str) -> PortResult<ExternalIdentity> {
        if *self.unreachable.lock().unwrap() {
            return Err(PortError::Unavailable("dns failure".to_string()));
        }
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(PortError::Unauthorized)
    }
}

//=========================================================================================
// Test application
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub db: Arc<MemoryDatabase>,
    pub summarizer: Arc<FakeSummarizer>,
    pub identity: Arc<FakeIdentityProvider>,
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgres://unused/test"),
        ("SECRET", SECRET),
        ("GOOGLE_CLIENT_ID", CLIENT_ID),
        ("SUMMARIZER_URL", "http://127.0.0.1:9"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test configuration must be valid")
}

impl TestApp {
    pub fn new() -> Self {
        let db = Arc::new(MemoryDatabase::new());
        Self::with_store(db.clone(), db)
    }

    /// Serves requests from `store`; `db` is the memory store assertions read.
    pub fn with_store(db: Arc<MemoryDatabase>, store: Arc<dyn DatabaseService>) -> Self {
        let summarizer = Arc::new(FakeSummarizer::new());
        let identity = Arc::new(FakeIdentityProvider::new());
        let state = Arc::new(AppState::new(
            Arc::new(test_config()),
            store,
            summarizer.clone(),
            identity.clone(),
        ));
        let router = build_router(state.clone());

        Self {
            router,
            state,
            db,
            summarizer,
            identity,
        }
    }

    /// Sends one request through the full router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        TestResponse {
            status,
            content_type,
            body,
        }
    }

    /// Signs up and logs in through the HTTP surface, returning the session token.
    pub async fn register(&self, email: &str, password: &str) -> String {
        let signup = self.send(form_request("/signup", email, password)).await;
        assert_eq!(signup.status, StatusCode::OK, "signup failed: {:?}", signup.body);

        let login = self.send(form_request("/login", email, password)).await;
        assert_eq!(login.status, StatusCode::OK, "login failed: {:?}", login.body);
        login.json()["token"]
            .as_str()
            .expect("login returns a token")
            .to_string()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }
}

//=========================================================================================
// Request builders
//=========================================================================================

pub fn form_request(uri: &str, email: &str, password: &str) -> Request<Body> {
    let body = format!(
        "email={}&password={}",
        urlencode(email),
        urlencode(password)
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// A multipart upload with a `file` part and, optionally, a `wordCount` part
/// placed after the file.
pub fn upload_request(
    uri: &str,
    filename: &str,
    contents: &[u8],
    word_count: Option<&str>,
    token: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(b"\r\n");
    if let Some(word_count) = word_count {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"wordCount\"\r\n\r\n{word_count}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    multipart_request(uri, body, token)
}

/// A multipart body that carries only a `wordCount` part.
pub fn upload_request_without_file(uri: &str, token: Option<&str>) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"wordCount\"\r\n\r\n100\r\n--{BOUNDARY}--\r\n"
    );
    multipart_request(uri, body.into_bytes(), token)
}

fn multipart_request(uri: &str, body: Vec<u8>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

fn urlencode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}
