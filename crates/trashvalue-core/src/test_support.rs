//! Fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;

use crate::api::{ApiClient, ApiError, ApiResult, HttpRequest, HttpResponse, Transport};
use crate::auth::{Clock, CredentialError, CredentialStore, MemoryCredentialStore, SessionStore};

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self(
            Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Credential store whose backend is always unreachable.
pub struct FailingCredentialStore;

#[async_trait]
impl CredentialStore for FailingCredentialStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CredentialError> {
        Err(CredentialError::Unavailable("keychain locked".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), CredentialError> {
        Err(CredentialError::Unavailable("keychain locked".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CredentialError> {
        Err(CredentialError::Unavailable("keychain locked".to_string()))
    }
}

/// Memory store that yields to the scheduler after every read, so
/// concurrent callers interleave between reading and deleting the token.
/// Counts the reads that found a value and every delete.
#[derive(Default)]
pub struct YieldingCredentialStore {
    inner: MemoryCredentialStore,
    hits: AtomicUsize,
    deletes: AtomicUsize,
}

impl YieldingCredentialStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: MemoryCredentialStore::with_token(token),
            ..Default::default()
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for YieldingCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let value = self.inner.get(key).await?;
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
        tokio::task::yield_now().await;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), CredentialError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }
}

#[derive(Default)]
struct Script {
    responses: VecDeque<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// Transport that replays queued responses in order and records every
/// request it sees. Clones share the same script.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: StatusCode, body: serde_json::Value) {
        self.push_status(status, &body.to_string());
    }

    pub fn push_status(&self, status: StatusCode, body: &str) {
        self.script
            .lock()
            .unwrap()
            .responses
            .push_back(HttpResponse::new(status, body));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request);
        script
            .responses
            .pop_front()
            .ok_or_else(|| ApiError::InvalidResponse("no scripted response left".to_string()))
    }
}

/// Unsigned token for the test user expiring at `exp` (unix seconds).
pub fn make_token(exp: i64) -> String {
    make_token_with_payload(
        &serde_json::json!({
            "id": "user-1",
            "name": "Siti Rahma",
            "phone": "08123456789",
            "email": "siti@example.com",
            "role": "USER",
            "iat": exp - 86_400,
            "exp": exp,
        })
        .to_string(),
    )
}

/// Token with an arbitrary raw payload.
pub fn make_token_with_payload(payload: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    format!("{}.{}.sig", header, URL_SAFE_NO_PAD.encode(payload))
}

/// Client over `transport` with a fresh session and the fixed clock.
pub fn test_client(
    transport: &ScriptedTransport,
    credentials: MemoryCredentialStore,
) -> (ApiClient, Arc<MemoryCredentialStore>) {
    let credentials = Arc::new(credentials);
    let client = ApiClient::new(
        Arc::new(transport.clone()),
        credentials.clone(),
        SessionStore::new(),
        Arc::new(FixedClock::default()),
    );
    (client, credentials)
}
