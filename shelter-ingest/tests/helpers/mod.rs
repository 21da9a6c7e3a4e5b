//! Test Helper Utilities
//!
//! In-process mock of the shelter record store, served by axum on an
//! ephemeral port.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use shelter_common::config::RemoteConfig;
use shelter_ingest::services::{Credentials, HttpCareLogStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "tok-123";
pub const USERNAME: &str = "importer";
pub const PASSWORD: &str = "secret";

/// Recorded state of the mock store
pub struct MockStore {
    animals: Vec<Value>,
    /// Animal id whose care logs are refused with 422
    pub archived_animal: Option<u64>,
    /// Animal id whose care logs are stored but answered with a non-JSON body
    pub garbled_animal: Option<u64>,
    pub logins: AtomicUsize,
    pub catalog_fetches: AtomicUsize,
    pub registered: Mutex<Vec<Value>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            animals: vec![
                json!({"id": 1, "name": "Tama"}),
                json!({"id": 2, "name": "Mike"}),
                json!({"id": 3, "name": "Kuro"}),
                json!({"id": 4, "name": "Kuro"}),
                json!({"id": 5, "name": "Shiro"}),
            ],
            archived_animal: None,
            garbled_animal: None,
            logins: AtomicUsize::new(0),
            catalog_fetches: AtomicUsize::new(0),
            registered: Mutex::new(Vec::new()),
        }
    }

    pub fn with_archived_animal(mut self, id: u64) -> Self {
        self.archived_animal = Some(id);
        self
    }

    pub fn with_garbled_created_body(mut self, id: u64) -> Self {
        self.garbled_animal = Some(id);
        self
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn registered(&self) -> Vec<Value> {
        self.registered.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "not authenticated"}))).into_response()
}

async fn login(State(store): State<Arc<MockStore>>, Json(body): Json<Value>) -> Response {
    store.logins.fetch_add(1, Ordering::SeqCst);
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        Json(json!({"access_token": TOKEN, "token_type": "bearer"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad credentials"}))).into_response()
    }
}

async fn animals(State(store): State<Arc<MockStore>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    store.catalog_fetches.fetch_add(1, Ordering::SeqCst);
    Json(Value::Array(store.animals.clone())).into_response()
}

async fn create_care_log(
    State(store): State<Arc<MockStore>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if store.archived_animal.is_some_and(|id| body["animal_id"] == id) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "animal archived"})),
        )
            .into_response();
    }

    let garbled = store.garbled_animal.is_some_and(|id| body["animal_id"] == id);

    let mut registered = store.registered.lock().unwrap();
    registered.push(body);
    if garbled {
        return (StatusCode::CREATED, "<html>created</html>").into_response();
    }
    let id = 1000 + registered.len() as u64;
    (StatusCode::CREATED, Json(json!({"id": id}))).into_response()
}

/// Serve the mock store; returns its base URL
pub async fn spawn_mock_store(store: Arc<MockStore>) -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/animals", get(animals))
        .route("/api/care-logs", post(create_care_log))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// HTTP client pointed at the mock store
pub fn http_store(base_url: &str) -> Arc<HttpCareLogStore> {
    let config = RemoteConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..RemoteConfig::default()
    };
    Arc::new(HttpCareLogStore::new(&config).unwrap())
}

pub fn credentials(password: &str) -> Credentials {
    Credentials {
        username: USERNAME.to_string(),
        password: password.to_string(),
    }
}

/// Fully filled sheet row
pub fn sheet_row(subject: Value, slot: &str) -> Value {
    sheet_row_on(subject, "11/3", slot)
}

/// Fully filled sheet row for a given date cell
pub fn sheet_row_on(subject: Value, date: &str, slot: &str) -> Value {
    json!({
        "subject": subject,
        "date": date,
        "time_slot": slot,
        "appetite": "○",
        "energy": "△",
        "urination": "○",
        "cleaning": "×",
        "stool": "normal"
    })
}
