// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mock CRM backend and client wiring shared by the integration tests.

#![allow(dead_code)]

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use crm_calendar::client::ApiClient;
use crm_calendar::services::{AuthService, CalendarService};
use crm_calendar::session::{Navigator, Session};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const STALE_ACCESS: &str = "stale-access-token";
pub const FRESH_ACCESS: &str = "fresh-access-token";
pub const REFRESH_TOKEN: &str = "refresh-token-1";
pub const PASSWORD: &str = "correct horse battery staple";
pub const LOGIN_PATH: &str = "/login";
pub const CURRENT_LOCATION: &str = "/calendar/5";

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub query: Option<String>,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// State of the mock backend.
pub struct MockBackend {
    /// Access token the API currently accepts
    pub accepted_access: Mutex<String>,
    /// Access token handed out by the refresh endpoint
    pub issued_access: Mutex<String>,
    /// Access token handed out by the login endpoint
    pub login_access: Mutex<String>,
    /// Refresh token the refresh endpoint accepts
    pub refresh_token: String,
    /// Reject every authenticated call, even with a valid token
    pub reject_all: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    pub refresh_calls: AtomicUsize,
    pub events: Mutex<BTreeMap<String, Value>>,
    /// Replaces the generated list body when set
    pub list_response: Mutex<Option<Value>>,
    pub users: Mutex<Value>,
    pub me_id: Mutex<Value>,
    pub requests: Mutex<Vec<Recorded>>,
    next_id: AtomicU64,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            accepted_access: Mutex::new(FRESH_ACCESS.to_string()),
            issued_access: Mutex::new(FRESH_ACCESS.to_string()),
            login_access: Mutex::new(FRESH_ACCESS.to_string()),
            refresh_token: REFRESH_TOKEN.to_string(),
            reject_all: AtomicBool::new(false),
            refresh_delay_ms: AtomicU64::new(0),
            refresh_calls: AtomicUsize::new(0),
            events: Mutex::new(BTreeMap::new()),
            list_response: Mutex::new(None),
            users: Mutex::new(json!({"results": []})),
            me_id: Mutex::new(json!(1)),
            requests: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(100),
        }
    }
}

impl MockBackend {
    pub fn insert_event(&self, event: Value) {
        let id = id_key(&event["id"]);
        self.events.lock().unwrap().insert(id, event);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Requests matching `method` and `path`, in arrival order.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record(
        &self,
        method: &'static str,
        path: String,
        query: Option<String>,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            query,
            bearer,
            body,
        });
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        let accepted = self.accepted_access.lock().unwrap().clone();
        if self.reject_all.load(Ordering::SeqCst) || presented != Some(accepted.as_str()) {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "detail": "Given token not valid for any token type",
                    "code": "token_not_valid"
                })),
            )
                .into_response());
        }
        Ok(())
    }
}

fn id_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
}

type Shared = State<Arc<MockBackend>>;

async fn list_events(State(b): Shared, RawQuery(query): RawQuery, headers: HeaderMap) -> Response {
    b.record("GET", "/api/calendar/events/".into(), query, &headers, None);
    if let Err(r) = b.authorize(&headers) {
        return r;
    }
    if let Some(body) = b.list_response.lock().unwrap().clone() {
        return Json(body).into_response();
    }
    let events: Vec<Value> = b.events.lock().unwrap().values().cloned().collect();
    Json(Value::Array(events)).into_response()
}

async fn create_event(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST", "/api/calendar/events/".into(), None, &headers, Some(body.clone()));
    if let Err(r) = b.authorize(&headers) {
        return r;
    }
    let id = b.next_id.fetch_add(1, Ordering::SeqCst);
    let mut event = json!({
        "id": id,
        "event_type": "MEETING",
        "start_time": "2026-03-02T09:00:00Z",
        "end_time": "2026-03-02T10:00:00Z",
        "is_all_day": false,
        "participants": []
    });
    merge(&mut event, &body);
    b.insert_event(event.clone());
    (StatusCode::CREATED, Json(event)).into_response()
}

async fn get_event(State(b): Shared, Path(id): Path<String>, headers: HeaderMap) -> Response {
    b.record("GET", format!("/api/calendar/events/{}/", id), None, &headers, None);
    if let Err(r) = b.authorize(&headers) {
        return r;
    }
    match b.events.lock().unwrap().get(&id) {
        Some(event) => Json(event.clone()).into_response(),
        None => not_found(),
    }
}

async fn patch_event(
    State(b): Shared,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    b.record(
        "PATCH",
        format!("/api/calendar/events/{}/", id),
        None,
        &headers,
        Some(body.clone()),
    );
    if let Err(r) = b.authorize(&headers) {
        return r;
    }
    let mut events = b.events.lock().unwrap();
    match events.get_mut(&id) {
        Some(event) => {
            merge(event, &body);
            Json(event.clone()).into_response()
        }
        None => not_found(),
    }
}

async fn delete_event(State(b): Shared, Path(id): Path<String>, headers: HeaderMap) -> Response {
    b.record("DELETE", format!("/api/calendar/events/{}/", id), None, &headers, None);
    if let Err(r) = b.authorize(&headers) {
        return r;
    }
    match b.events.lock().unwrap().remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(),
    }
}

async fn users_for_calendar(State(b): Shared, headers: HeaderMap) -> Response {
    b.record("GET", "/api/users/for_calendar/".into(), None, &headers, None);
    if let Err(r) = b.authorize(&headers) {
        return r;
    }
    Json(b.users.lock().unwrap().clone()).into_response()
}

async fn current_user(State(b): Shared, headers: HeaderMap) -> Response {
    b.record("GET", "/api/users/me/".into(), None, &headers, None);
    if let Err(r) = b.authorize(&headers) {
        return r;
    }
    let id = b.me_id.lock().unwrap().clone();
    Json(json!({"id": id, "email": "me@example.com"})).into_response()
}

async fn obtain_token(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST", "/api/token/".into(), None, &headers, Some(body.clone()));
    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "No active account found with the given credentials"})),
        )
            .into_response();
    }
    let access = b.login_access.lock().unwrap().clone();
    *b.accepted_access.lock().unwrap() = access.clone();
    Json(json!({"access": access, "refresh": b.refresh_token})).into_response()
}

async fn refresh_token(State(b): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    b.record("POST", "/api/token/refresh/".into(), None, &headers, Some(body.clone()));
    b.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = b.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if body["refresh"] != b.refresh_token.as_str() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token is invalid or expired", "code": "token_not_valid"})),
        )
            .into_response();
    }

    let access = b.issued_access.lock().unwrap().clone();
    *b.accepted_access.lock().unwrap() = access.clone();
    Json(json!({"access": access})).into_response()
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
}

/// Start the mock backend on an ephemeral port and return its base URL.
pub async fn spawn_backend(backend: Arc<MockBackend>) -> String {
    let app = Router::new()
        .route("/api/calendar/events/", get(list_events).post(create_event))
        .route(
            "/api/calendar/events/{id}/",
            get(get_event).patch(patch_event).delete(delete_event),
        )
        .route("/api/users/for_calendar/", get(users_for_calendar))
        .route("/api/users/me/", get(current_user))
        .route("/api/token/", post(obtain_token))
        .route("/api/token/refresh/", post(refresh_token))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Navigator that records what it was asked to do.
pub struct RecordingNavigator {
    pub redirects: Mutex<Vec<String>>,
    pub notices: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self {
            redirects: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn redirect_count(&self) -> usize {
        self.redirects.lock().unwrap().len()
    }

    pub fn notice_count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

impl Navigator for RecordingNavigator {
    fn current_location(&self) -> String {
        CURRENT_LOCATION.to_string()
    }

    fn redirect_to_login(&self, login_path: &str) {
        self.redirects.lock().unwrap().push(login_path.to_string());
    }

    fn notify_session_expired(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

/// Client, services and mock backend wired together.
pub struct TestApp {
    pub backend: Arc<MockBackend>,
    pub session: Arc<Session>,
    pub navigator: Arc<RecordingNavigator>,
    pub client: ApiClient,
    pub calendar: CalendarService,
    pub auth: AuthService,
}

/// Initial session contents for a test.
#[derive(Default, Clone, Copy)]
pub struct Seed<'a> {
    pub access: Option<&'a str>,
    pub refresh: Option<&'a str>,
    pub user_id: Option<&'a str>,
}

/// Session holding an expired access token and a valid refresh token.
pub fn stale_session() -> Seed<'static> {
    Seed {
        access: Some(STALE_ACCESS),
        refresh: Some(REFRESH_TOKEN),
        user_id: Some("42"),
    }
}

/// Session whose access token the backend accepts.
pub fn fresh_session() -> Seed<'static> {
    Seed {
        access: Some(FRESH_ACCESS),
        refresh: Some(REFRESH_TOKEN),
        user_id: Some("42"),
    }
}

pub async fn create_test_app(seed: Seed<'_>) -> TestApp {
    let backend = Arc::new(MockBackend::default());
    let url = spawn_backend(backend.clone()).await;
    create_test_app_at(backend, &url, seed)
}

pub fn create_test_app_at(backend: Arc<MockBackend>, url: &str, seed: Seed<'_>) -> TestApp {
    let session = Arc::new(Session::in_memory());
    match (seed.access, seed.refresh) {
        (Some(access), Some(refresh)) => session.set_tokens(access, refresh).unwrap(),
        (Some(access), None) => session.apply_refresh(access, None).unwrap(),
        (None, Some(_)) => panic!("seed a refresh token only together with an access token"),
        (None, None) => {}
    }
    if let Some(user_id) = seed.user_id {
        session.set_user_id(user_id).unwrap();
    }

    let navigator = Arc::new(RecordingNavigator::new());
    let client = ApiClient::new(url, LOGIN_PATH, session.clone(), navigator.clone());

    TestApp {
        backend,
        session,
        navigator,
        calendar: CalendarService::new(client.clone()),
        auth: AuthService::new(client.clone()),
        client,
    }
}

/// A stored calendar event in the backend's JSON shape.
pub fn event_json(id: u64, title: &str, owner: u64) -> Value {
    json!({
        "id": id,
        "title": title,
        "event_type": "MEETING",
        "event_type_display": "Meeting",
        "start_time": "2026-03-02T09:00:00Z",
        "end_time": "2026-03-02T09:30:00Z",
        "is_all_day": false,
        "location": null,
        "description": null,
        "owner": owner,
        "owner_name": "Owner",
        "customer": null,
        "sale": null,
        "participants": [],
        "participants_details": []
    })
}
