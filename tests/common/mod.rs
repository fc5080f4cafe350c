//! Common test utilities for integration tests.
//!
//! Every test gets its own in-process mock of the backend API, bound to an
//! OS-assigned port, and a [`TestClient`] that drives the portal router with
//! `oneshot` while keeping a small cookie jar between requests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Request, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use sacco_portal::auth::SESSION_COOKIE;
use sacco_portal::config::Config;
use sacco_portal::server::build_app;
use sacco_portal::state::AppState;
use sacco_portal::xsrf::XSRF_FORM_FIELD;

pub const PASSWORD: &str = "secret";
pub const DIRECTOR_EMAIL: &str = "director@umoja.test";
pub const FINANCE_EMAIL: &str = "finance@umoja.test";
pub const MEMBER_EMAIL: &str = "member@umoja.test";

/// CRUD resources served by the mock, by backend path segment.
const RESOURCES: &[&str] = &[
    "division",
    "partner-type",
    "partner",
    "chart-of-accounts",
    "account",
    "journal-type",
    "journal",
];

const REPORTS: &[&str] = &[
    "profit-and-loss",
    "balance-sheet",
    "trial-balance",
    "revenue",
    "cash-balance",
];

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Store {
    records: HashMap<String, Vec<Value>>,
    next_id: i64,
    /// Last JSON body received per `"METHOD /path"`.
    bodies: HashMap<String, Value>,
    /// Last query string received per path.
    queries: HashMap<String, String>,
    /// Number of requests per `"METHOD /path"`.
    hits: HashMap<String, usize>,
    tokens: Vec<String>,
    /// Status and body returned by the next create/update instead of storing.
    reject_next: Option<(StatusCode, Value)>,
}

/// Handle onto the mock backend's in-memory store.
#[derive(Clone, Default)]
pub struct MockBackend {
    store: Arc<Mutex<Store>>,
    pub url: String,
}

impl MockBackend {
    /// Seed the store and serve it on `127.0.0.1:0`.
    pub async fn start() -> Self {
        let mut backend = MockBackend::default();
        backend.seed();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr: SocketAddr = listener.local_addr().expect("No local address");
        backend.url = format!("http://{}", addr);

        let app = backend.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock backend failed");
        });
        backend
    }

    fn seed(&self) {
        let mut store = self.lock();
        let rows = |items: Value| items.as_array().cloned().unwrap_or_default();
        store.records.insert(
            "division".into(),
            rows(json!([
                {"id": 1, "name": "Head Office", "code": "HQ", "description": "Nairobi head office"},
                {"id": 2, "name": "Nakuru Branch", "code": "NKR"}
            ])),
        );
        store.records.insert(
            "partner-type".into(),
            rows(json!([{"id": 1, "name": "Supplier"}, {"id": 2, "name": "Employer"}])),
        );
        store.records.insert(
            "partner".into(),
            rows(json!([
                {"id": 1, "name": "Acme Supplies", "partner_type_id": 1,
                 "email": "accounts@acme.test", "division_id": 1}
            ])),
        );
        store.records.insert(
            "chart-of-accounts".into(),
            rows(json!([
                {"id": 1, "code": "1000", "name": "Cash and Bank", "category": "asset", "is_active": true},
                {"id": 2, "code": "4000", "name": "Interest Income", "category": "INCOME", "is_active": true}
            ])),
        );
        store.records.insert(
            "account".into(),
            rows(json!([
                {"id": 1, "number": "CASH-01", "name": "Main Till", "coa_id": 1, "balance": "1500.00"},
                {"id": 2, "number": "INC-01", "name": "Loan Interest", "coa_id": 2, "balance": 250}
            ])),
        );
        store.records.insert(
            "journal-type".into(),
            rows(json!([{"id": 1, "code": "GJ", "name": "General Journal"}])),
        );
        store.records.insert(
            "journal".into(),
            rows(json!([
                {"id": 1, "reference": "JV-0001", "journal_type_id": 1, "date": "2025-01-15",
                 "status": "draft", "description": "Opening float",
                 "lines": [
                    {"account_id": 1, "account_name": "Main Till", "debit": "100.00", "credit": 0},
                    {"account_id": 2, "account_name": "Loan Interest", "debit": 0, "credit": "100.00"}
                 ]},
                {"id": 2, "reference": "JV-0002", "journal_type_id": 1, "date": "2025-01-20",
                 "status": "posted", "lines": []}
            ])),
        );
        store.next_id = 100;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/logout", post(logout))
            .route("/api/v1/journal/:id/post", post(post_journal));

        for resource in RESOURCES {
            router = router
                .route(&format!("/api/v1/{}", resource), get(list).post(create))
                .route(
                    &format!("/api/v1/{}/:id", resource),
                    get(show).put(update).delete(remove),
                );
        }
        for report in REPORTS {
            router = router.route(&format!("/api/v1/reports/{}", report), get(report_handler));
        }

        router
            .layer(middleware::from_fn_with_state(self.clone(), record_and_authorize))
            .with_state(self.clone())
    }

    /// How many times `method path` was requested.
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.lock()
            .hits
            .get(&format!("{} {}", method, path))
            .copied()
            .unwrap_or(0)
    }

    /// The last JSON body sent with `method path`.
    pub fn last_body(&self, method: &str, path: &str) -> Option<Value> {
        self.lock().bodies.get(&format!("{} {}", method, path)).cloned()
    }

    pub fn last_query(&self, path: &str) -> Option<String> {
        self.lock().queries.get(path).cloned()
    }

    pub fn records(&self, resource: &str) -> Vec<Value> {
        self.lock().records.get(resource).cloned().unwrap_or_default()
    }

    /// Make the next create or update fail with `status` and `body`.
    pub fn reject_next(&self, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).expect("Invalid status");
        self.lock().reject_next = Some((status, body));
    }

    /// Forget every issued token, so the next call gets a 401.
    pub fn expire_tokens(&self) {
        self.lock().tokens.clear();
    }
}

fn resource_of(uri: &Uri) -> String {
    uri.path().split('/').nth(3).unwrap_or_default().to_string()
}

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthenticated."})),
    )
        .into_response()
}

async fn record_and_authorize(
    State(mock): State<MockBackend>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let key = format!("{} {}", request.method(), path);
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    let (parts, body) = request.into_parts();
    let bytes = body
        .collect()
        .await
        .map(|b| b.to_bytes())
        .unwrap_or_default();

    {
        let mut store = mock.lock();
        *store.hits.entry(key.clone()).or_default() += 1;
        if let Some(query) = parts.uri.query() {
            store.queries.insert(path.clone(), query.to_string());
        }
        if let Ok(value) = serde_json::from_slice::<Value>(&bytes) {
            store.bodies.insert(key, value);
        }
        if path != "/api/v1/auth/login" {
            let valid = bearer.is_some_and(|t| store.tokens.contains(&t));
            if !valid {
                return unauthenticated();
            }
        }
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn login(State(mock): State<MockBackend>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let (id, name, role) = match email {
        DIRECTOR_EMAIL => (1, "Grace Wanjiru", "director"),
        FINANCE_EMAIL => (2, "Peter Otieno", "Finance"),
        MEMBER_EMAIL => (3, "Mary Achieng", "member"),
        _ => return unauthenticated(),
    };
    if password != PASSWORD {
        return unauthenticated();
    }

    let token = format!("token-{}-{}", role.to_lowercase(), next_token_id(&mock));
    mock.lock().tokens.push(token.clone());
    Json(json!({
        "data": {
            "token": token,
            "user": {"id": id, "name": name, "email": email, "role": role}
        }
    }))
    .into_response()
}

fn next_token_id(mock: &MockBackend) -> i64 {
    let mut store = mock.lock();
    store.next_id += 1;
    store.next_id
}

async fn logout(State(mock): State<MockBackend>, headers: HeaderMap) -> StatusCode {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();
    mock.lock().tokens.retain(|t| *t != bearer);
    StatusCode::NO_CONTENT
}

async fn list(State(mock): State<MockBackend>, uri: Uri) -> Response {
    let records = mock.records(&resource_of(&uri));
    Json(json!({ "data": records })).into_response()
}

async fn show(State(mock): State<MockBackend>, uri: Uri, Path(id): Path<i64>) -> Response {
    let found = mock
        .records(&resource_of(&uri))
        .into_iter()
        .find(|r| r["id"] == id);
    match found {
        // Single records come back bare.
        Some(record) => Json(record).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Record not found."})),
        )
            .into_response(),
    }
}

async fn create(State(mock): State<MockBackend>, uri: Uri, body: Bytes) -> Response {
    let mut store = mock.lock();
    if let Some((status, body)) = store.reject_next.take() {
        return (status, Json(body)).into_response();
    }
    let Ok(mut record) = serde_json::from_slice::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    store.next_id += 1;
    record["id"] = json!(store.next_id);
    let resource = resource_of(&uri);
    if resource == "journal" {
        record["status"] = json!("draft");
    }
    store
        .records
        .entry(resource)
        .or_default()
        .push(record.clone());
    (StatusCode::CREATED, Json(json!({ "data": record }))).into_response()
}

async fn update(
    State(mock): State<MockBackend>,
    uri: Uri,
    Path(id): Path<i64>,
    body: Bytes,
) -> Response {
    let mut store = mock.lock();
    if let Some((status, body)) = store.reject_next.take() {
        return (status, Json(body)).into_response();
    }
    let Ok(Value::Object(changes)) = serde_json::from_slice::<Value>(&body) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let records = store.records.entry(resource_of(&uri)).or_default();
    let Some(record) = records.iter_mut().find(|r| r["id"] == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    for (key, value) in changes {
        record[key.as_str()] = value;
    }
    Json(record.clone()).into_response()
}

async fn remove(State(mock): State<MockBackend>, uri: Uri, Path(id): Path<i64>) -> StatusCode {
    let mut store = mock.lock();
    let records = store.records.entry(resource_of(&uri)).or_default();
    let before = records.len();
    records.retain(|r| r["id"] != id);
    if records.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn post_journal(State(mock): State<MockBackend>, Path(id): Path<i64>) -> Response {
    let mut store = mock.lock();
    let journals = store.records.entry("journal".into()).or_default();
    match journals.iter_mut().find(|j| j["id"] == id) {
        Some(journal) if journal["status"] == "posted" => (
            StatusCode::CONFLICT,
            Json(json!({"message": "Journal is already posted."})),
        )
            .into_response(),
        Some(journal) => {
            journal["status"] = json!("posted");
            Json(json!({"data": journal.clone()})).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn report_handler(uri: Uri) -> Json<Value> {
    let body = match uri.path().rsplit('/').next().unwrap_or_default() {
        "profit-and-loss" => json!({
            "income": [{"code": "4000", "name": "Interest Income", "amount": "1250.50"}],
            "expenses": [{"code": "5000", "name": "Salaries", "amount": 800}]
        }),
        "balance-sheet" => json!({
            "assets": [{"code": "1000", "name": "Cash and Bank", "balance": "1500.00"}],
            "liabilities": [{"code": "2000", "name": "Member Deposits", "balance": "1000.00"}],
            "equity": [{"code": "3000", "name": "Share Capital", "balance": "500.00"}]
        }),
        "trial-balance" => json!({
            "rows": [
                {"code": "1000", "name": "Cash and Bank", "debit": "1500.00", "credit": 0},
                {"code": "2000", "name": "Member Deposits", "debit": 0, "credit": "1500.00"}
            ]
        }),
        "revenue" => json!({
            "rows": [{"name": "Loan Interest", "amount": "900.00"}]
        }),
        _ => json!({
            "accounts": [{"code": "CASH-01", "name": "Main Till", "balance": "1500.00"}]
        }),
    };
    Json(json!({ "data": body }))
}

// ---------------------------------------------------------------------------
// Portal client
// ---------------------------------------------------------------------------

/// Markup of an inline form error, as rendered under a field.
pub fn field_error(message: &str) -> String {
    format!(r#"<p class="field-error">{}</p>"#, message)
}

/// A response with its body collected into a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[track_caller]
    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(
            self.status,
            StatusCode::SEE_OTHER,
            "expected redirect to {}, body: {}",
            to,
            self.body
        );
        assert_eq!(self.location(), Some(to));
    }
}

/// Test client wrapping the portal router, a cookie jar and the mock backend.
pub struct TestClient {
    app: Router,
    state: AppState,
    pub backend: MockBackend,
    cookies: Mutex<HashMap<String, String>>,
}

impl TestClient {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Build a client after adjusting the default test configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let backend = MockBackend::start().await;
        let mut config = Config {
            api_base_url: backend.url.clone(),
            ..Config::default()
        };
        adjust(&mut config);
        let (state, app) = build_app(config).expect("Failed to build app");

        Self {
            app,
            state,
            backend,
            cookies: Mutex::new(HashMap::new()),
        }
    }

    pub async fn as_director() -> Self {
        let client = Self::new().await;
        client.login(DIRECTOR_EMAIL).await;
        client
    }

    pub async fn as_finance() -> Self {
        let client = Self::new().await;
        client.login(FINANCE_EMAIL).await;
        client
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Sign in through the login form and check it lands on a portal home.
    pub async fn login(&self, email: &str) {
        let resp = self
            .post_form("/login", &[("email", email), ("password", PASSWORD)])
            .await;
        assert_eq!(resp.status, StatusCode::SEE_OTHER, "login failed: {}", resp.body);
        // Consume the welcome toast.
        if let Some(to) = resp.location() {
            let to = to.to_string();
            self.get(&to).await;
        }
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn session_id(&self) -> Option<String> {
        self.cookie(SESSION_COOKIE)
    }

    /// Token the portal expects on the next mutating request.
    pub fn xsrf_token(&self) -> String {
        self.session_id()
            .and_then(|id| self.state.sessions.get(&id))
            .map(|s| s.xsrf_token)
            .unwrap_or_else(|| self.state.xsrf_token.value().to_string())
    }

    fn cookie_header(&self) -> String {
        self.cookies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn store_cookies(&self, headers: &HeaderMap) {
        let mut jar = self.cookies.lock().unwrap_or_else(|e| e.into_inner());
        for value in headers.get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let expired = raw.to_ascii_lowercase().contains("max-age=0");
            if value.is_empty() || expired {
                jar.remove(name.trim());
            } else {
                jar.insert(name.trim().to_string(), value.to_string());
            }
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        self.store_cookies(&headers);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).to_string(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::COOKIE, self.cookie_header())
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// GET with the `HX-Request` header set.
    pub async fn get_htmx(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::COOKIE, self.cookie_header())
            .header("HX-Request", "true")
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// POST a urlencoded form, adding the expected XSRF token.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let token = self.xsrf_token();
        let mut pairs = vec![(XSRF_FORM_FIELD, token.as_str())];
        pairs.extend_from_slice(fields);
        self.post_raw(uri, &pairs).await
    }

    /// POST exactly the given fields, with no token added.
    pub async fn post_raw(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(fields).expect("Failed to encode form");
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::COOKIE, self.cookie_header())
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Follow a redirect response with a GET.
    pub async fn follow(&self, response: &TestResponse) -> TestResponse {
        let to = response
            .location()
            .expect("Response is not a redirect")
            .to_string();
        self.get(&to).await
    }
}
