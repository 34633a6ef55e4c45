//! In-process mock of the club administration API.
//!
//! Serves every collection from an in-memory JSON store with the same
//! query parameters, status codes and error bodies as the real server.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Map, Value};

use clubdesk_client::{ApiClient, ClientConfig};

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_PASSWORD: &str = "secret";

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub request_id: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<String, BTreeMap<i64, Value>>,
    next_id: i64,
    requests: Vec<RecordedRequest>,
    reject_next_write: Option<(StatusCode, Value)>,
    search_delays: HashMap<String, u64>,
    uploads: Vec<(String, usize)>,
}

#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Insert a record directly, returning its id.
    pub fn seed(&self, collection: &str, mut record: Value) -> i64 {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        record["id"] = json!(id);
        inner
            .records
            .entry(collection.to_string())
            .or_default()
            .insert(id, record);
        id
    }

    /// Drop every record of a collection.
    pub fn clear(&self, collection: &str) {
        self.lock().records.remove(collection);
    }

    pub fn record(&self, collection: &str, id: i64) -> Option<Value> {
        self.lock().records.get(collection)?.get(&id).cloned()
    }

    /// Reject the next create/update with this status and body.
    pub fn reject_next_write(&self, status: StatusCode, body: Value) {
        self.lock().reject_next_write = Some((status, body));
    }

    /// Delay list responses whose `search` equals `term`.
    pub fn delay_search(&self, term: &str, millis: u64) {
        self.lock().search_delays.insert(term.to_string(), millis);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Requests whose method and path match.
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.lock().uploads.clone()
    }

    fn remember(&self, method: &str, path: String, query: HashMap<String, String>, headers: &HeaderMap) {
        let header_value = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let request = RecordedRequest {
            method: method.to_string(),
            path,
            query,
            request_id: header_value("x-request-id"),
            authorization: header_value("authorization"),
        };
        self.lock().requests.push(request);
    }

    fn take_rejection(&self) -> Option<(StatusCode, Value)> {
        self.lock().reject_next_write.take()
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct MockApi {
    pub base_url: String,
    pub state: MockState,
}

impl MockApi {
    /// A client pointed at this mock, without a token.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ClientConfig::new(self.base_url.clone(), 5)).unwrap()
    }

    /// A client carrying the test bearer token.
    pub fn signed_in_client(&self) -> ApiClient {
        self.client().with_token(Some(TEST_TOKEN.to_string()))
    }
}

/// Bind the mock API to an ephemeral local port.
pub async fn spawn_mock_api() -> MockApi {
    let state = MockState::default();
    let app = Router::new().nest("/api", routes()).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi {
        base_url: format!("http://{addr}/api"),
        state,
    }
}

fn routes() -> Router<MockState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/{collection}", get(list).post(create))
        .route(
            "/{collection}/{id}",
            get(fetch_one).put(update).delete(remove),
        )
        .route(
            "/{collection}/{segment}/{action}",
            get(nested_get).patch(nested_patch).post(nested_post),
        )
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn not_found(collection: &str) -> Response {
    error(StatusCode::NOT_FOUND, &format!("{collection} record not found"))
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health(State(state): State<MockState>, headers: HeaderMap) -> Json<Value> {
    state.remember("GET", "/health".into(), HashMap::new(), &headers);
    Json(json!({ "status": "ok", "version": "test" }))
}

async fn login(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.remember("POST", "/auth/login".into(), HashMap::new(), &headers);
    if body["password"] != TEST_PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    let email = body["email"].as_str().unwrap_or_default();
    let role = if email.starts_with("club") { "clubadmin" } else { "admin" };
    Json(json!({
        "token": TEST_TOKEN,
        "user": { "id": 1, "name": "Test User", "email": email, "role": role }
    }))
    .into_response()
}

async fn logout(State(state): State<MockState>, headers: HeaderMap) -> StatusCode {
    state.remember("POST", "/auth/logout".into(), HashMap::new(), &headers);
    StatusCode::NO_CONTENT
}

async fn dashboard_stats(State(state): State<MockState>, headers: HeaderMap) -> Json<Value> {
    state.remember("GET", "/dashboard/stats".into(), HashMap::new(), &headers);
    let inner = state.lock();
    let count = |c: &str| inner.records.get(c).map_or(0, BTreeMap::len);
    Json(json!({
        "clubs": count("clubs"),
        "regions": count("regions"),
        "talukas": count("talukas"),
        "groups": count("groups"),
        "players": count("players"),
        "referees": count("referees"),
        "competitions": count("competitions"),
    }))
}

fn matches_search(record: &Value, term: &str) -> bool {
    let needle = term.to_lowercase();
    match record {
        Value::Object(map) => map.values().any(|v| match v {
            Value::String(s) => s.to_lowercase().contains(&needle),
            _ => false,
        }),
        _ => false,
    }
}

fn matches_filter(record: &Value, key: &str, expected: &str) -> bool {
    match &record[key] {
        Value::String(s) => s == expected,
        Value::Null => false,
        other => other.to_string() == expected,
    }
}

fn sort_key(record: &Value, field: &str) -> String {
    match &record[field] {
        Value::String(s) => s.to_lowercase(),
        Value::Number(n) => format!("{:020}", n.as_f64().unwrap_or_default() as i64),
        other => other.to_string(),
    }
}

async fn list(
    State(state): State<MockState>,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    state.remember("GET", format!("/{collection}"), params.clone(), &headers);

    let search = params.get("search").cloned().unwrap_or_default();
    let delay = state.lock().search_delays.get(&search).copied();
    if let Some(millis) = delay {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    let mut rows: Vec<Value> = state
        .lock()
        .records
        .get(&collection)
        .map(|records| records.values().cloned().collect())
        .unwrap_or_default();

    if !search.is_empty() {
        rows.retain(|r| matches_search(r, &search));
    }
    const PAGING: [&str; 5] = ["page", "limit", "search", "sortBy", "sortOrder"];
    for (key, value) in params.iter().filter(|(k, _)| !PAGING.contains(&k.as_str())) {
        rows.retain(|r| matches_filter(r, key, value));
    }
    if let Some(field) = params.get("sortBy") {
        rows.sort_by_key(|r| sort_key(r, field));
        if params.get("sortOrder").map(String::as_str) == Some("desc") {
            rows.reverse();
        }
    }

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let total = rows.len();
    let total_pages = total.div_ceil(limit.max(1));
    let items: Vec<Value> = rows
        .into_iter()
        .skip((page.saturating_sub(1)) * limit)
        .take(limit)
        .collect();

    Json(json!({
        "items": items,
        "page": page,
        "totalPages": total_pages,
        "totalCount": total,
    }))
}

fn defaults_for(collection: &str, record: &mut Map<String, Value>) {
    if collection == "players" {
        record.entry("aadharVerified").or_insert(json!(false));
        record.entry("isSuspended").or_insert(json!(false));
    }
    record.insert("createdAt".into(), json!("2024-05-01T08:00:00Z"));
}

async fn create(
    State(state): State<MockState>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.remember("POST", format!("/{collection}"), HashMap::new(), &headers);
    if let Some((status, body)) = state.take_rejection() {
        return (status, Json(body)).into_response();
    }
    let Value::Object(mut record) = body else {
        return error(StatusCode::BAD_REQUEST, "Expected a JSON object");
    };
    defaults_for(&collection, &mut record);
    let id = state.seed(&collection, Value::Object(record));
    let stored = state.record(&collection, id).unwrap_or_default();
    (StatusCode::CREATED, Json(stored)).into_response()
}

async fn fetch_one(
    State(state): State<MockState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    state.remember("GET", format!("/{collection}/{id}"), HashMap::new(), &headers);
    match parse_id(&id).and_then(|id| state.record(&collection, id)) {
        Some(record) => Json(record).into_response(),
        None => not_found(&collection),
    }
}

async fn update(
    State(state): State<MockState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.remember("PUT", format!("/{collection}/{id}"), HashMap::new(), &headers);
    if let Some((status, body)) = state.take_rejection() {
        return (status, Json(body)).into_response();
    }
    let Some(id) = parse_id(&id) else {
        return not_found(&collection);
    };
    let mut inner = state.lock();
    let Some(existing) = inner.records.get_mut(&collection).and_then(|r| r.get_mut(&id)) else {
        return not_found(&collection);
    };
    if let (Value::Object(target), Value::Object(changes)) = (existing, body) {
        for (key, value) in changes {
            target.insert(key, value);
        }
        target.insert("updatedAt".into(), json!("2024-05-02T08:00:00Z"));
        // Return a data envelope to exercise unwrapping.
        return Json(json!({ "data": Value::Object(target.clone()) })).into_response();
    }
    error(StatusCode::BAD_REQUEST, "Expected a JSON object")
}

async fn remove(
    State(state): State<MockState>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    state.remember("DELETE", format!("/{collection}/{id}"), HashMap::new(), &headers);
    let removed = parse_id(&id).and_then(|id| {
        state
            .lock()
            .records
            .get_mut(&collection)
            .and_then(|r| r.remove(&id))
    });
    match removed {
        Some(_) => Json(json!({ "message": "Deleted" })).into_response(),
        None => not_found(&collection),
    }
}

async fn nested_get(
    State(state): State<MockState>,
    Path((collection, segment, action)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.remember("GET", format!("/{collection}/{segment}/{action}"), params, &headers);
    match (collection.as_str(), segment.as_str(), action.as_str()) {
        (_, "export", "pdf") => (
            [(header::CONTENT_TYPE, "application/pdf")],
            Bytes::from_static(b"%PDF-1.4 mock"),
        )
            .into_response(),
        (_, "export", "excel") => (
            [(
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            )],
            Bytes::from_static(b"PK mock workbook"),
        )
            .into_response(),
        ("competitions", id, "players") => {
            let Some(id) = parse_id(id) else {
                return not_found("competitions");
            };
            let inner = state.lock();
            let players: Vec<Value> = inner
                .records
                .get("players")
                .map(|players| {
                    players
                        .values()
                        .filter(|p| {
                            p["competitionIds"]
                                .as_array()
                                .is_some_and(|ids| ids.contains(&json!(id)))
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            Json(json!({ "data": players })).into_response()
        }
        _ => error(StatusCode::NOT_FOUND, "Route not found"),
    }
}

async fn nested_patch(
    State(state): State<MockState>,
    Path((collection, id, action)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.remember("PATCH", format!("/{collection}/{id}/{action}"), HashMap::new(), &headers);
    if collection != "players" || action != "suspension" {
        return error(StatusCode::NOT_FOUND, "Route not found");
    }
    let Some(id) = parse_id(&id) else {
        return not_found("players");
    };
    let mut inner = state.lock();
    match inner.records.get_mut("players").and_then(|r| r.get_mut(&id)) {
        Some(player) => {
            player["isSuspended"] = body["isSuspended"].clone();
            Json(player.clone()).into_response()
        }
        None => not_found("players"),
    }
}

async fn nested_post(
    State(state): State<MockState>,
    Path((collection, id, action)): Path<(String, String, String)>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.remember("POST", format!("/{collection}/{id}/{action}"), HashMap::new(), &headers);
    if collection != "players" || action != "aadhar" {
        return error(StatusCode::NOT_FOUND, "Route not found");
    }
    let mut received = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        state.lock().uploads.push((name.clone(), size));
        if name == "aadharImage" {
            received = Some(size);
        }
    }
    if received.is_none() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": { "aadharImage": "Image is required" } })),
        )
            .into_response();
    }
    let Some(id) = parse_id(&id) else {
        return not_found("players");
    };
    let mut inner = state.lock();
    match inner.records.get_mut("players").and_then(|r| r.get_mut(&id)) {
        Some(player) => {
            player["aadharVerified"] = json!(true);
            Json(player.clone()).into_response()
        }
        None => not_found("players"),
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn club_json(name: &str, region_id: i64) -> Value {
    json!({
        "clubName": name,
        "affiliationNumber": null,
        "regionId": region_id,
        "talukaId": null,
        "address": "1 Stadium Road",
        "city": "Pune",
        "mobile": "9876543210",
        "email": format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
        "contactPerson": "Secretary",
    })
}

pub fn player_json(first: &str, last: &str, club_id: i64) -> Value {
    json!({
        "firstName": first,
        "middleName": null,
        "lastName": last,
        "dateOfBirth": "2008-04-10",
        "position": "Raider",
        "mobile": "9876543210",
        "email": null,
        "aadharNumber": "123412341234",
        "clubId": club_id,
        "groupIds": [1],
        "aadharVerified": false,
        "isSuspended": false,
    })
}
