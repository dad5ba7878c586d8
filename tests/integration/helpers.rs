//! Shared test helpers: an axum stub of the REST backend.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use pasantias_client::{ApiClient, TokenStore};
use pasantias_core::config::AppConfig;
use pasantias_core::config::api::ApiConfig;

/// Token the stub treats as expired.
pub const EXPIRED_TOKEN: &str = "expired";

/// A request as the stub saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

/// Requests and bodies received by the stub.
#[derive(Debug, Default)]
pub struct StubState {
    requests: Mutex<Vec<Recorded>>,
    bodies: Mutex<Vec<(String, Value)>>,
}

impl StubState {
    /// Every request received so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// The last request whose path ends with `suffix`.
    pub fn last_to(&self, suffix: &str) -> Option<Recorded> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.path.ends_with(suffix))
    }

    /// The JSON body last sent to `path`.
    pub fn body_of(&self, path: &str) -> Option<Value> {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
    }

    fn keep_body(&self, path: String, body: Value) {
        self.bodies.lock().unwrap().push((path, body));
    }
}

/// A stub backend listening on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub state: Arc<StubState>,
}

impl TestServer {
    /// Start the stub on the current runtime.
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let api = Router::new()
            .route("/offers", get(list_offers))
            .route("/offers/{id}", get(get_offer))
            .route("/offers/{id}/decision", put(offer_decision))
            .route("/applications", get(list_applications))
            .route("/applications/{id}/review", put(review_application))
            .route("/applications/{id}/evaluate", put(evaluate_application))
            .route("/notifications", get(list_notifications))
            .route("/notifications/unread-count", get(unread_count))
            .route("/notifications/{id}/read", put(mark_read))
            .route("/catalogs/technologies", get(technologies))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());
        let router = Router::new().nest("/api", api);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Stub server has no address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    /// API settings pointing at the stub.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            ..ApiConfig::default()
        }
    }

    /// A client authenticated with `token`.
    pub fn client(&self, token: &str) -> ApiClient {
        ApiClient::new(
            &self.api_config(),
            Arc::new(TokenStore::new(Some(token.to_string()))),
        )
        .expect("Failed to build client")
    }

    /// Full configuration for a session of `role` against the stub.
    pub fn app_config(&self, role: &str, token: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.api = self.api_config();
        config.session.token = Some(token.to_string());
        config.session.user_id = 1;
        config.session.role = role.to_string();
        config
    }
}

async fn record(State(state): State<Arc<StubState>>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push(Recorded {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: authorization.clone(),
    });

    if authorization.as_deref() == Some(format!("Bearer {EXPIRED_TOKEN}").as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Token expired" })),
        )
            .into_response();
    }
    next.run(request).await
}

fn offer(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "organization_id": 3,
        "title": "Backend developer intern",
        "description": "Build REST services",
        "requirements": "Rust",
        "quota": 2,
        "weekly_hours": 20,
        "shift": "morning",
        "application_deadline": "2099-12-31",
        "status": status,
    })
}

fn application(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "student_id": 11,
        "offer_id": 7,
        "status": status,
        "applied_at": "2024-03-01T10:00:00Z",
        "offer_title": "Backend developer intern",
    })
}

async fn list_offers() -> Json<Value> {
    Json(json!({
        "data": {
            "items": [offer(7, "pending"), offer(8, "approved")],
            "total": 12,
            "page": 1,
            "limit": 10,
        }
    }))
}

async fn get_offer(Path(id): Path<i64>) -> Response {
    if id == 7 {
        Json(json!({ "data": { "data": offer(7, "pending") } })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Offer not found" })),
        )
            .into_response()
    }
}

async fn offer_decision(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let decision = body["decision"].as_str().unwrap_or("approved").to_string();
    state.keep_body(format!("/api/offers/{id}/decision"), body);
    Json(json!({
        "message": "Decision recorded",
        "offer": { "id": id, "status": decision, "published_start_date": "2024-03-02" },
    }))
}

async fn list_applications() -> Json<Value> {
    Json(json!({
        "data": {
            "applications": [application(1, "pending"), application(2, "approved")],
            "total": 2,
        }
    }))
}

async fn review_application() -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({ "error": "Application already reviewed" })),
    )
        .into_response()
}

async fn evaluate_application(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let decision = body["Decision"].as_str().unwrap_or("accepted").to_string();
    state.keep_body(format!("/api/applications/{id}/evaluate"), body);
    Json(json!({
        "data": {
            "id": id,
            "status": decision,
            "org_evaluated_at": "2024-03-05T09:00:00Z",
        }
    }))
}

async fn list_notifications() -> Json<Value> {
    Json(json!({
        "data": {
            "notifications": [
                {
                    "id": 1,
                    "user_id": 1,
                    "type": "application_decision",
                    "title": "Application accepted",
                    "message": "Your application #2 was accepted",
                    "is_read": false,
                    "created_at": "2024-03-05T09:00:00Z",
                },
                {
                    "id": 2,
                    "user_id": 1,
                    "type": "interview_scheduled",
                    "title": "Interview",
                    "message": "Tomorrow at 10",
                    "is_read": true,
                    "created_at": "2024-03-04T09:00:00Z",
                },
            ],
            "total": 2,
            "page": 1,
            "limit": 50,
        }
    }))
}

async fn unread_count() -> Json<Value> {
    Json(json!({ "data": { "unread_count": 1 } }))
}

async fn mark_read() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "database exploded").into_response()
}

async fn technologies() -> Json<Value> {
    Json(json!({ "data": [{ "id": 1, "name": "Rust" }, { "id": 2, "name": "PostgreSQL" }] }))
}
