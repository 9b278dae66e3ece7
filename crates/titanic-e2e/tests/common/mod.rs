// crates/titanic-e2e/tests/common/mod.rs
// ============================================================================
// Module: Auth Stub
// Description: In-process stand-in for the gateway's auth and echo routes.
// Purpose: Exercise the HTTP client and credential bootstrap without a
//          deployed Titanic stack.
// Dependencies: axum, serde_json, tokio
// ============================================================================

//! Stub gateway used by the library integration tests.

#![allow(dead_code, reason = "Each test binary uses a subset of the stub.")]

use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde_json::Value;
use serde_json::json;
use titanic_e2e::fixtures::INVALID_LOGIN_DETAIL;
use titanic_e2e::fixtures::duplicate_user_detail;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

/// Registered users: username to (password, email).
type Users = HashMap<String, (String, String)>;

#[derive(Clone, Default)]
struct StubState {
    users: Arc<Mutex<Users>>,
    registrations: Arc<Mutex<u32>>,
    register_failure: Option<u16>,
}

/// Handle for the stub gateway; shuts the server down on drop.
pub struct StubGateway {
    base_url: String,
    state: StubState,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
}

impl StubGateway {
    /// Returns the stub base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns how many registration requests the stub received.
    pub fn registrations(&self) -> u32 {
        self.state.registrations.lock().map_or(0, |count| *count)
    }

    /// Pre-registers an identity.
    pub fn seed_user(&self, username: &str, password: &str) {
        if let Ok(mut users) = self.state.users.lock() {
            users.insert(
                username.to_string(),
                (password.to_string(), format!("{username}@seed.test")),
            );
        }
    }
}

impl Drop for StubGateway {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns a well-behaved stub gateway.
pub fn spawn_stub() -> Result<StubGateway, String> {
    spawn_with_state(StubState::default())
}

/// Spawns a stub whose registration endpoint always answers `status`.
pub fn spawn_failing_register(status: u16) -> Result<StubGateway, String> {
    spawn_with_state(StubState {
        register_failure: Some(status),
        ..StubState::default()
    })
}

fn spawn_with_state(state: StubState) -> Result<StubGateway, String> {
    let listener =
        StdTcpListener::bind("127.0.0.1:0").map_err(|err| format!("stub bind failed: {err}"))?;
    listener.set_nonblocking(true).map_err(|err| format!("stub nonblocking failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("stub local addr failed: {err}"))?;
    let base_url = format!("http://{addr}");

    let app = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/plain", get(plain))
        .route("/echo", get(echo))
        .with_state(state.clone());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(StubGateway {
        base_url,
        state,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}

fn tokens_for(username: &str) -> Value {
    json!({
        "access_token": format!("access-{username}"),
        "refresh_token": format!("refresh-{username}"),
        "token_type": "bearer",
        "expires_in": 900,
    })
}

fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or_default()
}

async fn register(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    if let Ok(mut count) = state.registrations.lock() {
        *count += 1;
    }
    if let Some(status) = state.register_failure {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({"detail": "registration unavailable"}))).into_response();
    }
    let username = field(&body, "username").to_string();
    let Ok(mut users) = state.users.lock() else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    if users.contains_key(&username) {
        let detail = duplicate_user_detail(&username);
        return (StatusCode::BAD_REQUEST, Json(json!({"detail": detail}))).into_response();
    }
    users.insert(
        username.clone(),
        (field(&body, "password").to_string(), field(&body, "email").to_string()),
    );
    (StatusCode::CREATED, Json(tokens_for(&username))).into_response()
}

async fn login(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let username = field(&body, "username");
    let password = field(&body, "password");
    let valid = state
        .users
        .lock()
        .map(|users| users.get(username).is_some_and(|(stored, _)| stored == password))
        .unwrap_or(false);
    if !valid {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": INVALID_LOGIN_DETAIL})))
            .into_response();
    }
    (StatusCode::OK, Json(tokens_for(username))).into_response()
}

async fn me(State(state): State<StubState>, headers: HeaderMap) -> Response {
    let username = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer access-"))
        .unwrap_or_default()
        .to_string();
    let email = state
        .users
        .lock()
        .ok()
        .and_then(|users| users.get(&username).map(|(_, email)| email.clone()));
    match email {
        Some(email) => (
            StatusCode::OK,
            Json(json!({"username": username, "email": email, "is_active": true})),
        )
            .into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"})))
            .into_response(),
    }
}

async fn plain() -> &'static str {
    "plain text body"
}

async fn echo(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({"query": query}))
}
