//! JSON REST API for Contact Keeper.
//!
//! Exposes an axum [`Router`] backed by any [`ContactStore`]. Users register
//! and log in to obtain a token; every `/api/contacts` route requires that
//! token in the `x-auth-token` header and only ever touches the caller's own
//! contacts.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod password;
pub mod validate;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use chrono::TimeDelta;
use keeper_core::store::ContactStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::TokenKeys;
use handlers::{auth as session, contacts, users};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `KEEPER_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  pub store_path:     PathBuf,
  /// HMAC secret for signing tokens. Must not be empty.
  pub jwt_secret:     String,
  #[serde(default = "default_token_ttl")]
  pub token_ttl_secs: i64,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 5001 }

fn default_token_ttl() -> i64 { 360_000 }

impl ServerConfig {
  /// The configured token lifetime, or `None` unless it is a positive
  /// number of seconds that `chrono` can represent.
  pub fn token_ttl(&self) -> Option<TimeDelta> {
    TimeDelta::try_seconds(self.token_ttl_secs).filter(|ttl| *ttl > TimeDelta::zero())
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: ContactStore> {
  pub store: Arc<S>,
  pub keys:  Arc<TokenKeys>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full router: `GET /` plus everything under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let api = Router::new()
    .route("/users", post(users::register::<S>))
    .route("/auth", get(session::current_user::<S>).post(session::login::<S>))
    .route("/contacts", get(contacts::list::<S>).post(contacts::create::<S>))
    .route("/contacts/{id}", put(contacts::update::<S>).delete(contacts::remove::<S>));

  Router::new()
    .route("/", get(handlers::welcome))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use keeper_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use crate::auth::{ClaimedUser, Claims, TOKEN_HEADER};

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store: Arc::new(store),
      keys:  Arc::new(TokenKeys::new("test-secret", TimeDelta::hours(1))),
    }
  }

  async fn send(
    state:  &AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
      builder = builder.header(TOKEN_HEADER, t);
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp   = router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes  = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  /// Register a fresh account and return its token.
  async fn register(state: &AppState<SqliteStore>, email: &str) -> String {
    let (status, body) = send(
      state,
      "POST",
      "/api/users",
      None,
      Some(json!({ "name": "Test User", "email": email, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register: {body}");
    body["token"].as_str().unwrap().to_string()
  }

  async fn user_id(state: &AppState<SqliteStore>, token: &str) -> String {
    let (status, body) = send(state, "GET", "/api/auth", Some(token), None).await;
    assert_eq!(status, StatusCode::OK, "current user: {body}");
    body["id"].as_str().unwrap().to_string()
  }

  async fn create(state: &AppState<SqliteStore>, token: &str, body: Value) -> Value {
    let (status, body) = send(state, "POST", "/api/contacts", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "create: {body}");
    body
  }

  async fn list(state: &AppState<SqliteStore>, token: &str) -> Vec<Value> {
    let (status, body) = send(state, "GET", "/api/contacts", Some(token), None).await;
    assert_eq!(status, StatusCode::OK, "list: {body}");
    body.as_array().unwrap().clone()
  }

  // ── Welcome ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn welcome_message() {
    let state = make_state().await;
    let (status, body) = send(&state, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Welcome to the Contact Keeper API...");
  }

  // ── Accounts ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_login_and_fetch_current_user() {
    let state = make_state().await;
    register(&state, "alice@example.com").await;

    let (status, body) = send(
      &state,
      "POST",
      "/api/auth",
      None,
      Some(json!({ "email": "Alice@Example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login: {body}");
    let token = body["token"].as_str().unwrap();

    let (status, me) = send(&state, "GET", "/api/auth", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "alice@example.com");
    assert_eq!(me["name"], "Test User");
    assert!(me.get("password_hash").is_none(), "leaked hash: {me}");
    assert!(me.get("password").is_none(), "leaked password: {me}");
  }

  #[tokio::test]
  async fn register_duplicate_email() {
    let state = make_state().await;
    register(&state, "alice@example.com").await;

    let (status, body) = send(
      &state,
      "POST",
      "/api/users",
      None,
      Some(json!({ "name": "Again", "email": "ALICE@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "User Already Exists");
  }

  #[tokio::test]
  async fn register_reports_every_invalid_field() {
    let state = make_state().await;
    let (status, body) = send(
      &state,
      "POST",
      "/api/users",
      None,
      Some(json!({ "name": "", "email": "not-an-email", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let params: Vec<&str> = body["errors"]
      .as_array()
      .unwrap()
      .iter()
      .map(|e| e["param"].as_str().unwrap())
      .collect();
    assert_eq!(params, ["name", "email", "password"]);
  }

  #[tokio::test]
  async fn login_with_wrong_password() {
    let state = make_state().await;
    register(&state, "alice@example.com").await;

    let (status, body) = send(
      &state,
      "POST",
      "/api/auth",
      None,
      Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Invalid Credentials");
  }

  #[tokio::test]
  async fn login_with_unknown_email() {
    let state = make_state().await;
    let (status, body) = send(
      &state,
      "POST",
      "/api/auth",
      None,
      Some(json!({ "email": "nobody@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Invalid Credentials");
  }

  #[tokio::test]
  async fn current_user_for_deleted_account_is_404() {
    let state = make_state().await;
    let token = state.keys.issue(Uuid::new_v4()).unwrap();
    let (status, body) = send(&state, "GET", "/api/auth", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "User Not Found");
  }

  // ── Token verification ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn protected_routes_without_token_return_401() {
    let state = make_state().await;
    let id    = Uuid::new_v4();
    let routes = [
      ("GET", "/api/auth".to_string(), None),
      ("GET", "/api/contacts".to_string(), None),
      ("POST", "/api/contacts".to_string(), Some(json!({ "name": "Jane" }))),
      ("PUT", format!("/api/contacts/{id}"), Some(json!({ "name": "Jane" }))),
      ("DELETE", format!("/api/contacts/{id}"), None),
    ];
    for (method, uri, body) in routes {
      let (status, resp) = send(&state, method, &uri, None, body).await;
      assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
      assert_eq!(resp["msg"], "No Token - Authorization Denied", "{method} {uri}");
    }
  }

  #[tokio::test]
  async fn forged_token_returns_401() {
    let state = make_state().await;
    let forged = TokenKeys::new("other-secret", TimeDelta::hours(1)).issue(Uuid::new_v4()).unwrap();
    for token in [forged.as_str(), "garbage"] {
      let (status, body) = send(&state, "GET", "/api/contacts", Some(token), None).await;
      assert_eq!(status, StatusCode::UNAUTHORIZED);
      assert_eq!(body["msg"], "The Token Is Not Valid.");
    }
  }

  #[tokio::test]
  async fn token_expired_moments_ago_returns_401() {
    let state = make_state().await;
    let token = register(&state, "a@example.com").await;
    let id    = Uuid::parse_str(&user_id(&state, &token).await).unwrap();

    let now    = chrono::Utc::now().timestamp();
    let claims = Claims { user: ClaimedUser { id }, iat: now - 3600, exp: now - 30 };
    let stale  = jsonwebtoken::encode(
      &jsonwebtoken::Header::default(),
      &claims,
      &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap();

    let (status, body) = send(&state, "GET", "/api/contacts", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "The Token Is Not Valid.");
  }

  #[test]
  fn token_ttl_must_be_positive_and_representable() {
    let config = |token_ttl_secs| ServerConfig {
      host:       default_host(),
      port:       default_port(),
      store_path: PathBuf::from("contacts.db"),
      jwt_secret: "secret".into(),
      token_ttl_secs,
    };
    assert_eq!(config(360_000).token_ttl(), Some(TimeDelta::seconds(360_000)));
    assert_eq!(config(0).token_ttl(), None);
    assert_eq!(config(-5).token_ttl(), None);
    assert_eq!(config(i64::MAX).token_ttl(), None);
  }

  // ── Request bodies ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn mistyped_create_body_is_400() {
    let state = make_state().await;
    let token = register(&state, "a@example.com").await;

    for body in [json!({ "name": 5 }), json!({ "name": "Jane", "type": "family" })] {
      let (status, resp) =
        send(&state, "POST", "/api/contacts", Some(&token), Some(body.clone())).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
      assert_eq!(resp["msg"], "Invalid Request Body", "{body}");
    }
    assert!(list(&state, &token).await.is_empty());
  }

  #[tokio::test]
  async fn mistyped_update_body_is_400_and_changes_nothing() {
    let state = make_state().await;
    let token = register(&state, "a@example.com").await;
    let created = create(&state, &token, json!({ "name": "Jane", "type": "professional" })).await;
    let uri = format!("/api/contacts/{}", created["id"].as_str().unwrap());

    let (status, body) =
      send(&state, "PUT", &uri, Some(&token), Some(json!({ "type": "family" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Invalid Request Body");

    let stored = list(&state, &token).await;
    assert_eq!(stored[0]["type"], "professional");
  }

  #[tokio::test]
  async fn mistyped_register_body_is_400() {
    let state = make_state().await;
    let (status, body) = send(
      &state,
      "POST",
      "/api/users",
      None,
      Some(json!({ "name": "A", "email": 5, "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Invalid Request Body");
  }

  // ── Contacts ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn end_to_end_create_and_list() {
    let state = make_state().await;
    let token = register(&state, "a@example.com").await;

    let (status, body) = send(
      &state,
      "POST",
      "/api/auth",
      None,
      Some(json!({ "email": "a@example.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let login_token = body["token"].as_str().unwrap().to_string();
    let owner = user_id(&state, &token).await;

    create(&state, &login_token, json!({ "name": "Jane" })).await;

    let contacts = list(&state, &login_token).await;
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["name"], "Jane");
    assert_eq!(contacts[0]["user"], owner.as_str());
    assert_eq!(contacts[0]["type"], "personal");
  }

  #[tokio::test]
  async fn create_without_name_persists_nothing() {
    let state = make_state().await;
    let token = register(&state, "a@example.com").await;

    for body in [json!({ "email": "x@example.com" }), json!({ "name": "  " })] {
      let (status, resp) = send(&state, "POST", "/api/contacts", Some(&token), Some(body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(resp["errors"][0]["param"], "name");
    }
    assert!(list(&state, &token).await.is_empty());
  }

  #[tokio::test]
  async fn create_ignores_client_supplied_owner() {
    let state = make_state().await;
    let token = register(&state, "a@example.com").await;
    let owner = user_id(&state, &token).await;

    let created = create(
      &state,
      &token,
      json!({ "name": "Jane", "user": Uuid::new_v4(), "type": "professional" }),
    )
    .await;
    assert_eq!(created["user"], owner.as_str());
    assert_eq!(created["type"], "professional");
  }

  #[tokio::test]
  async fn create_for_missing_account_is_404() {
    let state = make_state().await;
    let token = state.keys.issue(Uuid::new_v4()).unwrap();
    let (status, body) =
      send(&state, "POST", "/api/contacts", Some(&token), Some(json!({ "name": "Jane" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "User Not Found");
  }

  #[tokio::test]
  async fn list_is_newest_first_and_scoped_to_caller() {
    let state = make_state().await;
    let alice = register(&state, "alice@example.com").await;
    let bob   = register(&state, "bob@example.com").await;

    create(&state, &alice, json!({ "name": "First" })).await;
    create(&state, &bob,   json!({ "name": "Bob's" })).await;
    create(&state, &alice, json!({ "name": "Second" })).await;

    let names: Vec<String> = list(&state, &alice)
      .await
      .iter()
      .map(|c| c["name"].as_str().unwrap().to_string())
      .collect();
    assert_eq!(names, ["Second", "First"]);
    assert_eq!(list(&state, &bob).await.len(), 1);
  }

  #[tokio::test]
  async fn partial_update_changes_only_sent_fields() {
    let state = make_state().await;
    let token = register(&state, "a@example.com").await;
    let created = create(
      &state,
      &token,
      json!({ "name": "Jane", "email": "jane@example.com", "phone": "555-0000", "type": "professional" }),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
      &state,
      "PUT",
      &format!("/api/contacts/{id}"),
      Some(&token),
      Some(json!({ "phone": "555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update: {updated}");
    assert_eq!(updated["phone"], "555-0100");
    assert_eq!(updated["name"], "Jane");
    assert_eq!(updated["email"], "jane@example.com");
    assert_eq!(updated["type"], "professional");
    assert_eq!(updated["user"], created["user"]);
  }

  #[tokio::test]
  async fn update_with_empty_name_is_rejected() {
    let state = make_state().await;
    let token = register(&state, "a@example.com").await;
    let created = create(&state, &token, json!({ "name": "Jane" })).await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(
      &state,
      "PUT",
      &format!("/api/contacts/{id}"),
      Some(&token),
      Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(list(&state, &token).await[0]["name"], "Jane");
  }

  #[tokio::test]
  async fn other_users_cannot_update_or_delete() {
    let state = make_state().await;
    let alice = register(&state, "alice@example.com").await;
    let bob   = register(&state, "bob@example.com").await;
    let created = create(&state, &alice, json!({ "name": "Jane" })).await;
    let uri = format!("/api/contacts/{}", created["id"].as_str().unwrap());

    let (status, body) =
      send(&state, "PUT", &uri, Some(&bob), Some(json!({ "name": "Hijacked" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "User Not Authorized");

    let (status, body) = send(&state, "DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "User Not Authorized");

    let remaining = list(&state, &alice).await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0], created);
  }

  #[tokio::test]
  async fn nonexistent_contact_is_404_for_any_caller() {
    let state = make_state().await;
    let token = register(&state, "a@example.com").await;

    for uri in [format!("/api/contacts/{}", Uuid::new_v4()), "/api/contacts/not-a-uuid".to_string()] {
      let (status, body) =
        send(&state, "PUT", &uri, Some(&token), Some(json!({ "name": "X" }))).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "PUT {uri}");
      assert_eq!(body["msg"], "Contact Not Found");

      let (status, body) = send(&state, "DELETE", &uri, Some(&token), None).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
      assert_eq!(body["msg"], "Contact Not Found");
    }
  }

  #[tokio::test]
  async fn delete_removes_contact() {
    let state = make_state().await;
    let token = register(&state, "a@example.com").await;
    let created = create(&state, &token, json!({ "name": "Jane" })).await;
    let uri = format!("/api/contacts/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&state, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Contact Removed");
    assert!(list(&state, &token).await.is_empty());

    let (status, _) = send(&state, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
