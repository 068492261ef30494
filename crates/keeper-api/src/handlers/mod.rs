pub mod auth;
pub mod contacts;
pub mod users;

use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

/// Body returned by register and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
  pub token: String,
}

/// `GET /`
pub async fn welcome() -> Json<Value> {
  Json(json!({ "msg": "Welcome to the Contact Keeper API..." }))
}
