//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::validate::FieldError;

/// Client-facing messages. Tests and handlers share these so the wording
/// stays fixed.
pub mod msg {
  pub const NO_TOKEN: &str = "No Token - Authorization Denied";
  pub const INVALID_TOKEN: &str = "The Token Is Not Valid.";
  pub const NOT_AUTHORIZED: &str = "User Not Authorized";
  pub const CONTACT_NOT_FOUND: &str = "Contact Not Found";
  pub const CONTACT_REMOVED: &str = "Contact Removed";
  pub const USER_NOT_FOUND: &str = "User Not Found";
  pub const USER_EXISTS: &str = "User Already Exists";
  pub const INVALID_CREDENTIALS: &str = "Invalid Credentials";
  pub const INVALID_BODY: &str = "Invalid Request Body";
  pub const SERVER_ERROR: &str = "Server Error";
}

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(&'static str),

  #[error("forbidden: {0}")]
  Forbidden(&'static str),

  #[error("not found: {0}")]
  NotFound(&'static str),

  #[error("bad request: {0}")]
  BadRequest(&'static str),

  #[error("validation failed on {} field(s)", .0.len())]
  Validation(Vec<FieldError>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    ApiError::Store(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, json!({ "msg": m })),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, json!({ "msg": m })),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "msg": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "msg": m })),
      ApiError::Validation(errors) => {
        (StatusCode::BAD_REQUEST, json!({ "errors": errors }))
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "msg": msg::SERVER_ERROR }))
      }
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "internal failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "msg": msg::SERVER_ERROR }))
      }
    };
    (status, Json(body)).into_response()
  }
}
