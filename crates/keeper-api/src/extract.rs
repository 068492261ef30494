//! Request body extraction with [`ApiError`] as the rejection.

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::error::{ApiError, msg};

/// [`axum::Json`] whose rejection goes through [`ApiError`], so a body that
/// is not JSON, or whose fields have the wrong type, gets the same 400
/// `{"msg"}` shape as every other client error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    tracing::debug!(error = %rejection.body_text(), "rejected request body");
    ApiError::BadRequest(msg::INVALID_BODY)
  }
}
