//! Handlers for `/api/auth`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/auth` | Body: `{"email","password"}`; returns a token |
//! | `GET`  | `/api/auth` | Token required; the caller's account |

use axum::{Json, extract::State};
use keeper_core::{
  store::ContactStore,
  user::{User, normalize_email},
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::Identity,
  error::{ApiError, msg},
  extract::JsonBody,
  handlers::TokenResponse,
  password,
  validate::Checks,
};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// `POST /api/auth`
///
/// Unknown email and wrong password produce the same response.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<TokenResponse>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Checks::new()
    .email("email", body.email.as_deref(), "Please Include A Valid Email")
    .min_len("password", body.password.as_deref(), 1, "Password Is Required")
    .finish()?;

  let (Some(email), Some(password)) = (body.email, body.password) else {
    return Err(ApiError::Internal("validated fields missing".into()));
  };

  let user = state.store
    .find_user_by_email(&normalize_email(&email))
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::BadRequest(msg::INVALID_CREDENTIALS))?;

  if !password::verify(password, user.password_hash).await? {
    tracing::info!(user_id = %user.id, "failed login");
    return Err(ApiError::BadRequest(msg::INVALID_CREDENTIALS));
  }

  Ok(Json(TokenResponse { token: state.keys.issue(user.id)? }))
}

/// `GET /api/auth`: the password hash is never serialised.
pub async fn current_user<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
) -> Result<Json<User>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = state.store
    .get_user(identity.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(msg::USER_NOT_FOUND))?;
  Ok(Json(user))
}
