//! Handler for `POST /api/users` (registration).

use axum::{Json, extract::State};
use keeper_core::{
  store::ContactStore,
  user::{NewUser, normalize_email},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::{ApiError, msg},
  extract::JsonBody,
  handlers::TokenResponse,
  password,
  validate::Checks,
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:     Option<String>,
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// `POST /api/users`: body: `{"name","email","password"}`; returns a token
/// for the new account.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<RegisterBody>,
) -> Result<Json<TokenResponse>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Checks::new()
    .not_empty("name", body.name.as_deref(), "Please Add Name")
    .email("email", body.email.as_deref(), "Please Include A Valid Email")
    .min_len(
      "password",
      body.password.as_deref(),
      MIN_PASSWORD_LEN,
      "Please Enter A Password With 6 Or More Characters",
    )
    .finish()?;

  // All three are present once the checks pass.
  let (Some(name), Some(email), Some(password)) = (body.name, body.email, body.password)
  else {
    return Err(ApiError::Internal("validated fields missing".into()));
  };
  let email = normalize_email(&email);

  if state.store
    .find_user_by_email(&email)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::BadRequest(msg::USER_EXISTS));
  }

  let password_hash = password::hash(password).await?;

  // A concurrent registration can still win the race; the store reports it.
  let user = state.store
    .create_user(NewUser { name: name.trim().to_owned(), email, password_hash })
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::BadRequest(msg::USER_EXISTS))?;

  tracing::info!(user_id = %user.id, "registered user");
  Ok(Json(TokenResponse { token: state.keys.issue(user.id)? }))
}
