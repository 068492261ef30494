//! Token issuance and the `x-auth-token` verifier.
//!
//! Tokens are HS256 JWTs carrying `{"user":{"id":..},"iat":..,"exp":..}`,
//! signed with the single secret held in [`TokenKeys`]. Protected handlers
//! take an [`Identity`] argument; axum runs its extractor before the handler
//! body, so no handler logic executes without a verified caller.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use keeper_core::store::ContactStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  error::{ApiError, msg},
};

/// Request header carrying the credential token.
pub const TOKEN_HEADER: &str = "x-auth-token";

/// The identity embedded in a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedUser {
  pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub user: ClaimedUser,
  /// Issued-at (Unix timestamp, seconds).
  pub iat:  i64,
  /// Expiry (Unix timestamp, seconds).
  pub exp:  i64,
}

/// Signing and verification keys derived from the process-wide secret.
#[derive(Clone)]
pub struct TokenKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        TimeDelta,
}

impl TokenKeys {
  pub fn new(secret: &str, ttl: TimeDelta) -> Self {
    // A token is dead the second its `exp` passes.
    let mut validation = Validation::default();
    validation.leeway = 0;

    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
      ttl,
    }
  }

  /// Sign a token for `user_id`, valid for the configured lifetime.
  pub fn issue(&self, user_id: Uuid) -> Result<String, ApiError> {
    let now = Utc::now();
    let exp = now
      .checked_add_signed(self.ttl)
      .ok_or_else(|| ApiError::Internal(format!("token lifetime {} overflows", self.ttl)))?;
    let claims = Claims {
      user: ClaimedUser { id: user_id },
      iat:  now.timestamp(),
      exp:  exp.timestamp(),
    };
    jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
      .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
  }

  /// Check signature and expiry, returning the embedded claims.
  pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims)
  }
}

/// The verified caller. Only ever constructed from a token that passed
/// [`TokenKeys::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
  pub user_id: Uuid,
}

/// Verify the credential header directly.
pub fn verify_token(headers: &HeaderMap, keys: &TokenKeys) -> Result<Identity, ApiError> {
  let value = headers
    .get(TOKEN_HEADER)
    .filter(|v| !v.is_empty())
    .ok_or(ApiError::Unauthorized(msg::NO_TOKEN))?;

  let token = value
    .to_str()
    .map_err(|_| ApiError::Unauthorized(msg::INVALID_TOKEN))?;

  let claims = keys.verify(token.trim()).map_err(|e| {
    tracing::debug!(error = %e, "rejected token");
    ApiError::Unauthorized(msg::INVALID_TOKEN)
  })?;

  Ok(Identity { user_id: claims.user.id })
}

impl<S> FromRequestParts<AppState<S>> for Identity
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_token(&parts.headers, &state.keys)
  }
}
