//! User accounts.
//!
//! A user owns a private list of contacts. The password is only ever held as
//! an argon2 PHC string and is never serialised.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A registered account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub id:            Uuid,
  pub name:          String,
  pub email:         String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  /// Registration time.
  pub date:          DateTime<Utc>,
}

/// Input for [`ContactStore::create_user`](crate::store::ContactStore::create_user).
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:          String,
  /// Already normalised with [`normalize_email`].
  pub email:         String,
  pub password_hash: String,
}

/// Emails are unique per account regardless of case or surrounding spaces.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }
