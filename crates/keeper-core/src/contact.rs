//! Contacts: the per-user resource managed by the API.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Category of a contact.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
  #[default]
  Personal,
  Professional,
}

impl ContactType {
  pub fn as_str(self) -> &'static str {
    match self {
      ContactType::Personal => "personal",
      ContactType::Professional => "professional",
    }
  }
}

impl FromStr for ContactType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "personal" => Ok(ContactType::Personal),
      "professional" => Ok(ContactType::Professional),
      other => Err(Error::UnknownContactType(other.to_owned())),
    }
  }
}

/// A stored contact.
///
/// `user` is the id of the owning account. It is set from the verified
/// identity when the contact is created and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub id:    Uuid,
  pub user:  Uuid,
  pub name:  String,
  pub email: Option<String>,
  pub phone: Option<String>,
  #[serde(rename = "type")]
  pub kind:  ContactType,
  /// Creation time; lists are ordered newest first on this field.
  pub date:  DateTime<Utc>,
}

/// Input for [`ContactStore::insert_contact`](crate::store::ContactStore::insert_contact).
///
/// Carries no owner: the store is handed the owner separately.
#[derive(Debug, Clone, Default)]
pub struct NewContact {
  pub name:  String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub kind:  ContactType,
}

/// A partial update. Only the fields that are `Some` are written; everything
/// else keeps its stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactPatch {
  pub name:  Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  #[serde(rename = "type")]
  pub kind:  Option<ContactType>,
}
