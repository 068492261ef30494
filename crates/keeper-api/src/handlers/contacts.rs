//! Handlers for `/api/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/contacts` | Caller's contacts, newest first |
//! | `POST`   | `/api/contacts` | Body: [`CreateBody`]; owner is always the caller |
//! | `PUT`    | `/api/contacts/:id` | Body: [`ContactPatch`]; owner only |
//! | `DELETE` | `/api/contacts/:id` | Owner only |
//!
//! Every handler takes an [`Identity`] first, so an unauthenticated request
//! is rejected before its body is even parsed.

use axum::{
  Json,
  extract::{Path, State},
};
use keeper_core::{
  contact::{Contact, ContactPatch, ContactType, NewContact},
  store::ContactStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Identity,
  error::{ApiError, msg},
  extract::JsonBody,
  validate::Checks,
};

const NAME_REQUIRED: &str = "Name Is Required";

// ─── Ownership check ──────────────────────────────────────────────────────────

/// Look up `id` and confirm `identity` owns it.
///
/// A missing contact is reported before ownership, so callers learn nothing
/// about other users' ids beyond existence. An id that is not a UUID cannot
/// exist and is reported the same way.
async fn owned_contact<S>(
  store:    &S,
  identity: Identity,
  id:       &str,
) -> Result<Contact, ApiError>
where
  S: ContactStore,
{
  let id = Uuid::parse_str(id).map_err(|_| ApiError::NotFound(msg::CONTACT_NOT_FOUND))?;

  let contact = store
    .get_contact(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(msg::CONTACT_NOT_FOUND))?;

  if contact.user != identity.user_id {
    tracing::warn!(
      contact_id = %contact.id,
      caller = %identity.user_id,
      "rejected access to another user's contact",
    );
    return Err(ApiError::Forbidden(msg::NOT_AUTHORIZED));
  }

  Ok(contact)
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/contacts`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
) -> Result<Json<Vec<Contact>>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contacts = state.store
    .list_contacts(identity.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(contacts))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /api/contacts`.
///
/// There is no owner field: a `user` key in the body is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:  Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
  #[serde(rename = "type", default)]
  pub kind:  ContactType,
}

/// `POST /api/contacts`: returns the stored contact.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Checks::new()
    .not_empty("name", body.name.as_deref(), NAME_REQUIRED)
    .finish()?;

  // A token can outlive its account; the owner row must exist.
  state.store
    .get_user(identity.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(msg::USER_NOT_FOUND))?;

  let input = NewContact {
    name:  body.name.unwrap_or_default().trim().to_owned(),
    email: body.email,
    phone: body.phone,
    kind:  body.kind,
  };

  let contact = state.store
    .insert_contact(identity.user_id, input)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(contact))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /api/contacts/:id`: only the fields present in the body change.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(id): Path<String>,
  JsonBody(mut patch): JsonBody<ContactPatch>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Checks::new()
    .not_empty_if_present("name", patch.name.as_deref(), NAME_REQUIRED)
    .finish()?;
  patch.name = patch.name.map(|n| n.trim().to_owned());

  let contact = owned_contact(state.store.as_ref(), identity, &id).await?;

  // Deleted between the ownership check and the write.
  let updated = state.store
    .update_contact(contact.id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound(msg::CONTACT_NOT_FOUND))?;
  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /api/contacts/:id`: returns `{"msg":"Contact Removed"}`.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
  Path(id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: ContactStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let contact = owned_contact(state.store.as_ref(), identity, &id).await?;

  if !state.store
    .delete_contact(contact.id)
    .await
    .map_err(ApiError::store)?
  {
    return Err(ApiError::NotFound(msg::CONTACT_NOT_FOUND));
  }

  Ok(Json(json!({ "msg": msg::CONTACT_REMOVED })))
}
