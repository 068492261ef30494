//! [`SqliteStore`]: the SQLite implementation of [`ContactStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use keeper_core::{
  contact::{Contact, ContactPatch, NewContact},
  store::ContactStore,
  user::{NewUser, User},
};

use crate::{
  encode::{
    encode_dt, encode_uuid, now, RawContact, RawUser, CONTACT_COLUMNS,
    USER_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Contact Keeper store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a single user row matching `column = value`.
  async fn user_where(
    &self,
    column: &'static str,
    value:  String,
  ) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
            rusqlite::params![value],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let user = User {
      id:            Uuid::new_v4(),
      name:          input.name,
      email:         input.email,
      password_hash: input.password_hash,
      date:          now(),
    };

    let id_str    = encode_uuid(user.id);
    let name      = user.name.clone();
    let email     = user.email.clone();
    let hash      = user.password_hash.clone();
    let at_str    = encode_dt(user.date);

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO users (user_id, name, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![id_str, name, email, hash, at_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(inserted.then_some(user))
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.user_where("user_id", encode_uuid(id)).await
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    self.user_where("email", email.to_owned()).await
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn list_contacts(&self, owner: Uuid) -> Result<Vec<Contact>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawContact> = self
      .conn
      .call(move |conn| {
        // rowid breaks ties between contacts created within the same microsecond.
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts
           WHERE owner_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE contact_id = ?1"),
            rusqlite::params![id_str],
            RawContact::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn insert_contact(&self, owner: Uuid, input: NewContact) -> Result<Contact> {
    let contact = Contact {
      id:    Uuid::new_v4(),
      user:  owner,
      name:  input.name,
      email: input.email,
      phone: input.phone,
      kind:  input.kind,
      date:  now(),
    };

    let id_str    = encode_uuid(contact.id);
    let owner_str = encode_uuid(owner);
    let name      = contact.name.clone();
    let email     = contact.email.clone();
    let phone     = contact.phone.clone();
    let kind_str  = contact.kind.as_str();
    let at_str    = encode_dt(contact.date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (
             contact_id, owner_id, name, email, phone, contact_type, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, owner_str, name, email, phone, kind_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(contact)
  }

  async fn update_contact(
    &self,
    id:    Uuid,
    patch: ContactPatch,
  ) -> Result<Option<Contact>> {
    let id_str   = encode_uuid(id);
    let kind_str = patch.kind.map(|k| k.as_str());

    // Absent fields bind as NULL and COALESCE keeps the stored value, so the
    // whole patch lands in a single statement.
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "UPDATE contacts SET
                 name         = COALESCE(?2, name),
                 email        = COALESCE(?3, email),
                 phone        = COALESCE(?4, phone),
                 contact_type = COALESCE(?5, contact_type)
               WHERE contact_id = ?1
               RETURNING {CONTACT_COLUMNS}"
            ),
            rusqlite::params![id_str, patch.name, patch.email, patch.phone, kind_str],
            RawContact::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn delete_contact(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM contacts WHERE contact_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }
}
