//! [`SqliteStore`] — the SQLite implementation of [`PersonService`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use registry_core::{
  person::{Person, PersonName},
  store::PersonService,
  user::User,
  validation::validate_person,
};

use crate::{
  encode::{
    encode_dt, encode_uuid, NameRow, RawPerson, RawPersonName, RawUser, NAME_COLUMNS,
    NAME_JOINS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A person registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
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

  /// Open an in-memory store — useful for testing.
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

  async fn load_names(&self, person_uuid: Uuid) -> Result<Vec<PersonName>> {
    let id_str = encode_uuid(person_uuid);

    let raws: Vec<RawPersonName> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NAME_COLUMNS} {NAME_JOINS}
           WHERE n.person_uuid = ?1
           ORDER BY n.rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawPersonName::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPersonName::into_name).collect()
  }
}

// ─── PersonService impl ──────────────────────────────────────────────────────

impl PersonService for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn register_user(&self, username: String) -> Result<User> {
    let id_str = encode_uuid(Uuid::new_v4());
    let at_str = encode_dt(Utc::now());
    let name   = username.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, created_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (username) DO NOTHING",
          rusqlite::params![id_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    // The row exists now, either freshly inserted or from an earlier call.
    self
      .get_user_by_username(username.clone())
      .await?
      .ok_or(Error::UserNotFound(username))
  }

  async fn get_user_by_username(&self, username: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT user_id, username, created_at FROM users WHERE username = ?1",
            rusqlite::params![username],
            |row| {
              Ok(RawUser {
                user_id:    row.get(0)?,
                username:   row.get(1)?,
                created_at: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn get_person(&self, uuid: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(uuid);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT p.person_uuid, p.date_created,
                    c.user_id, c.username, c.created_at
             FROM persons p
             LEFT JOIN users c ON c.user_id = p.creator_id
             WHERE p.person_uuid = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawPerson {
                person_uuid:  row.get(0)?,
                date_created: row.get(1)?,
                creator:      RawUser::from_join(row.get(2)?, row.get(3)?, row.get(4)?),
              })
            },
          )
          .optional()?)
      })
      .await?;

    let Some(raw) = raw else {
      return Ok(None);
    };

    let names = self.load_names(uuid).await?;
    raw.into_person(names).map(Some)
  }

  async fn save_person(&self, person: Person) -> Result<Person> {
    validate_person(&person)?;

    let person_uuid  = person.uuid;
    let person_str   = encode_uuid(person.uuid);
    let creator_str  = person.creator.as_ref().map(|u| encode_uuid(u.user_id));
    let created_str  = encode_dt(person.date_created);
    let rows: Vec<NameRow> = person
      .names
      .iter()
      .map(|n| NameRow::encode(person.uuid, n))
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Creator and creation date are fixed at first save.
        tx.execute(
          "INSERT INTO persons (person_uuid, creator_id, date_created)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (person_uuid) DO NOTHING",
          rusqlite::params![person_str, creator_str, created_str],
        )?;

        for row in &rows {
          tx.execute(
            "INSERT INTO person_names (
               name_uuid, person_uuid, preferred,
               prefix, given_name, middle_name, family_name_prefix,
               family_name, family_name2, family_name_suffix, degree,
               creator_id, date_created,
               voided, voided_by_id, date_voided, void_reason
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
             ON CONFLICT (name_uuid) DO UPDATE SET
               preferred          = excluded.preferred,
               prefix             = excluded.prefix,
               given_name         = excluded.given_name,
               middle_name        = excluded.middle_name,
               family_name_prefix = excluded.family_name_prefix,
               family_name        = excluded.family_name,
               family_name2       = excluded.family_name2,
               family_name_suffix = excluded.family_name_suffix,
               degree             = excluded.degree,
               voided             = excluded.voided,
               voided_by_id       = excluded.voided_by_id,
               date_voided        = excluded.date_voided,
               void_reason        = excluded.void_reason
             WHERE person_names.person_uuid = excluded.person_uuid",
            rusqlite::params![
              row.name_uuid,
              row.person_uuid,
              row.preferred,
              row.prefix,
              row.given_name,
              row.middle_name,
              row.family_name_prefix,
              row.family_name,
              row.family_name2,
              row.family_name_suffix,
              row.degree,
              row.creator_id,
              row.date_created,
              row.voided,
              row.voided_by_id,
              row.date_voided,
              row.void_reason,
            ],
          )?;
        }

        // Anything stored for this person but no longer in its list is purged.
        let kept: HashSet<&str> = rows.iter().map(|r| r.name_uuid.as_str()).collect();
        let stored: Vec<String> = {
          let mut stmt =
            tx.prepare("SELECT name_uuid FROM person_names WHERE person_uuid = ?1")?;
          stmt
            .query_map(rusqlite::params![person_str], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        for uuid in stored.iter().filter(|u| !kept.contains(u.as_str())) {
          tx.execute(
            "DELETE FROM person_names WHERE name_uuid = ?1",
            rusqlite::params![uuid],
          )?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;

    self
      .get_person(person_uuid)
      .await?
      .ok_or(Error::PersonNotFound(person_uuid))
  }

  // ── Names ─────────────────────────────────────────────────────────────────

  async fn get_person_name_by_uuid(&self, uuid: Uuid) -> Result<Option<PersonName>> {
    let id_str = encode_uuid(uuid);

    let raw: Option<RawPersonName> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {NAME_COLUMNS} {NAME_JOINS} WHERE n.name_uuid = ?1"),
            rusqlite::params![id_str],
            RawPersonName::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPersonName::into_name).transpose()
  }
}
