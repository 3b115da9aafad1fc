//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Booleans use SQLite's native integer form.

use chrono::{DateTime, Utc};
use registry_core::{
  person::{Person, PersonName},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Column lists ────────────────────────────────────────────────────────────

/// Columns selected for a name row, joined with its creator and voider.
/// Order must match [`RawPersonName::from_row`].
pub const NAME_COLUMNS: &str = "
  n.name_uuid, n.person_uuid, n.preferred,
  n.prefix, n.given_name, n.middle_name, n.family_name_prefix,
  n.family_name, n.family_name2, n.family_name_suffix, n.degree,
  n.date_created, n.voided, n.date_voided, n.void_reason,
  c.user_id, c.username, c.created_at,
  v.user_id, v.username, v.created_at";

pub const NAME_JOINS: &str = "
  FROM person_names n
  LEFT JOIN users c ON c.user_id = n.creator_id
  LEFT JOIN users v ON v.user_id = n.voided_by_id";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row (or a LEFT JOIN onto one).
pub struct RawUser {
  pub user_id:    String,
  pub username:   String,
  pub created_at: String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      created_at: decode_dt(&self.created_at)?,
    })
  }

  /// Build from the three nullable columns of a LEFT JOIN.
  pub fn from_join(
    user_id:    Option<String>,
    username:   Option<String>,
    created_at: Option<String>,
  ) -> Option<Self> {
    match (user_id, username, created_at) {
      (Some(user_id), Some(username), Some(created_at)) => Some(Self {
        user_id,
        username,
        created_at,
      }),
      _ => None,
    }
  }
}

/// Raw strings read from `person_names` joined with `users`.
pub struct RawPersonName {
  pub name_uuid:          String,
  pub person_uuid:        String,
  pub preferred:          bool,
  pub prefix:             Option<String>,
  pub given_name:         Option<String>,
  pub middle_name:        Option<String>,
  pub family_name_prefix: Option<String>,
  pub family_name:        Option<String>,
  pub family_name2:       Option<String>,
  pub family_name_suffix: Option<String>,
  pub degree:             Option<String>,
  pub date_created:       String,
  pub voided:             bool,
  pub date_voided:        Option<String>,
  pub void_reason:        Option<String>,
  // users joins
  pub creator:            Option<RawUser>,
  pub voided_by:          Option<RawUser>,
}

impl RawPersonName {
  /// Read a row selected with [`NAME_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      name_uuid:          row.get(0)?,
      person_uuid:        row.get(1)?,
      preferred:          row.get(2)?,
      prefix:             row.get(3)?,
      given_name:         row.get(4)?,
      middle_name:        row.get(5)?,
      family_name_prefix: row.get(6)?,
      family_name:        row.get(7)?,
      family_name2:       row.get(8)?,
      family_name_suffix: row.get(9)?,
      degree:             row.get(10)?,
      date_created:       row.get(11)?,
      voided:             row.get(12)?,
      date_voided:        row.get(13)?,
      void_reason:        row.get(14)?,
      creator:            RawUser::from_join(row.get(15)?, row.get(16)?, row.get(17)?),
      voided_by:          RawUser::from_join(row.get(18)?, row.get(19)?, row.get(20)?),
    })
  }

  pub fn into_name(self) -> Result<PersonName> {
    Ok(PersonName {
      uuid:               decode_uuid(&self.name_uuid)?,
      person:             Some(decode_uuid(&self.person_uuid)?),
      preferred:          self.preferred,
      prefix:             self.prefix,
      given_name:         self.given_name,
      middle_name:        self.middle_name,
      family_name_prefix: self.family_name_prefix,
      family_name:        self.family_name,
      family_name2:       self.family_name2,
      family_name_suffix: self.family_name_suffix,
      degree:             self.degree,
      creator:            self.creator.map(RawUser::into_user).transpose()?,
      date_created:       decode_dt(&self.date_created)?,
      voided:             self.voided,
      voided_by:          self.voided_by.map(RawUser::into_user).transpose()?,
      date_voided:        self.date_voided.as_deref().map(decode_dt).transpose()?,
      void_reason:        self.void_reason,
    })
  }
}

/// Raw strings read from `persons` joined with its creator.
pub struct RawPerson {
  pub person_uuid:  String,
  pub date_created: String,
  pub creator:      Option<RawUser>,
}

impl RawPerson {
  pub fn into_person(self, names: Vec<PersonName>) -> Result<Person> {
    Ok(Person {
      uuid:         decode_uuid(&self.person_uuid)?,
      creator:      self.creator.map(RawUser::into_user).transpose()?,
      date_created: decode_dt(&self.date_created)?,
      names,
    })
  }
}

/// A name flattened into owned column values, ready to move into a
/// `tokio_rusqlite` closure.
pub struct NameRow {
  pub name_uuid:          String,
  pub person_uuid:        String,
  pub preferred:          bool,
  pub prefix:             Option<String>,
  pub given_name:         Option<String>,
  pub middle_name:        Option<String>,
  pub family_name_prefix: Option<String>,
  pub family_name:        Option<String>,
  pub family_name2:       Option<String>,
  pub family_name_suffix: Option<String>,
  pub degree:             Option<String>,
  pub creator_id:         Option<String>,
  pub date_created:       String,
  pub voided:             bool,
  pub voided_by_id:       Option<String>,
  pub date_voided:        Option<String>,
  pub void_reason:        Option<String>,
}

impl NameRow {
  pub fn encode(person_uuid: Uuid, name: &PersonName) -> Self {
    Self {
      name_uuid:          encode_uuid(name.uuid),
      person_uuid:        encode_uuid(person_uuid),
      preferred:          name.preferred,
      prefix:             name.prefix.clone(),
      given_name:         name.given_name.clone(),
      middle_name:        name.middle_name.clone(),
      family_name_prefix: name.family_name_prefix.clone(),
      family_name:        name.family_name.clone(),
      family_name2:       name.family_name2.clone(),
      family_name_suffix: name.family_name_suffix.clone(),
      degree:             name.degree.clone(),
      creator_id:         name.creator.as_ref().map(|u| encode_uuid(u.user_id)),
      date_created:       encode_dt(name.date_created),
      voided:             name.voided,
      voided_by_id:       name.voided_by.as_ref().map(|u| encode_uuid(u.user_id)),
      date_voided:        name.date_voided.map(encode_dt),
      void_reason:        name.void_reason.clone(),
    }
  }
}
