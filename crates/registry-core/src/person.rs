//! Person and PersonName — the owning entity and its name records.
//!
//! A name is never persisted on its own: it is attached to its person's
//! `names` collection and written by saving the person. Removing a name is
//! either a soft delete ([`PersonName::void`]) that keeps the record, or a
//! purge ([`Person::remove_name`]) that detaches it from the collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::User;

// ─── PersonName ──────────────────────────────────────────────────────────────

/// One name of a person, with its audit metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
  pub uuid:               Uuid,
  /// The owning person. `None` only for a fresh delegate that has not been
  /// bound to a parent yet.
  #[serde(skip)]
  pub person:             Option<Uuid>,
  pub preferred:          bool,
  pub prefix:             Option<String>,
  pub given_name:         Option<String>,
  pub middle_name:        Option<String>,
  pub family_name_prefix: Option<String>,
  pub family_name:        Option<String>,
  pub family_name2:       Option<String>,
  pub family_name_suffix: Option<String>,
  pub degree:             Option<String>,

  // audit
  pub creator:            Option<User>,
  pub date_created:       DateTime<Utc>,
  pub voided:             bool,
  pub voided_by:          Option<User>,
  pub date_voided:        Option<DateTime<Utc>>,
  pub void_reason:        Option<String>,
}

impl PersonName {
  /// A fresh, unattached name with a new uuid, created now by `creator`.
  pub fn new(creator: Option<User>) -> Self {
    Self {
      uuid: Uuid::new_v4(),
      person: None,
      preferred: false,
      prefix: None,
      given_name: None,
      middle_name: None,
      family_name_prefix: None,
      family_name: None,
      family_name2: None,
      family_name_suffix: None,
      degree: None,
      creator,
      date_created: Utc::now(),
      voided: false,
      voided_by: None,
      date_voided: None,
      void_reason: None,
    }
  }

  /// The name parts in display order.
  pub fn parts(&self) -> [Option<&str>; 8] {
    [
      self.prefix.as_deref(),
      self.given_name.as_deref(),
      self.middle_name.as_deref(),
      self.family_name_prefix.as_deref(),
      self.family_name.as_deref(),
      self.family_name2.as_deref(),
      self.family_name_suffix.as_deref(),
      self.degree.as_deref(),
    ]
  }

  /// All non-blank parts joined with single spaces.
  pub fn full_name(&self) -> String {
    self
      .parts()
      .into_iter()
      .flatten()
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// Value equality used to keep a person's name list free of duplicates:
  /// the same record, or the same owner with identical name parts.
  pub fn same_entry(&self, other: &PersonName) -> bool {
    if self.uuid == other.uuid {
      return true;
    }
    self.person == other.person && self.parts() == other.parts()
  }

  /// Soft-delete this name. The record is kept; only the audit fields change.
  pub fn void(&mut self, by: Option<User>, reason: Option<String>, at: DateTime<Utc>) {
    self.voided = true;
    self.voided_by = by;
    self.void_reason = reason;
    self.date_voided = Some(at);
  }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// The owner of a list of names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub uuid:         Uuid,
  pub creator:      Option<User>,
  pub date_created: DateTime<Utc>,
  /// Every name of this person, voided ones included, in insertion order.
  pub names:        Vec<PersonName>,
}

impl Person {
  pub fn new(creator: Option<User>) -> Self {
    Self {
      uuid: Uuid::new_v4(),
      creator,
      date_created: Utc::now(),
      names: Vec::new(),
    }
  }

  /// Bind `name` to this person and append it.
  pub fn add_name(&mut self, mut name: PersonName) {
    name.person = Some(self.uuid);
    self.names.push(name);
  }

  /// Detach the name with `uuid`, returning it if it was present.
  pub fn remove_name(&mut self, uuid: Uuid) -> Option<PersonName> {
    let idx = self.names.iter().position(|n| n.uuid == uuid)?;
    Some(self.names.remove(idx))
  }

  pub fn name(&self, uuid: Uuid) -> Option<&PersonName> {
    self.names.iter().find(|n| n.uuid == uuid)
  }

  /// First non-voided preferred name, else the first non-voided name.
  pub fn preferred_name(&self) -> Option<&PersonName> {
    let mut active = self.names.iter().filter(|n| !n.voided);
    self
      .names
      .iter()
      .find(|n| n.preferred && !n.voided)
      .or_else(|| active.next())
  }
}
