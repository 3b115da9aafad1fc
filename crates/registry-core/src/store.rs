//! The `PersonService` trait.
//!
//! The trait is implemented by storage backends (e.g. `registry-store-sqlite`).
//! The REST layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  person::{Person, PersonName},
  user::User,
};

/// Abstraction over person persistence.
///
/// Names are written only through [`PersonService::save_person`]: the saved
/// person's `names` collection is authoritative, so a name missing from it is
/// physically removed.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonService: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Return the user called `username`, creating it if it does not exist.
  fn register_user(
    &self,
    username: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Retrieve a person and all of its names. Returns `None` if not found.
  fn get_person(
    &self,
    uuid: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Validate and persist `person` together with its names, returning the
  /// person as re-read from storage.
  ///
  /// Returns an error wrapping [`crate::Error::Validation`] if the person or
  /// one of its names is invalid.
  fn save_person(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  // ── Names ─────────────────────────────────────────────────────────────

  /// Retrieve a single name by its uuid. Returns `None` if not found.
  fn get_person_name_by_uuid(
    &self,
    uuid: Uuid,
  ) -> impl Future<Output = Result<Option<PersonName>, Self::Error>> + Send + '_;
}
