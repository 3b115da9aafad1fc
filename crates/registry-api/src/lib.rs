//! JSON REST API for the person registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`registry_core::store::PersonService`]. Person names are served as a
//! sub-resource of their owning person.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/ws/rest/v1", registry_api::router(state))
//! ```

pub mod auth;
pub mod conversion;
pub mod error;
pub mod handlers;
pub mod person;
pub mod representation;
pub mod resource;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use registry_core::{store::PersonService, user::User};
use serde::Deserialize;

use auth::AuthConfig;
use handlers::{names, persons};
use person::PersonResource;
use representation::{Representation, RequestContext};
use resource::PersonNameResource;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// Absolute URL under which the router is mounted; used for links.
  pub base_url:           String,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: PersonService> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

impl<S: PersonService> AppState<S> {
  /// Build the per-request context from the `v` parameter and the caller.
  pub fn context(&self, v: Option<&str>, user: Option<User>) -> RequestContext {
    RequestContext::new(&self.config.base_url, Representation::parse(v), user)
  }

  pub fn names(&self) -> PersonNameResource<S> { PersonNameResource::new(self.store.clone()) }

  pub fn persons(&self) -> PersonResource<S> { PersonResource::new(self.store.clone()) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the registry API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PersonService + Clone + Send + Sync + 'static,
{
  Router::new()
    // Persons
    .route("/person",                       post(persons::create::<S>))
    .route("/person/{uuid}",                get(persons::get_one::<S>))
    // Names
    .route("/person/{parent}/names",        get(names::list::<S>).post(names::create::<S>))
    .route(
      "/person/{parent}/names/{uuid}",
      get(names::get_one::<S>)
        .post(names::update::<S>)
        .delete(names::delete_one::<S>),
    )
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
