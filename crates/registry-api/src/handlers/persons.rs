//! Handlers for `/person` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/person` | Body: `{"names":[…]}`; 201 |
//! | `GET`  | `/person/:uuid` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use registry_core::store::PersonService;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  handlers::{NameBody, ViewParams},
};

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  #[serde(default)]
  pub names: Vec<NameBody>,
}

/// `POST /person` — body: `{"names":[{"givenName":"…","familyName":"…"}]}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Query(params): Query<ViewParams>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonService + Clone + Send + Sync + 'static,
{
  let ctx     = state.context(params.v.as_deref(), Some(user));
  let names   = state.names();
  let persons = state.persons();

  let delegates = body
    .names
    .into_iter()
    .map(|b| {
      let mut name = names.new_delegate(&ctx);
      b.apply(&mut name);
      name
    })
    .collect();

  let person = persons.create(delegates, &ctx).await?;
  tracing::info!(person_uuid = %person.uuid, "created person");
  Ok((StatusCode::CREATED, Json(persons.as_representation(&person, &ctx)?)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /person/:uuid`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Path(uuid): Path<Uuid>,
  Query(params): Query<ViewParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PersonService + Clone + Send + Sync + 'static,
{
  let ctx     = state.context(params.v.as_deref(), Some(user));
  let persons = state.persons();
  let person  = persons
    .get_by_unique_id(uuid)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("person {uuid} not found")))?;
  Ok(Json(persons.as_representation(&person, &ctx)?))
}
