//! Handlers for the `names` sub-resource of a person.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/person/:parent/names` | `{"results":[…]}`; unknown parent → empty |
//! | `POST`   | `/person/:parent/names` | Body: [`NameBody`]; 201 |
//! | `GET`    | `/person/:parent/names/:uuid` | 404 if not found |
//! | `POST`   | `/person/:parent/names/:uuid` | Body: [`NameBody`]; partial update |
//! | `DELETE` | `/person/:parent/names/:uuid` | `?reason=…` voids, `?purge=true` purges |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use registry_core::{person::PersonName, store::PersonService};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::ApiError,
  handlers::{NameBody, ViewParams},
  resource::PersonNameResource,
};

/// Resolve `uuid`, insisting that it belongs to `parent`.
async fn find_name<S>(
  resource: &PersonNameResource<S>,
  parent:   Uuid,
  uuid:     Uuid,
) -> Result<PersonName, ApiError>
where
  S: PersonService,
{
  resource
    .get_by_unique_id(uuid)
    .await?
    .filter(|n| resource.get_parent(n) == Some(parent))
    .ok_or_else(|| ApiError::NotFound(format!("person name {uuid} not found")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /person/:parent/names[?v=<rep>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Path(parent): Path<Uuid>,
  Query(params): Query<ViewParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PersonService + Clone + Send + Sync + 'static,
{
  let ctx      = state.context(params.v.as_deref(), Some(user));
  let resource = state.names();

  let person = state
    .store
    .get_person(parent)
    .await
    .map_err(ApiError::store)?;

  let results = resource
    .do_get_all(person.as_ref())
    .iter()
    .map(|n| resource.as_representation(n, &ctx))
    .collect::<Result<Vec<_>, _>>()?;

  Ok(Json(json!({ "results": results })))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /person/:parent/names` — returns 201 + the stored name.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Path(parent): Path<Uuid>,
  Query(params): Query<ViewParams>,
  Json(body): Json<NameBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonService + Clone + Send + Sync + 'static,
{
  let ctx      = state.context(params.v.as_deref(), Some(user));
  let resource = state.names();

  let person = state
    .store
    .get_person(parent)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {parent} not found")))?;

  let mut name = resource.new_delegate(&ctx);
  body.apply(&mut name);
  resource.set_parent(&mut name, &person);

  let saved = resource.save(name).await?;
  tracing::info!(name_uuid = %saved.uuid, person_uuid = %parent, "created person name");
  Ok((StatusCode::CREATED, Json(resource.as_representation(&saved, &ctx)?)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /person/:parent/names/:uuid`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Path((parent, uuid)): Path<(Uuid, Uuid)>,
  Query(params): Query<ViewParams>,
) -> Result<Json<Value>, ApiError>
where
  S: PersonService + Clone + Send + Sync + 'static,
{
  let ctx      = state.context(params.v.as_deref(), Some(user));
  let resource = state.names();
  let name     = find_name(&resource, parent, uuid).await?;
  Ok(Json(resource.as_representation(&name, &ctx)?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `POST /person/:parent/names/:uuid` — only the supplied fields change.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Path((parent, uuid)): Path<(Uuid, Uuid)>,
  Query(params): Query<ViewParams>,
  Json(body): Json<NameBody>,
) -> Result<Json<Value>, ApiError>
where
  S: PersonService + Clone + Send + Sync + 'static,
{
  let ctx      = state.context(params.v.as_deref(), Some(user));
  let resource = state.names();

  let mut name = find_name(&resource, parent, uuid).await?;
  body.apply(&mut name);
  let saved = resource.save(name).await?;
  Ok(Json(resource.as_representation(&saved, &ctx)?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
  pub reason: Option<String>,
  /// Remove the record instead of voiding it.
  #[serde(default)]
  pub purge:  bool,
}

/// `DELETE /person/:parent/names/:uuid[?reason=…][&purge=true]`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Path((parent, uuid)): Path<(Uuid, Uuid)>,
  Query(params): Query<DeleteParams>,
) -> Result<StatusCode, ApiError>
where
  S: PersonService + Clone + Send + Sync + 'static,
{
  let ctx      = state.context(None, Some(user));
  let resource = state.names();
  let name     = find_name(&resource, parent, uuid).await?;

  if params.purge {
    resource.purge(name).await?;
    tracing::info!(name_uuid = %uuid, person_uuid = %parent, "purged person name");
  } else {
    resource.delete(name, params.reason, &ctx).await?;
    tracing::info!(name_uuid = %uuid, person_uuid = %parent, "voided person name");
  }

  Ok(StatusCode::NO_CONTENT)
}
