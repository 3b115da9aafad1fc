//! [`PersonResource`] — the parent resource that owns person names.
//!
//! Only creation and retrieval are exposed; names are managed through
//! [`crate::resource::PersonNameResource`].

use std::sync::Arc;

use registry_core::{
  person::{Person, PersonName},
  store::PersonService,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
  conversion,
  error::ApiError,
  representation::{Representation, RequestContext, ResourceDescription},
  resource::name_uri,
};

pub struct PersonResource<S> {
  store: Arc<S>,
}

impl<S> Clone for PersonResource<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S> PersonResource<S>
where
  S: PersonService,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn get_representation_description(
    &self,
    rep: &Representation,
  ) -> Option<ResourceDescription<Person>> {
    match rep {
      Representation::Default => Some(
        ResourceDescription::new()
          .add_property("uuid")
          .add_computed_property("display", display)
          .add_computed_property("names", active_names)
          .add_self_link()
          .add_link("full", ".?v=full"),
      ),
      Representation::Full => Some(
        ResourceDescription::new()
          .add_property("uuid")
          .add_computed_property("display", display)
          .add_computed_property("names", all_names)
          .add_computed_property("auditInfo", audit_info)
          .add_self_link(),
      ),
      _ => None,
    }
  }

  pub fn as_representation(
    &self,
    person: &Person,
    ctx:    &RequestContext,
  ) -> Result<Value, ApiError> {
    let uri = Self::uri(ctx, person.uuid);
    match self.get_representation_description(&ctx.representation) {
      Some(description) => conversion::convert(person, &description, ctx, &uri),
      None if ctx.representation == Representation::Ref => Ok(conversion::reference(
        person.uuid,
        &display_string(person),
        &uri,
      )),
      None => Ok(Value::Object(Map::new())),
    }
  }

  pub fn uri(ctx: &RequestContext, uuid: Uuid) -> String {
    format!("{}/person/{uuid}", ctx.base_url)
  }

  pub async fn get_by_unique_id(&self, uuid: Uuid) -> Result<Option<Person>, ApiError> {
    self.store.get_person(uuid).await.map_err(ApiError::store)
  }

  /// Create and save a person owning `names`, created by the requesting user.
  pub async fn create(
    &self,
    names: Vec<PersonName>,
    ctx:   &RequestContext,
  ) -> Result<Person, ApiError> {
    let mut person = Person::new(ctx.user.clone());
    for name in names {
      person.add_name(name);
    }
    tracing::debug!(person_uuid = %person.uuid, names = person.names.len(), "creating person");
    self.store.save_person(person).await.map_err(ApiError::store)
  }
}

fn display_string(person: &Person) -> String {
  person
    .preferred_name()
    .map(PersonName::full_name)
    .unwrap_or_default()
}

fn display(person: &Person, _: &RequestContext) -> Value {
  Value::String(display_string(person))
}

fn name_refs<'a>(
  person: &Person,
  names:  impl Iterator<Item = &'a PersonName>,
  ctx:    &RequestContext,
) -> Value {
  Value::Array(
    names
      .map(|n| {
        conversion::reference(n.uuid, &n.full_name(), &name_uri(ctx, person.uuid, n.uuid))
      })
      .collect(),
  )
}

fn active_names(person: &Person, ctx: &RequestContext) -> Value {
  name_refs(person, person.names.iter().filter(|n| !n.voided), ctx)
}

fn all_names(person: &Person, ctx: &RequestContext) -> Value {
  name_refs(person, person.names.iter(), ctx)
}

fn audit_info(person: &Person, ctx: &RequestContext) -> Value {
  let mut ret = Map::new();
  ret.insert("creator".into(), conversion::user_ref(person.creator.as_ref(), ctx));
  ret.insert("dateCreated".into(), conversion::date(Some(person.date_created)));
  Value::Object(ret)
}
