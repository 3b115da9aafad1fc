//! [`PersonNameResource`] — person names as a sub-resource of a person.
//!
//! Addressed as `/person/{parent}/names/{uuid}`. Every write goes through
//! [`PersonService::save_person`] on the owning person; the resource only
//! decides what to attach, void or detach before that call.

use std::sync::Arc;

use chrono::Utc;
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
};

/// Path segment under the parent person.
pub const PATH: &str = "names";

/// Absolute uri of the name `uuid` owned by `parent`.
pub fn name_uri(ctx: &RequestContext, parent: Uuid, uuid: Uuid) -> String {
  format!("{}/person/{parent}/{PATH}/{uuid}", ctx.base_url)
}

pub struct PersonNameResource<S> {
  store: Arc<S>,
}

impl<S> Clone for PersonNameResource<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S> PersonNameResource<S>
where
  S: PersonService,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  // ── Representations ───────────────────────────────────────────────────────

  /// The fields making up `rep`, or `None` if this resource does not
  /// support it.
  pub fn get_representation_description(
    &self,
    rep: &Representation,
  ) -> Option<ResourceDescription<PersonName>> {
    match rep {
      Representation::Default => Some(
        ResourceDescription::new()
          .add_property("givenName")
          .add_property("middleName")
          .add_property("familyName")
          .add_property("familyName2")
          .add_self_link()
          .add_link("full", ".?v=full"),
      ),
      Representation::Full => Some(
        ResourceDescription::new()
          .add_property("givenName")
          .add_property("middleName")
          .add_property("familyName")
          .add_property("familyName2")
          .add_property("preferred")
          .add_property("prefix")
          .add_property("familyNamePrefix")
          .add_property("familyNameSuffix")
          .add_property("degree")
          .add_computed_property("auditInfo", Self::get_audit_info)
          .add_self_link(),
      ),
      _ => None,
    }
  }

  /// Render `name` in the context's representation.
  ///
  /// Without a description, `ref` falls back to the standard reference form
  /// and anything else renders as an empty object.
  pub fn as_representation(
    &self,
    name: &PersonName,
    ctx:  &RequestContext,
  ) -> Result<Value, ApiError> {
    let uri = Self::uri(ctx, name)?;
    match self.get_representation_description(&ctx.representation) {
      Some(description) => conversion::convert(name, &description, ctx, &uri),
      None if ctx.representation == Representation::Ref => Ok(conversion::reference(
        name.uuid,
        &self.get_display_string(name),
        &uri,
      )),
      None => {
        tracing::debug!(representation = %ctx.representation, "unsupported representation");
        Ok(Value::Object(Map::new()))
      }
    }
  }

  /// Absolute uri of `name`. A name not yet bound to a person has none.
  pub fn uri(ctx: &RequestContext, name: &PersonName) -> Result<String, ApiError> {
    let parent = name.person.ok_or_else(|| unbound(name))?;
    Ok(name_uri(ctx, parent, name.uuid))
  }

  pub fn get_display_string(&self, name: &PersonName) -> String { name.full_name() }

  /// Book-keeping block for the full representation. The voiding fields are
  /// present only for a voided name.
  pub fn get_audit_info(name: &PersonName, ctx: &RequestContext) -> Value {
    let mut ret = Map::new();
    ret.insert("creator".into(), conversion::user_ref(name.creator.as_ref(), ctx));
    ret.insert("dateCreated".into(), conversion::date(Some(name.date_created)));
    ret.insert("voided".into(), Value::Bool(name.voided));
    if name.voided {
      ret.insert("voidedBy".into(), conversion::user_ref(name.voided_by.as_ref(), ctx));
      ret.insert("dateVoided".into(), conversion::date(name.date_voided));
      ret.insert(
        "voidReason".into(),
        name.void_reason.clone().map_or(Value::Null, Value::String),
      );
    }
    Value::Object(ret)
  }

  // ── Parent linkage ────────────────────────────────────────────────────────

  pub fn get_parent(&self, name: &PersonName) -> Option<Uuid> { name.person }

  pub fn set_parent(&self, name: &mut PersonName, parent: &Person) {
    name.person = Some(parent.uuid);
  }

  async fn load_parent(&self, name: &PersonName) -> Result<Person, ApiError> {
    let parent = self.get_parent(name).ok_or_else(|| unbound(name))?;
    self
      .store
      .get_person(parent)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::NotFound(format!("person {parent} not found")))
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// All names of `parent`; no parent means no names.
  pub fn do_get_all(&self, parent: Option<&Person>) -> Vec<PersonName> {
    parent.map(|p| p.names.clone()).unwrap_or_default()
  }

  pub async fn get_by_unique_id(&self, uuid: Uuid) -> Result<Option<PersonName>, ApiError> {
    self
      .store
      .get_person_name_by_uuid(uuid)
      .await
      .map_err(ApiError::store)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// A fresh name created by the requesting user.
  pub fn new_delegate(&self, ctx: &RequestContext) -> PersonName {
    PersonName::new(ctx.user.clone())
  }

  /// Attach `name` to its person unless an equal active entry is already
  /// there, then save the person. An entry with the same uuid is replaced so
  /// edits to an attached name are persisted; an edit that makes it equal to
  /// another active name is rejected by validation.
  pub async fn save(&self, name: PersonName) -> Result<PersonName, ApiError> {
    let mut parent = self.load_parent(&name).await?;
    let equal_active = |n: &PersonName| !n.voided && n.same_entry(&name);

    if let Some(existing) = parent.names.iter_mut().find(|n| n.uuid == name.uuid) {
      *existing = name.clone();
    } else if !parent.names.iter().any(equal_active) {
      parent.add_name(name.clone());
    }

    tracing::debug!(name_uuid = %name.uuid, person_uuid = %parent.uuid, "saving person name");
    let saved = self
      .store
      .save_person(parent)
      .await
      .map_err(ApiError::store)?;

    saved
      .names
      .iter()
      .find(|n| n.uuid == name.uuid)
      .or_else(|| saved.names.iter().find(|n| equal_active(n)))
      .cloned()
      .ok_or_else(|| ApiError::NotFound(format!("person name {} not found", name.uuid)))
  }

  /// Soft delete: mark voided by the requesting user and save the person.
  pub async fn delete(
    &self,
    name:   PersonName,
    reason: Option<String>,
    ctx:    &RequestContext,
  ) -> Result<(), ApiError> {
    let mut parent = self.load_parent(&name).await?;
    let entry = parent
      .names
      .iter_mut()
      .find(|n| n.uuid == name.uuid)
      .ok_or_else(|| ApiError::NotFound(format!("person name {} not found", name.uuid)))?;
    entry.void(ctx.user.clone(), reason, Utc::now());

    tracing::debug!(name_uuid = %name.uuid, person_uuid = %parent.uuid, "voiding person name");
    self
      .store
      .save_person(parent)
      .await
      .map_err(ApiError::store)?;
    Ok(())
  }

  /// Detach the name from its person entirely and save the person.
  pub async fn purge(&self, name: PersonName) -> Result<(), ApiError> {
    let mut parent = self.load_parent(&name).await?;
    parent.remove_name(name.uuid);

    tracing::debug!(name_uuid = %name.uuid, person_uuid = %parent.uuid, "purging person name");
    self
      .store
      .save_person(parent)
      .await
      .map_err(ApiError::store)?;
    Ok(())
  }
}

fn unbound(name: &PersonName) -> ApiError {
  ApiError::BadRequest(format!("person name {} has no owning person", name.uuid))
}

#[cfg(test)]
mod tests {
  use registry_core::user::User;
  use registry_store_sqlite::SqliteStore;

  use super::*;

  const BASE: &str = "http://localhost/ws/rest/v1";

  struct Fixture {
    resource: PersonNameResource<SqliteStore>,
    store:    Arc<SqliteStore>,
    admin:    User,
  }

  async fn fixture() -> Fixture {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let admin = store.register_user("admin".into()).await.unwrap();
    Fixture {
      resource: PersonNameResource::new(store.clone()),
      store,
      admin,
    }
  }

  fn ctx(f: &Fixture, rep: Representation) -> RequestContext {
    RequestContext::new(BASE, rep, Some(f.admin.clone()))
  }

  fn filled(f: &Fixture, given: &str, family: &str) -> PersonName {
    let mut n = f.resource.new_delegate(&ctx(f, Representation::Default));
    n.given_name = Some(given.into());
    n.family_name = Some(family.into());
    n
  }

  async fn person(f: &Fixture) -> Person {
    let mut p = Person::new(Some(f.admin.clone()));
    p.add_name(filled(f, "Ada", "Lovelace"));
    f.store.save_person(p).await.unwrap()
  }

  // ── Descriptions ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn default_description_fields_and_links() {
    let f = fixture().await;
    let d = f
      .resource
      .get_representation_description(&Representation::Default)
      .unwrap();
    assert_eq!(
      d.property_names(),
      ["givenName", "middleName", "familyName", "familyName2"]
    );
    let rels: Vec<_> = d.links().iter().map(|l| l.rel.as_str()).collect();
    assert_eq!(rels, ["self", "full"]);
  }

  #[tokio::test]
  async fn full_description_fields() {
    let f = fixture().await;
    let d = f
      .resource
      .get_representation_description(&Representation::Full)
      .unwrap();
    assert_eq!(
      d.property_names(),
      [
        "givenName",
        "middleName",
        "familyName",
        "familyName2",
        "preferred",
        "prefix",
        "familyNamePrefix",
        "familyNameSuffix",
        "degree",
        "auditInfo",
      ]
    );
    let rels: Vec<_> = d.links().iter().map(|l| l.rel.as_str()).collect();
    assert_eq!(rels, ["self"]);
  }

  #[tokio::test]
  async fn other_representations_have_no_description() {
    let f = fixture().await;
    assert!(f.resource.get_representation_description(&Representation::Ref).is_none());
    assert!(
      f.resource
        .get_representation_description(&Representation::Custom("custom:(uuid)".into()))
        .is_none()
    );
  }

  #[tokio::test]
  async fn unsupported_representation_renders_no_fields() {
    let f = fixture().await;
    let p = person(&f).await;
    let c = ctx(&f, Representation::Custom("weird".into()));
    let value = f.resource.as_representation(&p.names[0], &c).unwrap();
    assert_eq!(value, Value::Object(Map::new()));
  }

  #[tokio::test]
  async fn ref_falls_back_to_reference_form() {
    let f = fixture().await;
    let p = person(&f).await;
    let n = &p.names[0];
    let value = f
      .resource
      .as_representation(n, &ctx(&f, Representation::Ref))
      .unwrap();
    assert_eq!(value["display"], "Ada Lovelace");
    assert_eq!(value["uuid"], n.uuid.to_string());
    assert_eq!(
      value["links"][0]["uri"],
      format!("{BASE}/person/{}/names/{}", p.uuid, n.uuid)
    );
  }

  // ── Audit info ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn audit_info_omits_void_fields_when_active() {
    let f = fixture().await;
    let p = person(&f).await;
    let info = PersonNameResource::<SqliteStore>::get_audit_info(
      &p.names[0],
      &ctx(&f, Representation::Full),
    );
    let obj = info.as_object().unwrap();
    assert_eq!(obj["creator"]["display"], "admin");
    assert!(obj["dateCreated"].is_string());
    assert_eq!(obj["voided"], false);
    assert!(!obj.contains_key("voidedBy"));
    assert!(!obj.contains_key("dateVoided"));
    assert!(!obj.contains_key("voidReason"));
  }

  // ── Parent linkage / enumeration ──────────────────────────────────────────

  #[tokio::test]
  async fn set_parent_rebinds_owner() {
    let f = fixture().await;
    let p = person(&f).await;
    let mut n = filled(&f, "Augusta", "Byron");
    assert_eq!(f.resource.get_parent(&n), None);
    f.resource.set_parent(&mut n, &p);
    assert_eq!(f.resource.get_parent(&n), Some(p.uuid));
  }

  #[tokio::test]
  async fn get_all_for_absent_parent_is_empty() {
    let f = fixture().await;
    assert!(f.resource.do_get_all(None).is_empty());
    let p = person(&f).await;
    assert_eq!(f.resource.do_get_all(Some(&p)).len(), 1);
  }

  // ── Save ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn save_appends_new_name_once() {
    let f = fixture().await;
    let p = person(&f).await;
    let mut n = filled(&f, "Augusta", "Byron");
    f.resource.set_parent(&mut n, &p);

    f.resource.save(n.clone()).await.unwrap();
    f.resource.save(n.clone()).await.unwrap();

    let stored = f.store.get_person(p.uuid).await.unwrap().unwrap();
    assert_eq!(stored.names.len(), 2);
    assert_eq!(stored.names.iter().filter(|x| x.uuid == n.uuid).count(), 1);
  }

  #[tokio::test]
  async fn save_does_not_duplicate_equal_name() {
    let f = fixture().await;
    let p = person(&f).await;
    let mut twin = filled(&f, "Ada", "Lovelace");
    f.resource.set_parent(&mut twin, &p);

    let returned = f.resource.save(twin).await.unwrap();

    let stored = f.store.get_person(p.uuid).await.unwrap().unwrap();
    assert_eq!(stored.names.len(), 1);
    assert_eq!(returned.uuid, p.names[0].uuid);
  }

  #[tokio::test]
  async fn save_persists_edits_to_attached_name() {
    let f = fixture().await;
    let p = person(&f).await;
    let mut n = p.names[0].clone();
    n.middle_name = Some("Augusta".into());

    let returned = f.resource.save(n).await.unwrap();
    assert_eq!(returned.middle_name.as_deref(), Some("Augusta"));

    let fetched = f.resource.get_by_unique_id(returned.uuid).await.unwrap().unwrap();
    assert_eq!(fetched.middle_name.as_deref(), Some("Augusta"));
  }

  #[tokio::test]
  async fn save_surfaces_validation_error() {
    let f = fixture().await;
    let p = person(&f).await;
    let mut n = f.resource.new_delegate(&ctx(&f, Representation::Default));
    n.given_name = Some("Nameless".into());
    f.resource.set_parent(&mut n, &p);

    let err = f.resource.save(n).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
  }

  #[tokio::test]
  async fn save_after_void_appends_fresh_name() {
    let f = fixture().await;
    let p = person(&f).await;
    let c = ctx(&f, Representation::Default);
    f.resource.delete(p.names[0].clone(), None, &c).await.unwrap();

    let mut again = filled(&f, "Ada", "Lovelace");
    f.resource.set_parent(&mut again, &p);
    let returned = f.resource.save(again.clone()).await.unwrap();
    assert_eq!(returned.uuid, again.uuid);
    assert!(!returned.voided);

    let stored = f.store.get_person(p.uuid).await.unwrap().unwrap();
    assert_eq!(stored.names.len(), 2);
    assert_eq!(stored.names.iter().filter(|n| !n.voided).count(), 1);
  }

  #[tokio::test]
  async fn edit_into_sibling_duplicate_is_rejected() {
    let f = fixture().await;
    let mut p = person(&f).await;
    p.add_name(filled(&f, "Augusta", "Byron"));
    let p = f.store.save_person(p).await.unwrap();

    let mut edited = p.names[1].clone();
    edited.given_name = Some("Ada".into());
    edited.family_name = Some("Lovelace".into());
    let err = f.resource.save(edited).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let stored = f.store.get_person(p.uuid).await.unwrap().unwrap();
    assert_eq!(stored.names[1].family_name.as_deref(), Some("Byron"));
  }

  #[tokio::test]
  async fn unbound_name_has_no_uri() {
    let f = fixture().await;
    let n = filled(&f, "Augusta", "Byron");
    let c = ctx(&f, Representation::Default);
    assert!(matches!(
      PersonNameResource::<SqliteStore>::uri(&c, &n),
      Err(ApiError::BadRequest(_))
    ));
    assert!(f.resource.as_representation(&n, &c).is_err());
  }

  // ── Delete / purge ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_voids_with_actor_reason_and_date() {
    let f = fixture().await;
    let p = person(&f).await;
    let c = ctx(&f, Representation::Full);

    f.resource
      .delete(p.names[0].clone(), Some("misspelt".into()), &c)
      .await
      .unwrap();

    let n = f.resource.get_by_unique_id(p.names[0].uuid).await.unwrap().unwrap();
    assert!(n.voided);
    assert_eq!(n.voided_by.as_ref().map(|u| u.user_id), Some(f.admin.user_id));
    assert_eq!(n.void_reason.as_deref(), Some("misspelt"));
    assert!(n.date_voided.is_some());

    // Still attached.
    let stored = f.store.get_person(p.uuid).await.unwrap().unwrap();
    assert_eq!(stored.names.len(), 1);

    let info = PersonNameResource::<SqliteStore>::get_audit_info(&n, &c);
    assert_eq!(info["voided"], true);
    assert_eq!(info["voidedBy"]["display"], "admin");
    assert!(info["dateVoided"].is_string());
    assert_eq!(info["voidReason"], "misspelt");
  }

  #[tokio::test]
  async fn purge_detaches_name() {
    let f = fixture().await;
    let mut p = person(&f).await;
    p.add_name(filled(&f, "Augusta", "Byron"));
    let p = f.store.save_person(p).await.unwrap();
    let victim = p.names[1].clone();

    f.resource.purge(victim.clone()).await.unwrap();

    let stored = f.store.get_person(p.uuid).await.unwrap().unwrap();
    assert_eq!(stored.names.len(), 1);
    assert!(stored.name(victim.uuid).is_none());
    assert!(f.resource.get_by_unique_id(victim.uuid).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn get_by_unknown_uuid_is_none() {
    let f = fixture().await;
    assert!(f.resource.get_by_unique_id(Uuid::new_v4()).await.unwrap().is_none());
  }
}
