//! Turning delegates into JSON according to a [`ResourceDescription`].

use chrono::{DateTime, SecondsFormat, Utc};
use registry_core::user::User;
use serde::Serialize;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{
  error::ApiError,
  representation::{Link, Property, RequestContext, ResourceDescription},
};

/// Render `delegate` with `description`: every described property in order,
/// followed by the resolved `links`.
pub fn convert<T: Serialize>(
  delegate:    &T,
  description: &ResourceDescription<T>,
  ctx:         &RequestContext,
  self_uri:    &str,
) -> Result<Value, ApiError> {
  let fields = match serde_json::to_value(delegate)? {
    Value::Object(map) => map,
    _ => Map::new(),
  };

  let mut out = Map::new();
  for (name, property) in description.properties() {
    let value = match property {
      Property::Delegate => fields.get(name).cloned().unwrap_or(Value::Null),
      Property::Computed(getter) => getter(delegate, ctx),
    };
    out.insert(name.to_string(), value);
  }

  if !description.links().is_empty() {
    out.insert("links".into(), links(description.links(), self_uri));
  }

  Ok(Value::Object(out))
}

/// The `links` array.
pub fn links(links: &[Link], self_uri: &str) -> Value {
  Value::Array(
    links
      .iter()
      .map(|l| json!({ "rel": l.rel, "uri": l.resolve(self_uri) }))
      .collect(),
  )
}

/// The standard reference form used when no `ref` description exists.
pub fn reference(uuid: Uuid, display: &str, self_uri: &str) -> Value {
  json!({
    "uuid": uuid,
    "display": display,
    "links": [{ "rel": "self", "uri": self_uri }],
  })
}

/// A timestamp with millisecond precision, or `null`.
pub fn date(dt: Option<DateTime<Utc>>) -> Value {
  dt.map_or(Value::Null, |d| {
    Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true))
  })
}

/// A user in reference form, or `null`.
pub fn user_ref(user: Option<&User>, ctx: &RequestContext) -> Value {
  user.map_or(Value::Null, |u| {
    reference(
      u.user_id,
      &u.username,
      &format!("{}/user/{}", ctx.base_url, u.user_id),
    )
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;
  use crate::representation::Representation;

  #[derive(Serialize)]
  #[serde(rename_all = "camelCase")]
  struct Thing {
    uuid:       Uuid,
    short_name: String,
    secret:     String,
  }

  fn shout(t: &Thing, _: &RequestContext) -> Value {
    Value::String(t.short_name.to_uppercase())
  }

  fn ctx() -> RequestContext {
    RequestContext::new("http://h/api", Representation::Default, None)
  }

  #[test]
  fn convert_picks_described_properties_in_order() {
    let thing = Thing {
      uuid:       Uuid::new_v4(),
      short_name: "abc".into(),
      secret:     "hidden".into(),
    };
    let description = ResourceDescription::<Thing>::new()
      .add_computed_property("loud", shout)
      .add_property("shortName")
      .add_property("missing")
      .add_self_link();

    let value = convert(&thing, &description, &ctx(), "http://h/api/thing/1").unwrap();
    let obj = value.as_object().unwrap();

    let keys: Vec<_> = obj.keys().map(String::as_str).collect();
    assert_eq!(keys, ["loud", "shortName", "missing", "links"]);
    assert_eq!(obj["loud"], "ABC");
    assert_eq!(obj["shortName"], "abc");
    assert_eq!(obj["missing"], Value::Null);
    assert!(!obj.contains_key("secret"));
    assert_eq!(obj["links"][0]["uri"], "http://h/api/thing/1");
  }

  #[test]
  fn date_has_millis_and_utc_marker() {
    let dt = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    assert_eq!(date(Some(dt)), "2024-03-01T12:30:00.000Z");
    assert_eq!(date(None), Value::Null);
  }

  #[test]
  fn user_ref_links_to_user() {
    let user = User {
      user_id:    Uuid::new_v4(),
      username:   "admin".into(),
      created_at: Utc::now(),
    };
    let value = user_ref(Some(&user), &ctx());
    assert_eq!(value["display"], "admin");
    assert_eq!(
      value["links"][0]["uri"],
      format!("http://h/api/user/{}", user.user_id)
    );
    assert_eq!(user_ref(None, &ctx()), Value::Null);
  }
}
