//! Named views of a resource and the descriptions that drive them.
//!
//! A resource answers "which fields go into view X?" with a
//! [`ResourceDescription`]; [`crate::conversion`] turns a delegate plus a
//! description into JSON.

use std::fmt;

use registry_core::user::User;
use serde_json::Value;

// ─── Representation ──────────────────────────────────────────────────────────

/// A named view controlling which fields serialize.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Representation {
  /// Minimal reference: uuid, display string, self link.
  Ref,
  #[default]
  Default,
  Full,
  /// Anything else a client asked for. Resources may not support it.
  Custom(String),
}

impl Representation {
  /// Parse the `v` query parameter; absent means [`Representation::Default`].
  pub fn parse(v: Option<&str>) -> Self {
    match v.map(str::trim) {
      None | Some("") | Some("default") => Self::Default,
      Some("full") => Self::Full,
      Some("ref") => Self::Ref,
      Some(other) => Self::Custom(other.to_string()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::Ref => "ref",
      Self::Default => "default",
      Self::Full => "full",
      Self::Custom(s) => s,
    }
  }
}

impl fmt::Display for Representation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Request context ─────────────────────────────────────────────────────────

/// Per-request information threaded through resource operations.
#[derive(Debug, Clone)]
pub struct RequestContext {
  /// Absolute URL prefix for links, without a trailing slash.
  pub base_url:       String,
  pub representation: Representation,
  /// The authenticated user; stamped as creator or voider.
  pub user:           Option<User>,
}

impl RequestContext {
  pub fn new(base_url: &str, representation: Representation, user: Option<User>) -> Self {
    Self {
      base_url: base_url.trim_end_matches('/').to_string(),
      representation,
      user,
    }
  }
}

// ─── Description ─────────────────────────────────────────────────────────────

/// Computes a property value that is not a plain field of the delegate.
pub type Getter<T> = fn(&T, &RequestContext) -> Value;

/// Where a described property's value comes from.
pub enum Property<T> {
  /// Copied from the delegate's serialized field of the same name.
  Delegate,
  Computed(Getter<T>),
}

/// A hypermedia link. A `uri` starting with `.` is relative to the
/// resource's own uri.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
  pub rel: String,
  pub uri: String,
}

impl Link {
  /// Resolve against `self_uri`.
  pub fn resolve(&self, self_uri: &str) -> String {
    match self.uri.strip_prefix('.') {
      Some(rest) => format!("{self_uri}{rest}"),
      None => self.uri.clone(),
    }
  }
}

/// The ordered set of properties and links making up one representation.
pub struct ResourceDescription<T> {
  properties: Vec<(String, Property<T>)>,
  links:      Vec<Link>,
}

impl<T> Default for ResourceDescription<T> {
  fn default() -> Self {
    Self { properties: Vec::new(), links: Vec::new() }
  }
}

impl<T> ResourceDescription<T> {
  pub fn new() -> Self { Self::default() }

  pub fn add_property(mut self, name: &str) -> Self {
    self.properties.push((name.to_string(), Property::Delegate));
    self
  }

  pub fn add_computed_property(mut self, name: &str, getter: Getter<T>) -> Self {
    self.properties.push((name.to_string(), Property::Computed(getter)));
    self
  }

  pub fn add_self_link(self) -> Self { self.add_link("self", ".") }

  pub fn add_link(mut self, rel: &str, uri: &str) -> Self {
    self.links.push(Link { rel: rel.to_string(), uri: uri.to_string() });
    self
  }

  pub fn properties(&self) -> impl Iterator<Item = (&str, &Property<T>)> {
    self.properties.iter().map(|(name, p)| (name.as_str(), p))
  }

  pub fn property_names(&self) -> Vec<&str> {
    self.properties.iter().map(|(name, _)| name.as_str()).collect()
  }

  pub fn links(&self) -> &[Link] { &self.links }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_representation() {
    assert_eq!(Representation::parse(None), Representation::Default);
    assert_eq!(Representation::parse(Some("default")), Representation::Default);
    assert_eq!(Representation::parse(Some("full")), Representation::Full);
    assert_eq!(Representation::parse(Some("ref")), Representation::Ref);
    assert_eq!(
      Representation::parse(Some("custom:(uuid)")),
      Representation::Custom("custom:(uuid)".into())
    );
  }

  #[test]
  fn relative_links_resolve_against_self() {
    let uri = "http://h/ws/rest/v1/person/p/names/n";
    let full = Link { rel: "full".into(), uri: ".?v=full".into() };
    assert_eq!(full.resolve(uri), format!("{uri}?v=full"));

    let this = Link { rel: "self".into(), uri: ".".into() };
    assert_eq!(this.resolve(uri), uri);

    let abs = Link { rel: "doc".into(), uri: "http://elsewhere".into() };
    assert_eq!(abs.resolve(uri), "http://elsewhere");
  }

  #[test]
  fn context_trims_base_url() {
    let ctx = RequestContext::new("http://h/api/", Representation::Full, None);
    assert_eq!(ctx.base_url, "http://h/api");
  }
}
