pub mod names;
pub mod persons;

use registry_core::person::PersonName;
use serde::{Deserialize, Deserializer};

/// `?v=` on every route.
#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
  pub v: Option<String>,
}

/// Writable name fields. An absent field is left untouched; an explicit
/// `null` clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameBody {
  pub preferred:          Option<bool>,
  #[serde(default, deserialize_with = "present")]
  pub prefix:             Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub given_name:         Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub middle_name:        Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub family_name_prefix: Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub family_name:        Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub family_name2:       Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub family_name_suffix: Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub degree:             Option<Option<String>>,
}

/// A field that appears in the body, `null` included.
fn present<'de, D>(d: D) -> Result<Option<Option<String>>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(d).map(Some)
}

impl NameBody {
  pub fn apply(self, name: &mut PersonName) {
    fn set(field: &mut Option<String>, value: Option<Option<String>>) {
      if let Some(value) = value {
        *field = value;
      }
    }

    if let Some(preferred) = self.preferred {
      name.preferred = preferred;
    }
    set(&mut name.prefix, self.prefix);
    set(&mut name.given_name, self.given_name);
    set(&mut name.middle_name, self.middle_name);
    set(&mut name.family_name_prefix, self.family_name_prefix);
    set(&mut name.family_name, self.family_name);
    set(&mut name.family_name2, self.family_name2);
    set(&mut name.family_name_suffix, self.family_name_suffix);
    set(&mut name.degree, self.degree);
  }
}
