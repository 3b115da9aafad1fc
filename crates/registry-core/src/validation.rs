//! Checks run by stores before a person is written.

use crate::{Error, Result, person::Person};

/// Maximum length, in characters, of any single name part.
pub const MAX_NAME_PART_LEN: usize = 50;

fn blank(part: Option<&str>) -> bool {
  part.is_none_or(|p| p.trim().is_empty())
}

/// Validate `person` and every name attached to it.
pub fn validate_person(person: &Person) -> Result<()> {
  for (i, name) in person.names.iter().enumerate() {
    if name.person != Some(person.uuid) {
      return Err(Error::Validation(format!(
        "name {} is not owned by person {}",
        name.uuid, person.uuid
      )));
    }

    if !name.voided {
      if blank(name.given_name.as_deref()) {
        return Err(Error::Validation(format!(
          "name {}: givenName is required",
          name.uuid
        )));
      }
      if blank(name.family_name.as_deref()) {
        return Err(Error::Validation(format!(
          "name {}: familyName is required",
          name.uuid
        )));
      }
      if let Some(twin) = person.names[..i]
        .iter()
        .find(|o| !o.voided && o.same_entry(name))
      {
        return Err(Error::Validation(format!(
          "name {} duplicates name {}",
          name.uuid, twin.uuid
        )));
      }
    } else if name.date_voided.is_none() {
      return Err(Error::Validation(format!(
        "name {}: voided without dateVoided",
        name.uuid
      )));
    }

    if let Some(part) = name
      .parts()
      .into_iter()
      .flatten()
      .find(|p| p.chars().count() > MAX_NAME_PART_LEN)
    {
      return Err(Error::Validation(format!(
        "name {}: {part:?} exceeds {MAX_NAME_PART_LEN} characters",
        name.uuid
      )));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::person::PersonName;

  fn person_with(given: Option<&str>, family: Option<&str>) -> Person {
    let mut person = Person::new(None);
    let mut name = PersonName::new(None);
    name.given_name = given.map(Into::into);
    name.family_name = family.map(Into::into);
    person.add_name(name);
    person
  }

  #[test]
  fn complete_name_passes() {
    assert!(validate_person(&person_with(Some("Ada"), Some("Lovelace"))).is_ok());
  }

  #[test]
  fn missing_given_name_fails() {
    let err = validate_person(&person_with(None, Some("Lovelace"))).unwrap_err();
    assert!(matches!(err, Error::Validation(m) if m.contains("givenName")));
  }

  #[test]
  fn blank_family_name_fails() {
    let err = validate_person(&person_with(Some("Ada"), Some("   "))).unwrap_err();
    assert!(matches!(err, Error::Validation(m) if m.contains("familyName")));
  }

  #[test]
  fn voided_name_may_be_incomplete() {
    let mut person = person_with(None, None);
    person.names[0].void(None, Some("entered in error".into()), Utc::now());
    assert!(validate_person(&person).is_ok());
  }

  #[test]
  fn overlong_part_fails() {
    let long = "x".repeat(MAX_NAME_PART_LEN + 1);
    let person = person_with(Some(&long), Some("Lovelace"));
    assert!(matches!(validate_person(&person), Err(Error::Validation(_))));
  }

  #[test]
  fn foreign_name_fails() {
    let mut person = person_with(Some("Ada"), Some("Lovelace"));
    person.names[0].person = None;
    assert!(matches!(validate_person(&person), Err(Error::Validation(_))));
  }

  #[test]
  fn duplicate_active_names_fail() {
    let mut person = person_with(Some("Ada"), Some("Lovelace"));
    let mut twin = PersonName::new(None);
    twin.given_name = Some("Ada".into());
    twin.family_name = Some("Lovelace".into());
    person.add_name(twin);
    let err = validate_person(&person).unwrap_err();
    assert!(matches!(err, Error::Validation(m) if m.contains("duplicates")));
  }

  #[test]
  fn voided_name_may_repeat_active_one() {
    let mut person = person_with(Some("Ada"), Some("Lovelace"));
    person.names[0].void(None, None, Utc::now());
    let mut again = PersonName::new(None);
    again.given_name = Some("Ada".into());
    again.family_name = Some("Lovelace".into());
    person.add_name(again);
    assert!(validate_person(&person).is_ok());
  }
}
