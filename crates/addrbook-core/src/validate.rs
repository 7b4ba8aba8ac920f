//! Contact field validation.
//!
//! Validation accumulates every failing field rather than stopping at the
//! first, so a form can show all of its errors at once.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `local@domain.tld`, no whitespace, exactly one `@`.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

/// A validated contact field, named as it appears in the persisted JSON.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Field {
  FirstName,
  LastName,
  Email,
  Phone,
}

/// Mapping from each failing field to a human-readable message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
  pub fn is_valid(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, field: Field) -> Option<&str> {
    self.0.get(&field).map(String::as_str)
  }

  pub fn contains(&self, field: Field) -> bool { self.0.contains_key(&field) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
    self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
  }

  fn insert(&mut self, field: Field, message: &str) {
    self.0.insert(field, message.to_owned());
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, (field, msg)) in self.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{field}: {msg}")?;
    }
    Ok(())
  }
}

/// Check the validated fields of a contact.
///
/// `first_name`, `last_name` and `phone` must be non-blank. `email` may be
/// absent or blank; otherwise it must look like `local@domain.tld`.
pub fn validate_fields(
  first_name: &str,
  last_name: &str,
  email: Option<&str>,
  phone: &str,
) -> ValidationErrors {
  let mut errors = ValidationErrors::default();

  if first_name.trim().is_empty() {
    errors.insert(Field::FirstName, "First name is required");
  }
  if last_name.trim().is_empty() {
    errors.insert(Field::LastName, "Last name is required");
  }
  if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty())
    && !EMAIL.is_match(email)
  {
    errors.insert(Field::Email, "Please enter a valid email address");
  }
  if phone.trim().is_empty() {
    errors.insert(Field::Phone, "Phone number is required");
  }

  errors
}
