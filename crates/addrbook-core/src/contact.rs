//! Contact types — the single entity managed by the store.
//!
//! The JSON field names are camelCase so the persisted blob keeps the layout
//! `[{"id": ..., "firstName": ..., "createdAt": ...}, ...]`.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::validate::{ValidationErrors, validate_fields};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque contact identifier. Assigned by the store, never by callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
  /// A fresh random identifier.
  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ContactId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for ContactId {
  fn from(value: String) -> Self { Self(value) }
}

impl From<&str> for ContactId {
  fn from(value: &str) -> Self { Self(value.to_owned()) }
}

// ─── Creation time ───────────────────────────────────────────────────────────

/// Creation timestamp, kept as the exact text it was stored with.
///
/// Records written by other clients may use a different RFC 3339 spelling
/// (`.000Z`, `+00:00`, no fraction). Rewriting the collection must not
/// change it, so the text is never re-rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatedAt(String);

impl CreatedAt {
  pub fn now() -> Self { Self::from(Utc::now()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The parsed instant, if the stored text is valid RFC 3339.
  pub fn instant(&self) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&self.0)
      .ok()
      .map(|t| t.with_timezone(&Utc))
  }
}

impl From<DateTime<Utc>> for CreatedAt {
  fn from(value: DateTime<Utc>) -> Self {
    Self(value.to_rfc3339_opts(SecondsFormat::Millis, true))
  }
}

impl fmt::Display for CreatedAt {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A single address-book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:         ContactId,
  pub first_name: String,
  pub last_name:  String,
  #[serde(
    default,
    deserialize_with = "blank_as_none",
    skip_serializing_if = "Option::is_none"
  )]
  pub email:      Option<String>,
  /// Used verbatim for `tel:` and `sms:` targets.
  pub phone:      String,
  #[serde(
    default,
    deserialize_with = "blank_as_none",
    skip_serializing_if = "Option::is_none"
  )]
  pub company:    Option<String>,
  #[serde(
    default,
    deserialize_with = "blank_as_none",
    skip_serializing_if = "Option::is_none"
  )]
  pub notes:      Option<String>,
  /// URI of an image resource. Rendered as initials when absent.
  #[serde(
    default,
    deserialize_with = "blank_as_none",
    skip_serializing_if = "Option::is_none"
  )]
  pub avatar:     Option<String>,
  #[serde(default)]
  pub favorite:   bool,
  /// Store-assigned creation time; never changes afterwards.
  pub created_at: CreatedAt,
}

impl Contact {
  /// `"First Last"`, as shown in list rows and the details header.
  pub fn display_name(&self) -> String {
    match (self.first_name.is_empty(), self.last_name.is_empty()) {
      (false, false) => format!("{} {}", self.first_name, self.last_name),
      (false, true) => self.first_name.clone(),
      (true, false) => self.last_name.clone(),
      (true, true) => String::new(),
    }
  }

  /// Upper-cased first letters of the first and last name.
  pub fn initials(&self) -> String {
    [&self.first_name, &self.last_name]
      .into_iter()
      .filter_map(|name| name.trim().chars().next())
      .flat_map(char::to_uppercase)
      .collect()
  }

  pub fn validate(&self) -> ValidationErrors {
    validate_fields(
      &self.first_name,
      &self.last_name,
      self.email.as_deref(),
      &self.phone,
    )
  }
}

// ─── NewContact ──────────────────────────────────────────────────────────────

/// Input to [`crate::ContactStore::add`].
///
/// `id` and `createdAt` are always set by the store; they are not accepted
/// from callers. Missing required fields stay empty so that validation can
/// report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewContact {
  pub first_name: String,
  pub last_name:  String,
  pub email:      Option<String>,
  pub phone:      String,
  pub company:    Option<String>,
  pub notes:      Option<String>,
  pub avatar:     Option<String>,
  /// Defaults to `false` when absent.
  pub favorite:   Option<bool>,
}

impl NewContact {
  /// Convenience constructor with all optional fields unset.
  pub fn new(
    first_name: impl Into<String>,
    last_name: impl Into<String>,
    phone: impl Into<String>,
  ) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      phone: phone.into(),
      ..Self::default()
    }
  }

  pub fn validate(&self) -> ValidationErrors {
    validate_fields(
      &self.first_name,
      &self.last_name,
      self.email.as_deref(),
      &self.phone,
    )
  }

  pub(crate) fn into_contact(
    self,
    id: ContactId,
    created_at: CreatedAt,
  ) -> Contact {
    Contact {
      id,
      first_name: self.first_name,
      last_name: self.last_name,
      email: normalize(self.email),
      phone: self.phone,
      company: normalize(self.company),
      notes: normalize(self.notes),
      avatar: normalize(self.avatar),
      favorite: self.favorite.unwrap_or(false),
      created_at,
    }
  }
}

// ─── ContactPatch ────────────────────────────────────────────────────────────

/// Input to [`crate::ContactStore::update`]: the mutable fields only.
///
/// `id` and `createdAt` have no slot here, and deserialization rejects any
/// key outside this set, so a patch can never overwrite them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ContactPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_name:  Option<String>,
  /// `Some("")` clears the address.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub company:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub avatar:     Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub favorite:   Option<bool>,
}

impl ContactPatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Whether applying this patch can change the outcome of validation.
  pub fn touches_validated_fields(&self) -> bool {
    self.first_name.is_some()
      || self.last_name.is_some()
      || self.email.is_some()
      || self.phone.is_some()
  }

  /// Shallow-merge the patch over `contact`. Fields left as `None` keep their
  /// current value; blank optional text clears the field.
  pub fn apply(&self, mut contact: Contact) -> Contact {
    if let Some(first_name) = &self.first_name {
      contact.first_name = first_name.clone();
    }
    if let Some(last_name) = &self.last_name {
      contact.last_name = last_name.clone();
    }
    if let Some(phone) = &self.phone {
      contact.phone = phone.clone();
    }
    if let Some(email) = &self.email {
      contact.email = normalize(Some(email.clone()));
    }
    if let Some(company) = &self.company {
      contact.company = normalize(Some(company.clone()));
    }
    if let Some(notes) = &self.notes {
      contact.notes = normalize(Some(notes.clone()));
    }
    if let Some(avatar) = &self.avatar {
      contact.avatar = normalize(Some(avatar.clone()));
    }
    if let Some(favorite) = self.favorite {
      contact.favorite = favorite;
    }
    contact
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Trim optional text; blank becomes `None`.
fn normalize(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

/// Older blobs wrote `""` for unset optional fields.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(normalize(Option::<String>::deserialize(deserializer)?))
}
