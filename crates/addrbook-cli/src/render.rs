//! Plain-text rendering of contacts and store warnings.

use std::fmt::Write as _;

use addrbook_core::{Contact, Error, ValidationErrors};

/// One list row: favorite marker, avatar or initials, name, phone, id.
pub fn list_row(contact: &Contact) -> String {
  let star = if contact.favorite { '★' } else { ' ' };
  let badge = if contact.avatar.is_some() {
    "[img]".to_string()
  } else {
    format!("[{}]", contact.initials())
  };
  format!(
    "{star} {badge:<6} {name:<28} {phone:<18} {id}",
    name = contact.display_name(),
    phone = contact.phone,
    id = contact.id,
  )
}

/// The details view.
pub fn details(contact: &Contact) -> String {
  let mut out = String::new();
  let star = if contact.favorite { " ★" } else { "" };
  let _ = writeln!(out, "{}{star}", contact.display_name());

  let rows = [
    ("Phone", Some(contact.phone.as_str())),
    ("Email", contact.email.as_deref()),
    ("Company", contact.company.as_deref()),
    ("Notes", contact.notes.as_deref()),
    ("Avatar", contact.avatar.as_deref()),
  ];
  for (label, value) in rows {
    if let Some(value) = value {
      let _ = writeln!(out, "  {label:<8} {value}");
    }
  }
  let added = match contact.created_at.instant() {
    Some(at) => at.format("%Y-%m-%d").to_string(),
    None => contact.created_at.to_string(),
  };
  let _ = writeln!(out, "  {:<8} {added}", "Added");
  let _ = writeln!(out, "  {:<8} {}", "Id", contact.id);
  out
}

/// Every field error on its own line, for showing all at once.
pub fn field_errors(errors: &ValidationErrors) -> String {
  errors
    .iter()
    .map(|(field, msg)| format!("  {field}: {msg}"))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn volatile_warning(err: &Error) -> String {
  format!("warning: saved for this session only, the change may not persist ({err})")
}

#[cfg(test)]
mod tests {
  use addrbook_core::seed::seed_contacts;

  use super::*;

  #[test]
  fn list_row_shows_initials_and_favorite() {
    let john = &seed_contacts()[0];
    let row = list_row(john);
    assert!(row.starts_with('★'));
    assert!(row.contains("[JD]"));
    assert!(row.contains("John Doe"));
    assert!(row.ends_with(john.id.as_str()));

    let jane = &seed_contacts()[1];
    assert!(list_row(jane).starts_with(' '));
  }

  #[test]
  fn details_skip_absent_fields() {
    let carlos = &seed_contacts()[2];
    let text = details(carlos);
    assert!(text.starts_with("Carlos Rivera\n"));
    assert!(text.contains("Phone"));
    assert!(text.contains("Notes"));
    assert!(!text.contains("Email"));
    assert!(!text.contains("Company"));
  }
}
