//! The sample contacts installed on first run.

use chrono::DateTime;

use crate::contact::{Contact, ContactId};

struct SeedRow {
  id:         &'static str,
  first_name: &'static str,
  last_name:  &'static str,
  email:      Option<&'static str>,
  phone:      &'static str,
  company:    Option<&'static str>,
  notes:      Option<&'static str>,
  favorite:   bool,
  created_at: i64,
}

const SEED: &[SeedRow] = &[
  SeedRow {
    id:         "1",
    first_name: "John",
    last_name:  "Doe",
    email:      Some("john.doe@example.com"),
    phone:      "+1 555 010 1234",
    company:    Some("Acme Corp"),
    notes:      Some("Met at the 2023 product conference."),
    favorite:   true,
    created_at: 1_704_067_200,
  },
  SeedRow {
    id:         "2",
    first_name: "Jane",
    last_name:  "Smith",
    email:      Some("jane.smith@example.com"),
    phone:      "+1 555 010 5678",
    company:    Some("Globex"),
    notes:      None,
    favorite:   false,
    created_at: 1_704_153_600,
  },
  SeedRow {
    id:         "3",
    first_name: "Carlos",
    last_name:  "Rivera",
    email:      None,
    phone:      "+1 555 010 9012",
    company:    None,
    notes:      Some("Plumber, available weekends."),
    favorite:   false,
    created_at: 1_704_240_000,
  },
  SeedRow {
    id:         "4",
    first_name: "Mei",
    last_name:  "Tanaka",
    email:      Some("mei.tanaka@example.org"),
    phone:      "+1 555 010 3456",
    company:    Some("Initech"),
    notes:      None,
    favorite:   true,
    created_at: 1_704_326_400,
  },
  SeedRow {
    id:         "5",
    first_name: "Amara",
    last_name:  "Okafor",
    email:      Some("amara.okafor@example.net"),
    phone:      "+1 555 010 7890",
    company:    None,
    notes:      None,
    favorite:   false,
    created_at: 1_704_412_800,
  },
];

/// The fixed seed set, in insertion order.
pub fn seed_contacts() -> Vec<Contact> {
  SEED
    .iter()
    .map(|row| Contact {
      id:         ContactId::from(row.id),
      first_name: row.first_name.to_owned(),
      last_name:  row.last_name.to_owned(),
      email:      row.email.map(str::to_owned),
      phone:      row.phone.to_owned(),
      company:    row.company.map(str::to_owned),
      notes:      row.notes.map(str::to_owned),
      avatar:     None,
      favorite:   row.favorite,
      created_at: DateTime::from_timestamp(row.created_at, 0)
        .unwrap_or_default()
        .into(),
    })
    .collect()
}
