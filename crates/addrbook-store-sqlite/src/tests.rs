//! Integration tests for `SqliteStore`.

use addrbook_core::{
  ContactId, ContactPatch, ContactStore, LoadSource, NewContact,
  kv::KeyValueStore, seed::seed_contacts,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Key-value ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_key_returns_none() {
  let s = store().await;
  assert_eq!(s.get("contacts").await.unwrap(), None);
}

#[tokio::test]
async fn set_then_get() {
  let s = store().await;
  s.set("contacts", "[]".into()).await.unwrap();
  assert_eq!(s.get("contacts").await.unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn set_replaces_previous_value() {
  let s = store().await;
  s.set("contacts", "[1]".into()).await.unwrap();
  s.set("contacts", "[1,2]".into()).await.unwrap();
  s.set("other", "x".into()).await.unwrap();

  assert_eq!(s.get("contacts").await.unwrap().as_deref(), Some("[1,2]"));
  assert_eq!(s.get("other").await.unwrap().as_deref(), Some("x"));
}

#[tokio::test]
async fn values_survive_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("data").join("addrbook.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.set("contacts", "[\"kept\"]".into()).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(
    s.get("contacts").await.unwrap().as_deref(),
    Some("[\"kept\"]")
  );
}

#[tokio::test]
async fn refuses_newer_schema() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("future.db");

  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 99;").unwrap();
  }

  match SqliteStore::open(&path).await {
    Err(Error::SchemaVersion { found, supported }) => {
      assert_eq!(found, 99);
      assert_eq!(supported, 1);
    }
    Err(other) => panic!("unexpected error: {other}"),
    Ok(_) => panic!("opened a database with a newer schema"),
  }
}

// ─── Through the contact store ───────────────────────────────────────────────

#[tokio::test]
async fn contact_store_round_trips_through_sqlite() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("addrbook.db");

  let last = {
    let contacts = ContactStore::new(SqliteStore::open(&path).await.unwrap());
    let loaded = contacts.initialize().await;
    assert!(matches!(loaded.source, LoadSource::Seeded(_)));
    assert_eq!(loaded.contacts.len(), seed_contacts().len());

    let ada = contacts
      .add(NewContact::new("Ada", "Lovelace", "555-0100"))
      .await
      .unwrap();
    assert!(ada.is_persisted());

    let patch = ContactPatch { company: Some("Acme".into()), ..Default::default() };
    let _ = contacts.update(&ada.value.id, patch).await.unwrap();
    let _ = contacts.delete(&ContactId::from("1")).await;
    contacts.list()
  };

  let contacts = ContactStore::new(SqliteStore::open(&path).await.unwrap());
  let loaded = contacts.initialize().await;

  assert!(matches!(loaded.source, LoadSource::Stored));
  assert_eq!(&*loaded.contacts, &*last);
  assert!(
    loaded
      .contacts
      .iter()
      .any(|c| c.first_name == "Ada" && c.company.as_deref() == Some("Acme"))
  );
}
