//! Behavioural tests for `ContactStore` against in-memory providers.

use std::{
  io,
  sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use crate::{
  Contact, ContactId, ContactPatch, ContactStore, Durability, Error, Field,
  LoadSource, NewContact,
  kv::{KeyValueStore, MemoryStore},
  seed::seed_contacts,
  store::CONTACTS_KEY,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// A memory provider that counts calls and can be told to fail.
#[derive(Default)]
struct ProbeStore {
  inner:       MemoryStore,
  reads:       AtomicUsize,
  writes:      AtomicUsize,
  fail_reads:  AtomicBool,
  fail_writes: AtomicBool,
}

impl ProbeStore {
  fn reads(&self) -> usize { self.reads.load(Ordering::SeqCst) }

  fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

  fn fail_reads(&self, fail: bool) { self.fail_reads.store(fail, Ordering::SeqCst) }

  fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst) }

  async fn stored(&self) -> Option<Vec<Contact>> {
    let raw = self.inner.get(CONTACTS_KEY).await.unwrap()?;
    Some(serde_json::from_str(&raw).unwrap())
  }
}

impl KeyValueStore for ProbeStore {
  type Error = io::Error;

  async fn get(&self, key: &str) -> io::Result<Option<String>> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(io::Error::other("disk unavailable"));
    }
    Ok(self.inner.get(key).await.unwrap())
  }

  async fn set(&self, key: &str, value: String) -> io::Result<()> {
    self.writes.fetch_add(1, Ordering::SeqCst);
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(io::Error::other("disk full"));
    }
    self.inner.set(key, value).await.unwrap();
    Ok(())
  }
}

async fn loaded() -> (ContactStore<Arc<ProbeStore>>, Arc<ProbeStore>) {
  let probe = Arc::new(ProbeStore::default());
  let store = ContactStore::new(Arc::clone(&probe));
  let loaded = store.initialize().await;
  assert!(loaded.warning().is_none());
  (store, probe)
}

fn ada() -> NewContact { NewContact::new("Ada", "Lovelace", "555-0100") }

// ─── Loading ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_run_installs_and_persists_seed() {
  let probe = Arc::new(ProbeStore::default());
  let store = ContactStore::new(Arc::clone(&probe));
  assert!(store.is_loading());
  assert!(store.list().is_empty());

  let loaded = store.initialize().await;

  assert!(matches!(loaded.source, LoadSource::Seeded(Durability::Persisted)));
  assert!(!store.is_loading());
  assert_eq!(&*loaded.contacts, seed_contacts().as_slice());
  assert_eq!(probe.stored().await.unwrap(), seed_contacts());
}

#[tokio::test]
async fn stored_collection_wins_over_seed() {
  let probe = Arc::new(ProbeStore::default());
  let only = vec![seed_contacts().remove(2)];
  probe
    .inner
    .set(CONTACTS_KEY, serde_json::to_string(&only).unwrap())
    .await
    .unwrap();

  let store = ContactStore::new(Arc::clone(&probe));
  let loaded = store.initialize().await;

  assert!(matches!(loaded.source, LoadSource::Stored));
  assert_eq!(&*store.list(), only.as_slice());
  assert_eq!(probe.writes(), 0);
}

#[tokio::test]
async fn read_failure_falls_back_to_seed_without_writing() {
  let probe = Arc::new(ProbeStore::default());
  probe.fail_reads(true);

  let store = ContactStore::new(Arc::clone(&probe));
  let loaded = store.initialize().await;

  assert!(matches!(loaded.source, LoadSource::Fallback(Error::Persistence(_))));
  assert!(loaded.warning().is_some());
  assert!(!store.is_loading());
  assert_eq!(store.list().len(), seed_contacts().len());
  assert_eq!(probe.writes(), 0);
}

#[tokio::test]
async fn corrupt_blob_falls_back_and_is_left_alone() {
  let probe = Arc::new(ProbeStore::default());
  probe.inner.set(CONTACTS_KEY, "{not json".into()).await.unwrap();

  let store = ContactStore::new(Arc::clone(&probe));
  let loaded = store.initialize().await;

  assert!(matches!(loaded.source, LoadSource::Fallback(Error::Serialization(_))));
  assert_eq!(store.list().len(), seed_contacts().len());
  assert_eq!(
    probe.inner.get(CONTACTS_KEY).await.unwrap().as_deref(),
    Some("{not json")
  );
}

#[tokio::test]
async fn seed_write_failure_is_reported() {
  let probe = Arc::new(ProbeStore::default());
  probe.fail_writes(true);

  let store = ContactStore::new(Arc::clone(&probe));
  let loaded = store.initialize().await;

  assert!(matches!(loaded.source, LoadSource::Seeded(Durability::Volatile(_))));
  assert!(loaded.warning().is_some());
  assert_eq!(store.list().len(), seed_contacts().len());
}

#[tokio::test]
async fn list_never_touches_storage() {
  let (store, probe) = loaded().await;
  let reads = probe.reads();

  for _ in 0..3 {
    let _ = store.list();
  }
  let _ = store.get(&ContactId::from("1"));

  assert_eq!(probe.reads(), reads);
}

#[tokio::test]
async fn reload_picks_up_external_changes() {
  let (store, probe) = loaded().await;
  probe.inner.set(CONTACTS_KEY, "[]".into()).await.unwrap();

  let loaded = store.reload().await;

  assert!(matches!(loaded.source, LoadSource::Stored));
  assert!(store.list().is_empty());
}

// ─── Add ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_assigns_identity_and_appends() {
  let (store, probe) = loaded().await;
  let seed_ids: Vec<_> = store.list().iter().map(|c| c.id.clone()).collect();
  let writes = probe.writes();

  let saved = store.add(ada()).await.unwrap();
  assert!(saved.is_persisted());
  let contact = saved.into_value();

  assert!(!contact.id.as_str().is_empty());
  assert!(!seed_ids.contains(&contact.id));
  assert!(!contact.favorite);
  assert_eq!(contact.first_name, "Ada");

  let list = store.list();
  assert_eq!(list.len(), seed_ids.len() + 1);
  assert_eq!(list.last(), Some(&contact));
  assert_eq!(probe.writes(), writes + 1);
  assert_eq!(probe.stored().await.unwrap(), list.to_vec());
}

#[tokio::test]
async fn add_keeps_explicit_favorite() {
  let (store, _) = loaded().await;
  let input = NewContact { favorite: Some(true), ..ada() };

  let contact = store.add(input).await.unwrap().into_value();

  assert!(contact.favorite);
}

#[tokio::test]
async fn add_ids_are_unique() {
  let (store, _) = loaded().await;

  let a = store.add(ada()).await.unwrap().into_value();
  let b = store.add(ada()).await.unwrap().into_value();

  assert_ne!(a.id, b.id);
  assert!(b.created_at >= a.created_at);
}

#[tokio::test]
async fn add_rejects_invalid_input_without_mutation() {
  let (store, probe) = loaded().await;
  let before = store.list();
  let writes = probe.writes();

  let err = store
    .add(NewContact::new("", "X", "555"))
    .await
    .unwrap_err();

  let Error::Validation(errors) = err else {
    panic!("expected validation error");
  };
  assert!(errors.contains(Field::FirstName));
  assert!(!errors.contains(Field::LastName));
  assert!(!errors.contains(Field::Phone));
  assert_eq!(&*store.list(), &*before);
  assert_eq!(probe.writes(), writes);
}

#[tokio::test]
async fn add_names_every_missing_field() {
  let (store, _) = loaded().await;
  let input = NewContact {
    email: Some("not-an-email".into()),
    ..NewContact::default()
  };

  let Err(Error::Validation(errors)) = store.add(input).await else {
    panic!("expected validation error");
  };

  let fields: Vec<_> = errors.iter().map(|(f, _)| f).collect();
  assert_eq!(
    fields,
    vec![Field::FirstName, Field::LastName, Field::Email, Field::Phone]
  );
}

#[tokio::test]
async fn write_failure_keeps_memory_and_is_signalled() {
  let (store, probe) = loaded().await;
  let before = probe.stored().await.unwrap();
  probe.fail_writes(true);

  let saved = store.add(ada()).await.unwrap();

  assert!(!saved.is_persisted());
  assert!(matches!(saved.warning(), Some(Error::Persistence(_))));
  assert!(store.list().iter().any(|c| c.id == saved.value.id));
  assert_eq!(probe.stored().await.unwrap(), before);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_changes_only_named_field() {
  let (store, _) = loaded().await;
  let before = store.add(ada()).await.unwrap().into_value();

  let patch = ContactPatch { company: Some("Acme".into()), ..Default::default() };
  let saved = store.update(&before.id, patch).await.unwrap();
  assert!(saved.is_persisted());

  let after = store.get(&before.id).unwrap();
  assert_eq!(after, saved.value);
  assert_eq!(after.company.as_deref(), Some("Acme"));
  assert_eq!(after.id, before.id);
  assert_eq!(after.created_at, before.created_at);
  assert_eq!(Contact { company: None, ..after }, before);
}

#[tokio::test]
async fn update_leaves_stored_created_at_text_untouched() {
  let probe = Arc::new(ProbeStore::default());
  let raw = r#"[{"id":"1699999999999","firstName":"Grace","lastName":"Hopper","phone":"555-0199","createdAt":"2023-11-02T08:30:00.000Z"}]"#;
  probe.inner.set(CONTACTS_KEY, raw.into()).await.unwrap();

  let store = ContactStore::new(Arc::clone(&probe));
  let _ = store.initialize().await;
  let id = ContactId::from("1699999999999");
  let patch = ContactPatch { company: Some("Acme".into()), ..Default::default() };
  let _ = store.update(&id, patch).await.unwrap();

  let blob = probe.inner.get(CONTACTS_KEY).await.unwrap().unwrap();
  assert!(blob.contains(r#""createdAt":"2023-11-02T08:30:00.000Z""#), "{blob}");
  assert!(blob.contains(r#""company":"Acme""#));
}

#[tokio::test]
async fn add_stores_trimmed_email() {
  let (store, _) = loaded().await;
  let input = NewContact { email: Some(" ada@example.com ".into()), ..ada() };

  let contact = store.add(input).await.unwrap().into_value();

  assert_eq!(contact.email.as_deref(), Some("ada@example.com"));
  assert_eq!(store.get(&contact.id).unwrap().email, contact.email);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
  let (store, probe) = loaded().await;
  let before = store.list();
  let writes = probe.writes();
  let missing = ContactId::from("missing");

  let err = store
    .update(&missing, ContactPatch { notes: Some("x".into()), ..Default::default() })
    .await
    .unwrap_err();

  assert!(matches!(err, Error::NotFound(id) if id == missing));
  assert_eq!(&*store.list(), &*before);
  assert_eq!(probe.writes(), writes);
}

#[tokio::test]
async fn update_rejects_change_that_invalidates_contact() {
  let (store, probe) = loaded().await;
  let id = ContactId::from("1");
  let before = store.get(&id).unwrap();
  let writes = probe.writes();

  let patch = ContactPatch {
    first_name: Some("  ".into()),
    email: Some("broken@".into()),
    ..Default::default()
  };
  let Err(Error::Validation(errors)) = store.update(&id, patch).await else {
    panic!("expected validation error");
  };

  assert!(errors.contains(Field::FirstName));
  assert!(errors.contains(Field::Email));
  assert_eq!(store.get(&id).unwrap(), before);
  assert_eq!(probe.writes(), writes);
}

#[tokio::test]
async fn update_can_clear_optional_fields() {
  let (store, _) = loaded().await;
  let id = ContactId::from("1");
  assert!(store.get(&id).unwrap().email.is_some());

  let patch = ContactPatch { email: Some(String::new()), ..Default::default() };
  store.update(&id, patch).await.unwrap().into_value();

  assert_eq!(store.get(&id).unwrap().email, None);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_is_idempotent() {
  let (store, probe) = loaded().await;
  let id = ContactId::from("2");
  let len = store.list().len();

  let first = store.delete(&id).await;
  assert!(first.value);
  assert!(first.is_persisted());
  assert_eq!(store.list().len(), len - 1);
  assert!(store.get(&id).is_none());

  let second = store.delete(&id).await;
  assert!(!second.value);
  assert!(second.is_persisted());
  assert_eq!(store.list().len(), len - 1);

  let stored = probe.stored().await.unwrap();
  assert!(stored.iter().all(|c| c.id != id));
}

// ─── Favorite ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn toggle_favorite_is_self_inverse() {
  let (store, _) = loaded().await;
  let id = ContactId::from("2");
  let original = store.get(&id).unwrap().favorite;

  let once = store.toggle_favorite(&id).await.unwrap();
  assert_eq!(once.value, !original);
  assert_eq!(store.get(&id).unwrap().favorite, !original);

  let twice = store.toggle_favorite(&id).await.unwrap();
  assert_eq!(twice.value, original);
  assert_eq!(store.get(&id).unwrap().favorite, original);
}

#[tokio::test]
async fn toggle_favorite_unknown_id_is_not_found() {
  let (store, _) = loaded().await;
  let before = store.list();

  let err = store.toggle_favorite(&ContactId::from("nope")).await.unwrap_err();

  assert!(matches!(err, Error::NotFound(_)));
  assert_eq!(&*store.list(), &*before);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn next_session_sees_last_state() {
  let probe = Arc::new(ProbeStore::default());

  let last = {
    let store = ContactStore::new(Arc::clone(&probe));
    let _ = store.initialize().await;
    let added = store.add(ada()).await.unwrap().into_value();
    let _ = store
      .update(&added.id, ContactPatch {
        notes: Some("first programmer".into()),
        ..Default::default()
      })
      .await
      .unwrap();
    let _ = store.toggle_favorite(&ContactId::from("4")).await.unwrap();
    let _ = store.delete(&ContactId::from("3")).await;
    store.list()
  };

  let store = ContactStore::new(Arc::clone(&probe));
  let loaded = store.initialize().await;

  assert!(matches!(loaded.source, LoadSource::Stored));
  assert_eq!(&*loaded.contacts, &*last);
}

#[tokio::test]
async fn mutation_before_initialize_loads_first() {
  let probe = Arc::new(ProbeStore::default());
  let existing = seed_contacts();
  probe
    .inner
    .set(CONTACTS_KEY, serde_json::to_string(&existing).unwrap())
    .await
    .unwrap();

  let store = ContactStore::new(Arc::clone(&probe));
  let added = store.add(ada()).await.unwrap().into_value();

  assert!(!store.is_loading());
  let stored = probe.stored().await.unwrap();
  assert_eq!(stored.len(), existing.len() + 1);
  assert_eq!(stored.last(), Some(&added));
}

#[tokio::test]
async fn concurrent_adds_are_all_kept() {
  let probe = Arc::new(ProbeStore::default());
  let store = Arc::new(ContactStore::new(Arc::clone(&probe)));
  let _ = store.initialize().await;

  let tasks: Vec<_> = (0..16)
    .map(|i| {
      let store = Arc::clone(&store);
      tokio::spawn(async move {
        store
          .add(NewContact::new(format!("User{i}"), "Test", format!("555-{i:04}")))
          .await
          .map(|saved| saved.into_value())
      })
    })
    .collect();
  for task in tasks {
    task.await.unwrap().unwrap();
  }

  let expected = seed_contacts().len() + 16;
  assert_eq!(store.list().len(), expected);
  assert_eq!(probe.stored().await.unwrap().len(), expected);
}

// ─── Observation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribers_see_each_mutation() {
  let probe = Arc::new(ProbeStore::default());
  let store = ContactStore::new(Arc::clone(&probe));
  let mut rx = store.subscribe();
  assert!(rx.borrow_and_update().loading);

  let _ = store.initialize().await;
  assert!(rx.has_changed().unwrap());
  {
    let snapshot = rx.borrow_and_update();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.contacts.len(), seed_contacts().len());
  }

  let added = store.add(ada()).await.unwrap().into_value();
  rx.changed().await.unwrap();
  assert_eq!(rx.borrow_and_update().contacts.last(), Some(&added));

  let _ = store.delete(&added.id).await;
  rx.changed().await.unwrap();
  assert!(rx.borrow().contacts.iter().all(|c| c.id != added.id));
}
