//! [`ContactStore`] — the single source of truth for the contact collection.
//!
//! The whole collection lives in memory and is mirrored to one key of a
//! [`KeyValueStore`] as a JSON array. Every mutation rewrites that key in
//! full. Mutations are serialized through one async lock that is held across
//! the write, so two callers can never race on the blob.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, watch};

use crate::{
  Error, Result,
  contact::{Contact, ContactId, ContactPatch, CreatedAt, NewContact},
  kv::KeyValueStore,
  seed::seed_contacts,
};

/// The key the collection is persisted under.
pub const CONTACTS_KEY: &str = "contacts";

// ─── Results ─────────────────────────────────────────────────────────────────

/// What observers see: the readiness flag and the current collection.
#[derive(Debug, Clone)]
pub struct Snapshot {
  /// `true` until the first load has resolved.
  pub loading:  bool,
  pub contacts: Arc<[Contact]>,
}

/// Whether a mutation reached durable storage.
#[derive(Debug)]
pub enum Durability {
  Persisted,
  /// The in-memory collection changed but the write failed. The change is
  /// visible for this session only.
  Volatile(Error),
}

/// The result of a mutation that was applied in memory.
#[derive(Debug)]
#[must_use = "a volatile write should be reported to the user"]
pub struct Saved<T> {
  pub value:      T,
  pub durability: Durability,
}

impl<T> Saved<T> {
  pub fn is_persisted(&self) -> bool {
    matches!(self.durability, Durability::Persisted)
  }

  /// The write failure, if any.
  pub fn warning(&self) -> Option<&Error> {
    match &self.durability {
      Durability::Persisted => None,
      Durability::Volatile(e) => Some(e),
    }
  }

  pub fn into_value(self) -> T { self.value }
}

/// Where the collection came from on load.
#[derive(Debug)]
pub enum LoadSource {
  /// A previously persisted collection.
  Stored,
  /// Nothing was stored; the seed set was installed and written back.
  Seeded(Durability),
  /// Storage could not be read or parsed; the seed set is in memory only and
  /// storage was left untouched.
  Fallback(Error),
}

/// The result of [`ContactStore::initialize`].
#[derive(Debug)]
pub struct Loaded {
  pub contacts: Arc<[Contact]>,
  pub source:   LoadSource,
}

impl Loaded {
  /// A non-fatal problem worth telling the user about.
  pub fn warning(&self) -> Option<&Error> {
    match &self.source {
      LoadSource::Stored | LoadSource::Seeded(Durability::Persisted) => None,
      LoadSource::Seeded(Durability::Volatile(e)) | LoadSource::Fallback(e) => {
        Some(e)
      }
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The contact store. Construct once at startup and share by reference or
/// `Arc`.
pub struct ContactStore<P> {
  provider: P,
  /// Working copy; the lock doubles as the single-writer queue.
  contacts: Mutex<Vec<Contact>>,
  state:    watch::Sender<Snapshot>,
}

impl<P: KeyValueStore> ContactStore<P> {
  /// An empty, not-yet-loaded store. Call [`Self::initialize`] before
  /// rendering.
  pub fn new(provider: P) -> Self {
    let (state, _) = watch::channel(Snapshot {
      loading:  true,
      contacts: Arc::from(Vec::new()),
    });
    Self { provider, contacts: Mutex::new(Vec::new()), state }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// The current in-memory collection. Never touches storage.
  pub fn list(&self) -> Arc<[Contact]> { self.state.borrow().contacts.clone() }

  /// Look up one contact in the current snapshot.
  pub fn get(&self, id: &ContactId) -> Option<Contact> {
    self.state.borrow().contacts.iter().find(|c| &c.id == id).cloned()
  }

  pub fn is_loading(&self) -> bool { self.state.borrow().loading }

  /// Observe every published snapshot.
  pub fn subscribe(&self) -> watch::Receiver<Snapshot> { self.state.subscribe() }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// Load the persisted collection, installing the seed set on first run.
  ///
  /// Never fails: storage problems fall back to the seed set and are
  /// reported through [`Loaded::warning`].
  pub async fn initialize(&self) -> Loaded {
    let mut contacts = self.contacts.lock().await;
    self.load_into(&mut contacts).await
  }

  /// Re-read storage, discarding the in-memory collection.
  pub async fn reload(&self) -> Loaded { self.initialize().await }

  async fn load_into(&self, contacts: &mut Vec<Contact>) -> Loaded {
    let source = match self.read_stored().await {
      Ok(Some(stored)) => {
        tracing::debug!(count = stored.len(), "loaded stored contacts");
        *contacts = stored;
        LoadSource::Stored
      }
      Ok(None) => {
        tracing::info!("no stored contacts, installing seed set");
        *contacts = seed_contacts();
        LoadSource::Seeded(self.persist(contacts).await)
      }
      Err(e) => {
        tracing::warn!(error = %e, "failed to load contacts, using seed set");
        *contacts = seed_contacts();
        LoadSource::Fallback(e)
      }
    };

    let snapshot: Arc<[Contact]> = Arc::from(contacts.as_slice());
    self.state.send_modify(|state| {
      state.loading = false;
      state.contacts = snapshot.clone();
    });

    Loaded { contacts: snapshot, source }
  }

  async fn read_stored(&self) -> Result<Option<Vec<Contact>>> {
    let raw = self
      .provider
      .get(CONTACTS_KEY)
      .await
      .map_err(Error::persistence)?;
    match raw {
      Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
      None => Ok(None),
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  /// Validate and append a new contact.
  ///
  /// Fails with [`Error::Validation`] listing every bad field; nothing is
  /// mutated in that case.
  pub async fn add(&self, input: NewContact) -> Result<Saved<Contact>> {
    let errors = input.validate();
    if !errors.is_valid() {
      return Err(Error::Validation(errors));
    }

    let mut contacts = self.lock_loaded().await;
    let id = fresh_id(&contacts);
    let contact = input.into_contact(id, CreatedAt::now());
    contacts.push(contact.clone());

    let durability = self.commit(&contacts).await;
    Ok(Saved { value: contact, durability })
  }

  /// Merge `patch` over an existing contact.
  ///
  /// A patch that touches a validated field is checked against the merged
  /// record and rejected with [`Error::Validation`] if it would leave the
  /// contact invalid.
  pub async fn update(
    &self,
    id: &ContactId,
    patch: ContactPatch,
  ) -> Result<Saved<Contact>> {
    let mut contacts = self.lock_loaded().await;
    let index = position(&contacts, id)?;

    let merged = patch.apply(contacts[index].clone());
    if patch.touches_validated_fields() {
      let errors = merged.validate();
      if !errors.is_valid() {
        return Err(Error::Validation(errors));
      }
    }
    contacts[index] = merged.clone();

    let durability = self.commit(&contacts).await;
    Ok(Saved { value: merged, durability })
  }

  /// Remove a contact. Deleting an absent id is not an error; the value is
  /// whether anything was removed.
  pub async fn delete(&self, id: &ContactId) -> Saved<bool> {
    let mut contacts = self.lock_loaded().await;
    let before = contacts.len();
    contacts.retain(|c| &c.id != id);
    let removed = contacts.len() != before;

    let durability = self.commit(&contacts).await;
    Saved { value: removed, durability }
  }

  /// Flip the favorite flag. The value is the new flag.
  pub async fn toggle_favorite(&self, id: &ContactId) -> Result<Saved<bool>> {
    let mut contacts = self.lock_loaded().await;
    let index = position(&contacts, id)?;
    contacts[index].favorite = !contacts[index].favorite;
    let favorite = contacts[index].favorite;

    let durability = self.commit(&contacts).await;
    Ok(Saved { value: favorite, durability })
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  /// Take the writer lock, loading first if nobody has yet. Mutating an
  /// unloaded store would overwrite the stored collection with a partial one.
  async fn lock_loaded(&self) -> MutexGuard<'_, Vec<Contact>> {
    let mut contacts = self.contacts.lock().await;
    if self.is_loading() {
      let loaded = self.load_into(&mut contacts).await;
      if let Some(e) = loaded.warning() {
        tracing::warn!(error = %e, "implicit load before mutation was degraded");
      }
    }
    contacts
  }

  /// Publish the new collection, then write it.
  async fn commit(&self, contacts: &[Contact]) -> Durability {
    let snapshot: Arc<[Contact]> = Arc::from(contacts);
    self.state.send_modify(|state| state.contacts = snapshot);
    self.persist(contacts).await
  }

  async fn persist(&self, contacts: &[Contact]) -> Durability {
    match self.write(contacts).await {
      Ok(()) => {
        tracing::debug!(count = contacts.len(), "persisted contacts");
        Durability::Persisted
      }
      Err(e) => {
        tracing::warn!(error = %e, "failed to persist contacts");
        Durability::Volatile(e)
      }
    }
  }

  async fn write(&self, contacts: &[Contact]) -> Result<()> {
    let raw = serde_json::to_string(contacts)?;
    self
      .provider
      .set(CONTACTS_KEY, raw)
      .await
      .map_err(Error::persistence)
  }
}

fn position(contacts: &[Contact], id: &ContactId) -> Result<usize> {
  contacts
    .iter()
    .position(|c| &c.id == id)
    .ok_or_else(|| Error::NotFound(id.clone()))
}

fn fresh_id(contacts: &[Contact]) -> ContactId {
  loop {
    let id = ContactId::generate();
    if !contacts.iter().any(|c| c.id == id) {
      return id;
    }
  }
}
