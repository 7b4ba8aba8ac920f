//! Subcommands and their handlers.
//!
//! Each handler maps to one screen action of a contacts app: the list, the
//! details view, the add/edit form, and the favorite, delete, call and
//! message buttons.

use std::io::Write;

use addrbook_core::{
  ContactId, ContactPatch, ContactStore, Error, NewContact, Saved,
  device::{self, DeviceAction, DeviceLinker, LinkOutcome},
  kv::KeyValueStore,
};
use anyhow::{Context as _, anyhow};
use clap::{Args, Subcommand};

use crate::render;

// ─── Arguments ────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
  /// List all contacts in insertion order.
  List {
    /// Print the collection as JSON.
    #[arg(long)]
    json: bool,
  },
  /// Show one contact's details.
  Show {
    id:   String,
    #[arg(long)]
    json: bool,
  },
  /// Create a contact. First name, last name and phone are required.
  Add {
    #[command(flatten)]
    fields:   FieldArgs,
    /// Mark the new contact as a favorite.
    #[arg(long)]
    favorite: bool,
  },
  /// Change fields of an existing contact. Pass an empty string to clear an
  /// optional field.
  Edit {
    id:     String,
    #[command(flatten)]
    fields: FieldArgs,
  },
  /// Toggle a contact's favorite flag.
  Favorite { id: String },
  /// Delete a contact.
  Delete {
    id:  String,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
  },
  /// Dial a contact's phone number.
  Call { id: String },
  /// Open an SMS to a contact's phone number.
  Message { id: String },
}

/// The form fields shared by `add` and `edit`.
#[derive(Debug, Default, Args)]
pub struct FieldArgs {
  #[arg(long)]
  pub first_name: Option<String>,
  #[arg(long)]
  pub last_name:  Option<String>,
  #[arg(long)]
  pub email:      Option<String>,
  #[arg(long)]
  pub phone:      Option<String>,
  #[arg(long)]
  pub company:    Option<String>,
  #[arg(long)]
  pub notes:      Option<String>,
  /// URI of an avatar image.
  #[arg(long)]
  pub avatar:     Option<String>,
}

impl FieldArgs {
  fn into_new_contact(self, favorite: bool) -> NewContact {
    NewContact {
      first_name: self.first_name.unwrap_or_default(),
      last_name:  self.last_name.unwrap_or_default(),
      email:      self.email,
      phone:      self.phone.unwrap_or_default(),
      company:    self.company,
      notes:      self.notes,
      avatar:     self.avatar,
      favorite:   Some(favorite),
    }
  }

  fn into_patch(self) -> ContactPatch {
    ContactPatch {
      first_name: self.first_name,
      last_name:  self.last_name,
      email:      self.email,
      phone:      self.phone,
      company:    self.company,
      notes:      self.notes,
      avatar:     self.avatar,
      favorite:   None,
    }
  }
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Run one command against a loaded store, writing user-facing output to
/// `out`.
pub async fn run<P, L, W>(
  store: &ContactStore<P>,
  linker: &L,
  command: Command,
  out: &mut W,
) -> anyhow::Result<()>
where
  P: KeyValueStore,
  L: DeviceLinker,
  W: Write,
{
  match command {
    Command::List { json } => list(store, json, out),
    Command::Show { id, json } => show(store, &id.into(), json, out),
    Command::Add { fields, favorite } => {
      let saved = store
        .add(fields.into_new_contact(favorite))
        .await
        .map_err(describe)?;
      writeln!(out, "Contact added successfully ({})", saved.value.id)?;
      report(&saved, out)
    }
    Command::Edit { id, fields } => {
      let patch = fields.into_patch();
      if patch.is_empty() {
        return Err(anyhow!("nothing to change; pass at least one field"));
      }
      let saved = store.update(&id.into(), patch).await.map_err(describe)?;
      writeln!(out, "Contact updated successfully")?;
      report(&saved, out)
    }
    Command::Favorite { id } => {
      let saved = store.toggle_favorite(&id.into()).await.map_err(describe)?;
      let msg = if saved.value { "Added to favorites" } else { "Removed from favorites" };
      writeln!(out, "{msg}")?;
      report(&saved, out)
    }
    Command::Delete { id, .. } => {
      let id = ContactId::from(id);
      let saved = store.delete(&id).await;
      if saved.value {
        writeln!(out, "Contact has been removed")?;
      } else {
        writeln!(out, "No contact with id {id}; nothing removed")?;
      }
      report(&saved, out)
    }
    Command::Call { id } => {
      let contact = find(store, &id.into())?;
      hand_off(linker, DeviceAction::call(&contact), out).await
    }
    Command::Message { id } => {
      let contact = find(store, &id.into())?;
      hand_off(linker, DeviceAction::message(&contact), out).await
    }
  }
}

// ─── Handlers ─────────────────────────────────────────────────────────────────

fn list<P: KeyValueStore, W: Write>(
  store: &ContactStore<P>,
  json: bool,
  out: &mut W,
) -> anyhow::Result<()> {
  let contacts = store.list();
  if json {
    serde_json::to_writer_pretty(&mut *out, &*contacts)?;
    writeln!(out)?;
    return Ok(());
  }
  if contacts.is_empty() {
    writeln!(out, "No contacts yet. Add one with `addrbook add`.")?;
  }
  for contact in contacts.iter() {
    writeln!(out, "{}", render::list_row(contact))?;
  }
  Ok(())
}

fn show<P: KeyValueStore, W: Write>(
  store: &ContactStore<P>,
  id: &ContactId,
  json: bool,
  out: &mut W,
) -> anyhow::Result<()> {
  let contact = find(store, id)?;
  if json {
    serde_json::to_writer_pretty(&mut *out, &contact)?;
    writeln!(out)?;
  } else {
    write!(out, "{}", render::details(&contact))?;
  }
  Ok(())
}

async fn hand_off<L: DeviceLinker, W: Write>(
  linker: &L,
  action: DeviceAction,
  out: &mut W,
) -> anyhow::Result<()> {
  let outcome = device::launch(linker, &action)
    .await
    .with_context(|| format!("failed to open {}", action.uri()))?;
  match outcome {
    LinkOutcome::Opened => writeln!(out, "Opened {}", action.uri())?,
    LinkOutcome::NoNumber => writeln!(out, "This contact has no phone number")?,
    LinkOutcome::Unsupported => {
      return Err(anyhow!(action.unsupported_message()));
    }
  }
  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn find<P: KeyValueStore>(
  store: &ContactStore<P>,
  id: &ContactId,
) -> anyhow::Result<addrbook_core::Contact> {
  store
    .get(id)
    .ok_or_else(|| describe(Error::NotFound(id.clone())))
}

/// Tell the user when a change only lives in memory.
fn report<T, W: Write>(saved: &Saved<T>, out: &mut W) -> anyhow::Result<()> {
  if let Some(err) = saved.warning() {
    writeln!(out, "{}", render::volatile_warning(err))?;
  }
  Ok(())
}

fn describe(err: Error) -> anyhow::Error {
  match err {
    Error::Validation(errors) => {
      anyhow!("please fix the following fields:\n{}", render::field_errors(&errors))
    }
    other => anyhow::Error::new(other),
  }
}
