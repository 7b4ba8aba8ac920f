//! Core types and the contact store for addrbook.
//!
//! This crate holds the contact data model, field validation, the seed set,
//! the key-value persistence abstraction and the [`ContactStore`] that ties
//! them together. Presentation layers depend on this crate; storage backends
//! implement [`kv::KeyValueStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod device;
pub mod error;
pub mod kv;
pub mod seed;
pub mod store;
pub mod validate;

pub use contact::{Contact, ContactId, ContactPatch, CreatedAt, NewContact};
pub use error::{Error, Result};
pub use store::{ContactStore, Durability, LoadSource, Loaded, Saved, Snapshot};
pub use validate::{Field, ValidationErrors};

#[cfg(test)]
mod tests;
