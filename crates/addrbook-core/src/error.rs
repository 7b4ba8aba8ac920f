//! Error types for `addrbook-core`.

use thiserror::Error;

use crate::{contact::ContactId, validate::ValidationErrors};

#[derive(Debug, Error)]
pub enum Error {
  /// One or more fields failed validation. Nothing was mutated.
  #[error("invalid contact: {0}")]
  Validation(ValidationErrors),

  #[error("contact not found: {0}")]
  NotFound(ContactId),

  /// The persistence provider failed to read or write.
  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a provider-native error.
  pub fn persistence<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
