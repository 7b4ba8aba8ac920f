//! Dial and SMS hand-off to the host device.
//!
//! The store is not involved here: an action is built from a contact's phone
//! number and passed to whatever [`DeviceLinker`] the front-end provides.

use std::future::Future;

use crate::contact::Contact;

/// Something the device can be asked to do with a phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAction {
  Call(String),
  Message(String),
}

impl DeviceAction {
  pub fn call(contact: &Contact) -> Self { Self::Call(contact.phone.clone()) }

  pub fn message(contact: &Contact) -> Self { Self::Message(contact.phone.clone()) }

  pub fn phone(&self) -> &str {
    match self {
      Self::Call(phone) | Self::Message(phone) => phone,
    }
  }

  pub fn scheme(&self) -> &'static str {
    match self {
      Self::Call(_) => "tel",
      Self::Message(_) => "sms",
    }
  }

  /// `tel:<phone>` or `sms:<phone>`, with the number used verbatim.
  pub fn uri(&self) -> String { format!("{}:{}", self.scheme(), self.phone()) }

  /// The message shown when the device cannot handle this action.
  pub fn unsupported_message(&self) -> &'static str {
    match self {
      Self::Call(_) => "Phone calls are not supported on this device",
      Self::Message(_) => "SMS is not supported on this device",
    }
  }
}

/// The host capability that opens `tel:` / `sms:` URIs.
pub trait DeviceLinker: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether the device has a handler for this action's scheme.
  fn can_open<'a>(
    &'a self,
    action: &'a DeviceAction,
  ) -> impl Future<Output = bool> + Send + 'a;

  fn open<'a>(
    &'a self,
    action: &'a DeviceAction,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// What happened when an action was handed to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
  Opened,
  /// The contact has no number to dial.
  NoNumber,
  Unsupported,
}

/// Check support, then open. Does nothing for a blank number.
pub async fn launch<L: DeviceLinker>(
  linker: &L,
  action: &DeviceAction,
) -> Result<LinkOutcome, L::Error> {
  if action.phone().trim().is_empty() {
    return Ok(LinkOutcome::NoNumber);
  }
  if !linker.can_open(action).await {
    tracing::debug!(scheme = action.scheme(), "no handler for device action");
    return Ok(LinkOutcome::Unsupported);
  }
  linker.open(action).await?;
  Ok(LinkOutcome::Opened)
}
