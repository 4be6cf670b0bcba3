//! Shared data model for the bouncer command bot.

pub mod action;
pub mod errors;
pub mod message;

pub use action::{ActionOutcome, ActionReceipt, OutboundAction};
pub use errors::ActionError;
pub use message::InboundMessage;
