//! Outbound action descriptions and their resolved receipts.
//!
//! An `OutboundAction` is data until submitted: the queue decides when and
//! how it reaches the platform, and the platform's answer comes back as an
//! `ActionOutcome`.

use serde::{Deserialize, Serialize};

use crate::errors::ActionError;

/// One platform-directed side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundAction {
    /// Post `content` to a channel.
    SendMessage { channel_id: u64, content: String },
    /// Remove a member from a guild.
    RemoveMember { guild_id: u64, user_id: u64 },
}

impl OutboundAction {
    /// Build a send-text action.
    pub fn send_text(channel_id: u64, content: impl Into<String>) -> Self {
        Self::SendMessage {
            channel_id,
            content: content.into(),
        }
    }

    /// Build a member-removal action.
    pub fn remove_member(guild_id: u64, user_id: u64) -> Self {
        Self::RemoveMember { guild_id, user_id }
    }

    /// Short name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SendMessage { .. } => "send_message",
            Self::RemoveMember { .. } => "remove_member",
        }
    }

    /// The platform capability the action needs, when there is one.
    /// Used by adapters to name the missing capability on denial.
    pub fn required_capability(&self) -> Option<&'static str> {
        match self {
            Self::SendMessage { .. } => None,
            Self::RemoveMember { .. } => Some("KICK_MEMBERS"),
        }
    }
}

/// Success payload of a resolved action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionReceipt {
    /// A message was created; carries the platform-assigned id.
    Message { id: u64 },
    /// The platform acknowledged an action that has no payload.
    Ack,
}

impl ActionReceipt {
    /// The assigned message id, when the action created a message.
    pub fn message_id(&self) -> Option<u64> {
        match self {
            Self::Message { id } => Some(*id),
            Self::Ack => None,
        }
    }
}

/// Terminal result of one submitted action. Every submitted action resolves
/// to exactly one of these.
pub type ActionOutcome = Result<ActionReceipt, ActionError>;
