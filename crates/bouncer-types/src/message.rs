//! Inbound message model consumed by the command dispatcher.

use serde::{Deserialize, Serialize};

/// A chat message received from the platform, reduced to the fields the
/// command dispatcher reads.
///
/// Built once per gateway event by the adapter; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Channel the message was posted in.
    pub channel_id: u64,
    /// Guild the channel belongs to; `None` for private channels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
    /// Author display name (guild nickname, falling back to global name,
    /// falling back to username).
    pub author_display_name: String,
    /// Raw message text.
    pub text: String,
    /// Users mentioned in the message, in mention order.
    #[serde(default)]
    pub mentioned_user_ids: Vec<u64>,
}

impl InboundMessage {
    /// True when the message originated in a guild channel.
    pub fn is_from_guild(&self) -> bool {
        self.guild_id.is_some()
    }
}
