//! Read-side view of guild membership, used by moderation commands.

/// What a moderation command needs to know about one guild member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberView {
    pub user_id: u64,
    /// Guild nickname when set, otherwise the account's display name.
    pub display_name: String,
}

/// Lookups a moderation command performs before acting on a member.
///
/// Lookup failures are folded into the return values (`false` / `None`):
/// a member the bot cannot see is treated the same as one who is not there.
#[allow(async_fn_in_trait)]
pub trait GuildDirectory: Send + Sync {
    /// Whether the bot itself holds the capability to remove members here.
    async fn bot_can_kick(&self, guild_id: u64) -> bool;

    /// Resolve a mentioned user to a member of the guild.
    async fn member(&self, guild_id: u64, user_id: u64) -> Option<MemberView>;

    /// Whether the bot sits above this member in the role hierarchy.
    async fn bot_outranks(&self, guild_id: u64, user_id: u64) -> bool;
}
