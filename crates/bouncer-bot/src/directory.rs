//! Guild membership and permission lookups over the Discord HTTP API.

use std::collections::HashMap;
use std::sync::Arc;

use serenity::http::Http;
use serenity::model::guild::{Member, PartialGuild, Role};
use serenity::model::id::{GuildId, RoleId, UserId};
use serenity::model::Permissions;
use tracing::warn;

use bouncer_queue::{GuildDirectory, MemberView};

/// Directory queries answered with live API lookups; there is no gateway
/// cache in this bot. Failed lookups degrade to the conservative answer
/// (`false` / `None`) after logging, per the trait contract.
pub struct SerenityDirectory {
    http: Arc<Http>,
    bot_user_id: u64,
}

impl SerenityDirectory {
    pub fn new(http: Arc<Http>, bot_user_id: u64) -> Self {
        Self { http, bot_user_id }
    }

    async fn guild(&self, guild_id: u64) -> Option<PartialGuild> {
        match self.http.get_guild(GuildId::new(guild_id)).await {
            Ok(guild) => Some(guild),
            Err(error) => {
                warn!(guild_id, error = %error, "Failed to fetch guild");
                None
            }
        }
    }

    async fn fetch_member(&self, guild_id: u64, user_id: u64) -> Option<Member> {
        match self
            .http
            .get_member(GuildId::new(guild_id), UserId::new(user_id))
            .await
        {
            Ok(member) => Some(member),
            Err(error) => {
                warn!(guild_id, user_id, error = %error, "Failed to fetch member");
                None
            }
        }
    }
}

impl GuildDirectory for SerenityDirectory {
    async fn bot_can_kick(&self, guild_id: u64) -> bool {
        let Some(guild) = self.guild(guild_id).await else {
            return false;
        };
        if guild.owner_id.get() == self.bot_user_id {
            return true;
        }
        let Some(bot) = self.fetch_member(guild_id, self.bot_user_id).await else {
            return false;
        };
        can_kick(aggregate_permissions(&guild.roles, guild.id, &bot.roles))
    }

    async fn member(&self, guild_id: u64, user_id: u64) -> Option<MemberView> {
        self.fetch_member(guild_id, user_id)
            .await
            .map(|member| MemberView {
                user_id,
                display_name: member.display_name().to_string(),
            })
    }

    async fn bot_outranks(&self, guild_id: u64, user_id: u64) -> bool {
        let Some(guild) = self.guild(guild_id).await else {
            return false;
        };
        // Nobody outranks the owner, and the owner outranks everybody.
        if guild.owner_id.get() == user_id {
            return false;
        }
        if guild.owner_id.get() == self.bot_user_id {
            return true;
        }
        let Some(bot) = self.fetch_member(guild_id, self.bot_user_id).await else {
            return false;
        };
        let Some(target) = self.fetch_member(guild_id, user_id).await else {
            return false;
        };
        // Strictly above: equal positions cannot interact.
        let bot_rank = highest_role(&guild.roles, &bot.roles)
            .map(|role| role.position)
            .unwrap_or_default();
        let target_rank = highest_role(&guild.roles, &target.roles)
            .map(|role| role.position)
            .unwrap_or_default();
        bot_rank > target_rank
    }
}

/// Union of the @everyone permissions and every role the member holds.
fn aggregate_permissions(
    roles: &HashMap<RoleId, Role>,
    guild_id: GuildId,
    member_roles: &[RoleId],
) -> Permissions {
    // The @everyone role shares the guild's id.
    let everyone = RoleId::new(guild_id.get());
    let mut permissions = roles
        .get(&everyone)
        .map(|role| role.permissions)
        .unwrap_or_else(Permissions::empty);
    for role_id in member_roles {
        if let Some(role) = roles.get(role_id) {
            permissions |= role.permissions;
        }
    }
    permissions
}

fn highest_role<'a>(roles: &'a HashMap<RoleId, Role>, member_roles: &[RoleId]) -> Option<&'a Role> {
    member_roles
        .iter()
        .filter_map(|role_id| roles.get(role_id))
        .max_by_key(|role| role.position)
}

/// Kicking requires the dedicated capability or full administrator.
fn can_kick(permissions: Permissions) -> bool {
    permissions.administrator() || permissions.kick_members()
}
