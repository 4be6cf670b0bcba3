//! Serenity event handler implementation

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{error, info};

use bouncer_dispatch::Dispatcher;
use bouncer_queue::SystemClock;
use bouncer_types::InboundMessage;

use crate::directory::SerenityDirectory;
use crate::health::AppState;
use crate::platform::SerenityPlatform;

/// The dispatcher as wired against the live Discord client.
pub type BotDispatcher = Dispatcher<SerenityPlatform, SystemClock, SerenityDirectory>;

/// TypeMap key under which the shared dispatcher is stored.
pub struct DispatcherKey;

impl TypeMapKey for DispatcherKey {
    type Value = Arc<BotDispatcher>;
}

pub struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "Discord bot connected as {}#{:04}",
            ready.user.name,
            ready.user.discriminator.map_or(0, |d| d.get())
        );

        let data = ctx.data.read().await;
        if let Some(state) = data.get::<AppState>() {
            state.set_bot_username(ready.user.name.clone()).await;
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Skip bot messages
        if msg.author.bot {
            return;
        }

        let dispatcher = {
            let data = ctx.data.read().await;
            match data.get::<DispatcherKey>() {
                Some(d) => d.clone(),
                None => {
                    error!("Dispatcher not found in context data");
                    return;
                }
            }
        };

        let inbound = to_inbound(&msg);
        let origin = match inbound.guild_id {
            Some(guild_id) => format!("guild {}", guild_id),
            None => "private".to_string(),
        };
        info!(
            "({})[#{}]<{}>: {}",
            origin, inbound.channel_id, inbound.author_display_name, inbound.text
        );

        dispatcher.dispatch(&inbound).await;
    }
}

/// Flatten a serenity message into the transport-agnostic inbound shape.
fn to_inbound(msg: &Message) -> InboundMessage {
    InboundMessage {
        channel_id: msg.channel_id.get(),
        guild_id: msg.guild_id.map(|g| g.get()),
        author_display_name: author_display_name(
            msg.member.as_ref().and_then(|m| m.nick.as_deref()),
            msg.author.global_name.as_deref(),
            &msg.author.name,
        ),
        text: msg.content.clone(),
        mentioned_user_ids: msg.mentions.iter().map(|u| u.id.get()).collect(),
    }
}

/// Effective display name: guild nickname, else global display name, else username.
fn author_display_name(nick: Option<&str>, global_name: Option<&str>, username: &str) -> String {
    nick.or(global_name).unwrap_or(username).to_string()
}
