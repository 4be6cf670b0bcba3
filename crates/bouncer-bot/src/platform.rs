//! Carries out outbound actions against the Discord HTTP API.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::id::{ChannelId, GuildId, UserId};

use bouncer_queue::PlatformClient;
use bouncer_types::{ActionOutcome, ActionReceipt, OutboundAction};

use crate::errors::classify;

/// The live platform client: one Discord API request per `perform` call.
pub struct SerenityPlatform {
    http: Arc<Http>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl PlatformClient for SerenityPlatform {
    async fn perform(&self, action: &OutboundAction) -> ActionOutcome {
        match action {
            OutboundAction::SendMessage {
                channel_id,
                content,
            } => {
                match ChannelId::new(*channel_id)
                    .send_message(&*self.http, CreateMessage::new().content(content))
                    .await
                {
                    Ok(message) => Ok(ActionReceipt::Message {
                        id: message.id.get(),
                    }),
                    Err(error) => Err(classify(&error, action.required_capability())),
                }
            }
            OutboundAction::RemoveMember { guild_id, user_id } => {
                match GuildId::new(*guild_id)
                    .kick(&*self.http, UserId::new(*user_id))
                    .await
                {
                    Ok(()) => Ok(ActionReceipt::Ack),
                    Err(error) => Err(classify(&error, action.required_capability())),
                }
            }
        }
    }
}
