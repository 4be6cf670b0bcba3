//! Command handlers behind the router.
//!
//! One `dispatch` call per inbound message. Handlers describe their side
//! effects as [`OutboundAction`]s and hand them to the [`ActionQueue`];
//! user-visible outcome messages are themselves outbound actions, so tests
//! observe handler behavior entirely through the platform seam.

#[path = "dispatcher_tests.rs"]
mod dispatcher_tests;

use futures::future::join_all;
use rand::Rng;
use tracing::{debug, info, warn};

use bouncer_queue::{ActionQueue, Clock, GuildDirectory, PlatformClient};
use bouncer_types::{ActionError, InboundMessage, OutboundAction};

use crate::router::{route, Command};

/// Routes inbound messages and runs the matching handler.
pub struct Dispatcher<P, C, D> {
    queue: ActionQueue<P, C>,
    directory: D,
}

impl<P, C, D> Dispatcher<P, C, D>
where
    P: PlatformClient,
    C: Clock,
    D: GuildDirectory,
{
    pub fn new(queue: ActionQueue<P, C>, directory: D) -> Self {
        Self { queue, directory }
    }

    /// Handle one inbound message. Unmatched text is ignored.
    pub async fn dispatch(&self, msg: &InboundMessage) {
        match route(&msg.text) {
            Some(Command::Ping) => self.handle_ping(msg),
            Some(Command::Roll) => self.handle_roll(msg),
            Some(Command::Kick) => self.handle_kick(msg).await,
            Some(Command::Block) => self.handle_block(msg).await,
            None => {}
        }
    }

    fn handle_ping(&self, msg: &InboundMessage) {
        // Outcome dropped on purpose: a lost pong is the accepted policy.
        self.send_text(msg.channel_id, "pong!");
    }

    fn handle_roll(&self, msg: &InboundMessage) {
        // ThreadRng is per-task state, safe across concurrently handled events.
        let roll: u32 = rand::rng().random_range(1..=6);
        debug!(roll, "Rolled a die");

        let channel_id = msg.channel_id;
        let handle = self
            .queue
            .submit(OutboundAction::send_text(channel_id, format!("Your roll: {}", roll)));
        self.queue.chain(handle, move |receipt| {
            // 3 counts as decent: only 1 and 2 earn commiseration.
            if roll >= 3 {
                return None;
            }
            receipt.message_id().map(|id| {
                OutboundAction::send_text(
                    channel_id,
                    format!(
                        "The roll for messageId: {} wasn't very good... Must be bad luck!",
                        id
                    ),
                )
            })
        });
    }

    async fn handle_kick(&self, msg: &InboundMessage) {
        let Some(guild_id) = msg.guild_id else {
            self.send_text(msg.channel_id, "This is a Guild-Only command!");
            return;
        };
        if msg.mentioned_user_ids.is_empty() {
            self.send_text(
                msg.channel_id,
                "You must mention 1 or more Users to be kicked!",
            );
            return;
        }
        // The kick capability is global, so refusal here aborts the whole
        // command, unlike the per-target failures below.
        if !self.directory.bot_can_kick(guild_id).await {
            self.send_text(
                msg.channel_id,
                "Sorry! I don't have permission to kick members in this Guild!",
            );
            return;
        }

        let targets = join_all(
            msg.mentioned_user_ids
                .iter()
                .map(|&user_id| self.reconcile_target(guild_id, msg.channel_id, user_id)),
        )
        .await;
        debug!(targets = targets.len(), "Kick command reconciled");
    }

    /// Work one target through removal and report its outcome to the channel.
    ///
    /// Targets are fully independent: a failure here never touches the
    /// processing of sibling targets, and every target gets exactly one
    /// outcome message.
    async fn reconcile_target(&self, guild_id: u64, channel_id: u64, user_id: u64) {
        let Some(member) = self.directory.member(guild_id, user_id).await else {
            let text = removal_failure_text(
                &user_id.to_string(),
                &ActionError::unknown("member not found in guild"),
            );
            self.send_text(channel_id, text);
            return;
        };
        if !self.directory.bot_outranks(guild_id, user_id).await {
            self.send_text(
                channel_id,
                format!(
                    "Cannot kick member: {}, they are higher in the hierarchy than I am!",
                    member.display_name
                ),
            );
            return;
        }

        let handle = self
            .queue
            .submit(OutboundAction::remove_member(guild_id, user_id));
        let text = match handle.outcome().await {
            Ok(_) => format!("Kicked {}! Cya!", member.display_name),
            Err(error @ ActionError::PermissionDenied { .. }) => format!(
                "PermissionError kicking [{}]: {}",
                member.display_name,
                error.detail()
            ),
            Err(error @ ActionError::Unknown { .. }) => {
                removal_failure_text(&member.display_name, &error)
            }
            Err(error @ ActionError::RateLimited { .. }) => {
                // Queued removals absorb rate limits before resolving; kept
                // so the match stays total if that ever changes.
                warn!(user_id, error = %error, "Removal resolved rate-limited");
                removal_failure_text(&member.display_name, &error)
            }
        };
        self.send_text(channel_id, text);
    }

    async fn handle_block(&self, msg: &InboundMessage) {
        let outcome = self
            .queue
            .submit_blocking(
                OutboundAction::send_text(msg.channel_id, "I blocked and will return the message!"),
                true,
            )
            .await;
        match outcome {
            Ok(receipt) => info!(
                message_id = receipt.message_id(),
                "Sent a message using blocking"
            ),
            Err(error) => warn!(error = %error, "Blocking send failed"),
        }

        let outcome = self
            .queue
            .submit_blocking(
                OutboundAction::send_text(
                    msg.channel_id,
                    "I expect rate limitation and know how to handle it!",
                ),
                false,
            )
            .await;
        match outcome {
            Ok(receipt) => debug!(
                message_id = receipt.message_id(),
                "Second blocking send was not rate limited"
            ),
            Err(ActionError::RateLimited { retry_after }) => warn!(
                retry_after_ms = retry_after.as_millis() as u64,
                "Second blocking send rate limited, not queuing"
            ),
            Err(error) => warn!(error = %error, "Second blocking send failed"),
        }
    }

    /// Fire-and-forget a text message to the channel.
    fn send_text(&self, channel_id: u64, text: impl Into<String>) {
        self.queue
            .submit(OutboundAction::send_text(channel_id, text));
    }
}

/// Outcome text for a removal that failed outside the permission path.
fn removal_failure_text(name: &str, error: &ActionError) -> String {
    format!(
        "Unknown error while kicking [{}]: <{}>: {}",
        name,
        error.label(),
        error.detail()
    )
}
