//! In-memory mocks for unit testing without a live chat platform.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use bouncer_types::{ActionError, ActionOutcome, ActionReceipt, OutboundAction};

use crate::directory::{GuildDirectory, MemberView};
use crate::platform::PlatformClient;

/// In-memory platform that records every attempted action and answers from
/// a script. Use in tests instead of a real platform client.
///
/// Attempts are answered in this order:
/// 1. a scripted outcome queued with `fail_next` / `succeed_next`, if any
/// 2. a per-user failure registered with `fail_removal`, for removals
/// 3. success (`Message` receipts get sequential ids starting at 1000,
///    removals get `Ack`)
///
/// # Example
/// ```rust,ignore
/// let platform = MockPlatform::new();
/// platform.fail_next(ActionError::rate_limited(Duration::from_secs(2)));
/// let queue = ActionQueue::with_clock(platform.clone(), MockClock::new());
/// queue.submit(OutboundAction::send_text(7, "hi")).outcome().await?;
/// assert_eq!(platform.attempt_count(), 2);
/// ```
#[derive(Clone)]
pub struct MockPlatform {
    inner: Arc<Mutex<PlatformInner>>,
}

struct PlatformInner {
    attempts: Vec<(OutboundAction, ActionOutcome)>,
    script: VecDeque<Option<ActionError>>,
    removal_failures: HashMap<u64, ActionError>,
    next_message_id: u64,
}

impl PlatformInner {
    fn success_receipt(&mut self, action: &OutboundAction) -> ActionReceipt {
        match action {
            OutboundAction::SendMessage { .. } => {
                let id = self.next_message_id;
                self.next_message_id += 1;
                ActionReceipt::Message { id }
            }
            OutboundAction::RemoveMember { .. } => ActionReceipt::Ack,
        }
    }
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(PlatformInner {
                attempts: Vec::new(),
                script: VecDeque::new(),
                removal_failures: HashMap::new(),
                next_message_id: 1000,
            })),
        }
    }

    /// Queue a failure for the next unanswered attempt.
    pub fn fail_next(&self, error: ActionError) {
        self.inner.lock().unwrap().script.push_back(Some(error));
    }

    /// Queue an explicit success for the next unanswered attempt.
    pub fn succeed_next(&self) {
        self.inner.lock().unwrap().script.push_back(None);
    }

    /// Fail every removal of this user with the given error.
    pub fn fail_removal(&self, user_id: u64, error: ActionError) {
        self.inner
            .lock()
            .unwrap()
            .removal_failures
            .insert(user_id, error);
    }

    /// Return a snapshot of all (action, outcome) attempts in order.
    pub fn attempts(&self) -> Vec<(OutboundAction, ActionOutcome)> {
        self.inner.lock().unwrap().attempts.clone()
    }

    /// Return the number of attempts made so far, retries included.
    pub fn attempt_count(&self) -> usize {
        self.inner.lock().unwrap().attempts.len()
    }

    /// Return the contents of successfully sent messages, in send order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent_messages().into_iter().map(|(_, text)| text).collect()
    }

    /// Return (channel id, content) for successfully sent messages, in order.
    pub fn sent_messages(&self) -> Vec<(u64, String)> {
        self.inner
            .lock()
            .unwrap()
            .attempts
            .iter()
            .filter_map(|(action, outcome)| match (action, outcome) {
                (
                    OutboundAction::SendMessage {
                        channel_id,
                        content,
                    },
                    Ok(_),
                ) => Some((*channel_id, content.clone())),
                _ => None,
            })
            .collect()
    }

    /// Return the user ids of successful removals, in removal order.
    pub fn removed_users(&self) -> Vec<u64> {
        self.inner
            .lock()
            .unwrap()
            .attempts
            .iter()
            .filter_map(|(action, outcome)| match (action, outcome) {
                (OutboundAction::RemoveMember { user_id, .. }, Ok(_)) => Some(*user_id),
                _ => None,
            })
            .collect()
    }

    /// Return true if no attempts have been made.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().attempts.is_empty()
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn perform(&self, action: &OutboundAction) -> ActionOutcome {
        let mut inner = self.inner.lock().unwrap();
        let outcome = match inner.script.pop_front() {
            Some(Some(error)) => Err(error),
            Some(None) => Ok(inner.success_receipt(action)),
            None => {
                let removal_failure = match action {
                    OutboundAction::RemoveMember { user_id, .. } => {
                        inner.removal_failures.get(user_id).cloned()
                    }
                    OutboundAction::SendMessage { .. } => None,
                };
                match removal_failure {
                    Some(error) => Err(error),
                    None => Ok(inner.success_receipt(action)),
                }
            }
        };
        inner.attempts.push((action.clone(), outcome.clone()));
        outcome
    }
}

/// In-memory guild directory for unit tests.
///
/// Starts with kick capability granted, no members, and the bot outranking
/// everyone; adjust per test with the setters.
#[derive(Clone)]
pub struct MockDirectory {
    inner: Arc<Mutex<DirectoryInner>>,
}

struct DirectoryInner {
    can_kick: bool,
    members: HashMap<(u64, u64), MemberView>,
    above_bot: HashSet<u64>,
    member_queries: usize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(DirectoryInner {
                can_kick: true,
                members: HashMap::new(),
                above_bot: HashSet::new(),
                member_queries: 0,
            })),
        }
    }

    /// Register a member of the given guild.
    pub fn add_member(&self, guild_id: u64, user_id: u64, display_name: impl Into<String>) {
        self.inner.lock().unwrap().members.insert(
            (guild_id, user_id),
            MemberView {
                user_id,
                display_name: display_name.into(),
            },
        );
    }

    /// Grant or revoke the bot's kick capability.
    pub fn set_can_kick(&self, allowed: bool) {
        self.inner.lock().unwrap().can_kick = allowed;
    }

    /// Place a user above the bot in the role hierarchy.
    pub fn place_above_bot(&self, user_id: u64) {
        self.inner.lock().unwrap().above_bot.insert(user_id);
    }

    /// Return how many member lookups have been made.
    pub fn member_queries(&self) -> usize {
        self.inner.lock().unwrap().member_queries
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl GuildDirectory for MockDirectory {
    async fn bot_can_kick(&self, _guild_id: u64) -> bool {
        self.inner.lock().unwrap().can_kick
    }

    async fn member(&self, guild_id: u64, user_id: u64) -> Option<MemberView> {
        let mut inner = self.inner.lock().unwrap();
        inner.member_queries += 1;
        inner.members.get(&(guild_id, user_id)).cloned()
    }

    async fn bot_outranks(&self, _guild_id: u64, user_id: u64) -> bool {
        !self.inner.lock().unwrap().above_bot.contains(&user_id)
    }
}
