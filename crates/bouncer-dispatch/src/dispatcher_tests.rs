//! Unit tests for the command handlers, run against the in-memory mocks.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bouncer_queue::{ActionQueue, MockClock, MockDirectory, MockPlatform};
    use bouncer_types::{ActionError, InboundMessage};

    use crate::dispatcher::Dispatcher;

    const CHANNEL: u64 = 100;
    const GUILD: u64 = 500;

    struct Harness {
        dispatcher: Dispatcher<MockPlatform, MockClock, MockDirectory>,
        queue: ActionQueue<MockPlatform, MockClock>,
        platform: MockPlatform,
        clock: MockClock,
        directory: MockDirectory,
    }

    fn harness() -> Harness {
        let platform = MockPlatform::new();
        let clock = MockClock::new();
        let directory = MockDirectory::new();
        let queue = ActionQueue::with_clock(platform.clone(), clock.clone());
        Harness {
            dispatcher: Dispatcher::new(queue.clone(), directory.clone()),
            queue,
            platform,
            clock,
            directory,
        }
    }

    fn guild_message(text: &str) -> InboundMessage {
        InboundMessage {
            channel_id: CHANNEL,
            guild_id: Some(GUILD),
            author_display_name: "tester".to_string(),
            text: text.to_string(),
            mentioned_user_ids: Vec::new(),
        }
    }

    fn private_message(text: &str) -> InboundMessage {
        InboundMessage {
            guild_id: None,
            ..guild_message(text)
        }
    }

    /// A `!kick` in the guild channel; mentions arrive separately from the text.
    fn kick_message(mentions: &[u64]) -> InboundMessage {
        InboundMessage {
            mentioned_user_ids: mentions.to_vec(),
            ..guild_message("!kick")
        }
    }

    // ── Ping and routing ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_ping_sends_pong() {
        let h = harness();

        h.dispatcher.dispatch(&guild_message("!ping")).await;
        h.queue.drain().await;

        assert_eq!(
            h.platform.sent_messages(),
            vec![(CHANNEL, "pong!".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unmatched_text_is_ignored() {
        let h = harness();

        h.dispatcher.dispatch(&guild_message("hello there")).await;
        h.queue.drain().await;

        assert!(h.platform.is_empty());
    }

    // ── Roll ──────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_roll_distribution_and_follow_up_boundary() {
        let mut face_counts = [0usize; 6];

        for _ in 0..10_000 {
            let h = harness();
            h.dispatcher.dispatch(&guild_message("!roll")).await;
            h.queue.drain().await;

            let texts = h.platform.sent_texts();
            assert!(!texts.is_empty(), "roll must announce itself");
            let roll: u32 = texts[0]
                .strip_prefix("Your roll: ")
                .and_then(|n| n.parse().ok())
                .unwrap();
            assert!((1..=6).contains(&roll), "roll out of range: {}", roll);
            face_counts[(roll - 1) as usize] += 1;

            if roll < 3 {
                assert_eq!(texts.len(), 2, "low roll must be followed up, got: {:?}", texts);
                assert_eq!(
                    texts[1],
                    "The roll for messageId: 1000 wasn't very good... Must be bad luck!"
                );
            } else {
                assert_eq!(texts.len(), 1, "roll of {} must not be followed up", roll);
            }
        }

        // Each face expects 10000/6 ≈ 1667; the band is ~6 standard deviations.
        for (face, count) in face_counts.iter().enumerate() {
            assert!(
                (1450..=1900).contains(count),
                "face {} appeared {} times, outside uniform tolerance",
                face + 1,
                count
            );
        }
    }

    #[tokio::test]
    async fn test_roll_failure_suppresses_follow_up() {
        // Repeat enough times to hit low rolls, which follow up on success.
        for _ in 0..50 {
            let h = harness();
            h.platform.fail_next(ActionError::unknown("boom"));

            h.dispatcher.dispatch(&guild_message("!roll")).await;
            h.queue.drain().await;

            assert_eq!(
                h.platform.attempt_count(),
                1,
                "no follow-up after a failed roll message"
            );
        }
    }

    // ── Kick: validation and authorization ────────────────────────────────────

    #[tokio::test]
    async fn test_kick_outside_guild_is_refused() {
        let h = harness();
        let msg = InboundMessage {
            mentioned_user_ids: vec![7],
            ..private_message("!kick")
        };

        h.dispatcher.dispatch(&msg).await;
        h.queue.drain().await;

        assert_eq!(
            h.platform.sent_texts(),
            vec!["This is a Guild-Only command!".to_string()]
        );
        assert!(h.platform.removed_users().is_empty());
    }

    #[tokio::test]
    async fn test_kick_without_mentions_is_refused() {
        let h = harness();

        h.dispatcher.dispatch(&kick_message(&[])).await;
        h.queue.drain().await;

        assert_eq!(
            h.platform.sent_texts(),
            vec!["You must mention 1 or more Users to be kicked!".to_string()]
        );
        assert!(h.platform.removed_users().is_empty());
    }

    #[tokio::test]
    async fn test_kick_without_capability_stops_whole_command() {
        let h = harness();
        h.directory.set_can_kick(false);
        h.directory.add_member(GUILD, 7, "alice");

        h.dispatcher.dispatch(&kick_message(&[7])).await;
        h.queue.drain().await;

        assert_eq!(
            h.platform.sent_texts(),
            vec!["Sorry! I don't have permission to kick members in this Guild!".to_string()]
        );
        assert_eq!(
            h.directory.member_queries(),
            0,
            "global refusal must precede per-target work"
        );
        assert!(h.platform.removed_users().is_empty());
    }

    // ── Kick: per-target reconciliation ───────────────────────────────────────

    #[tokio::test]
    async fn test_kick_partial_failure_is_isolated() {
        let h = harness();
        h.directory.add_member(GUILD, 7, "alice");
        h.directory.add_member(GUILD, 8, "bob");
        h.platform
            .fail_removal(7, ActionError::unknown("Internal Server Error"));

        h.dispatcher.dispatch(&kick_message(&[7, 8])).await;
        h.queue.drain().await;

        let texts = h.platform.sent_texts();
        assert_eq!(texts.len(), 2, "one outcome message per target, got: {:?}", texts);
        let alice_failures = texts
            .iter()
            .filter(|t| {
                t.as_str() == "Unknown error while kicking [alice]: <Unknown>: Internal Server Error"
            })
            .count();
        let bob_successes = texts
            .iter()
            .filter(|t| t.as_str() == "Kicked bob! Cya!")
            .count();
        assert_eq!(alice_failures, 1, "got: {:?}", texts);
        assert_eq!(bob_successes, 1, "got: {:?}", texts);
        assert_eq!(h.platform.removed_users(), vec![8]);
    }

    #[tokio::test]
    async fn test_kick_hierarchy_blocks_target_but_not_siblings() {
        let h = harness();
        h.directory.add_member(GUILD, 7, "alice");
        h.directory.add_member(GUILD, 8, "bob");
        h.directory.place_above_bot(7);

        h.dispatcher.dispatch(&kick_message(&[7, 8])).await;
        h.queue.drain().await;

        let texts = h.platform.sent_texts();
        assert!(
            texts.contains(
                &"Cannot kick member: alice, they are higher in the hierarchy than I am!"
                    .to_string()
            ),
            "got: {:?}",
            texts
        );
        assert!(texts.contains(&"Kicked bob! Cya!".to_string()), "got: {:?}", texts);
        assert_eq!(
            h.platform.removed_users(),
            vec![8],
            "no removal submitted for the protected member"
        );
    }

    #[tokio::test]
    async fn test_kick_permission_failure_names_capability() {
        let h = harness();
        h.directory.add_member(GUILD, 7, "alice");
        h.platform.fail_removal(
            7,
            ActionError::permission_denied(Some("KICK_MEMBERS"), "Missing Permissions"),
        );

        h.dispatcher.dispatch(&kick_message(&[7])).await;
        h.queue.drain().await;

        assert_eq!(
            h.platform.sent_texts(),
            vec![
                "PermissionError kicking [alice]: Missing Permissions (missing KICK_MEMBERS)"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_kick_unresolved_member_reports_by_id() {
        let h = harness();

        h.dispatcher.dispatch(&kick_message(&[42])).await;
        h.queue.drain().await;

        assert_eq!(
            h.platform.sent_texts(),
            vec!["Unknown error while kicking [42]: <Unknown>: member not found in guild".to_string()]
        );
        assert!(h.platform.removed_users().is_empty());
    }

    // ── Block ─────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_block_queues_first_send_through_rate_limit() {
        let h = harness();
        h.platform
            .fail_next(ActionError::rate_limited(Duration::from_secs(2)));

        // Both sends are blocking, so dispatch returning means both resolved.
        h.dispatcher.dispatch(&guild_message("!block")).await;

        assert_eq!(
            h.platform.sent_texts(),
            vec![
                "I blocked and will return the message!".to_string(),
                "I expect rate limitation and know how to handle it!".to_string(),
            ]
        );
        assert_eq!(
            h.clock.slept(),
            vec![Duration::from_secs(2)],
            "first send must wait out the rate limit"
        );
    }

    #[tokio::test]
    async fn test_block_second_send_fails_fast_on_rate_limit() {
        let h = harness();
        h.platform.succeed_next();
        h.platform
            .fail_next(ActionError::rate_limited(Duration::from_secs(9)));

        h.dispatcher.dispatch(&guild_message("!block")).await;

        assert_eq!(h.platform.attempt_count(), 2, "second send must not retry");
        assert_eq!(
            h.platform.sent_texts(),
            vec!["I blocked and will return the message!".to_string()]
        );
        assert!(h.clock.slept().is_empty(), "fail-fast must not wait");
    }
}
