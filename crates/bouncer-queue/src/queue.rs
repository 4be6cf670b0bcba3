//! An asynchronous submit-and-resolve pipeline for outbound actions.
//!
//! `submit` hands an action to a background worker and returns an
//! [`OutcomeHandle`] the caller can await, chain a continuation onto, or drop
//! outright (fire-and-forget). Workers retry rate-limited attempts after the
//! platform's reported delay; every other outcome is terminal.

#[path = "queue_tests.rs"]
mod queue_tests;

use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

use bouncer_types::{ActionError, ActionOutcome, ActionReceipt, OutboundAction};

use crate::clock::{Clock, SystemClock};
use crate::platform::PlatformClient;

/// The terminal outcome of one submitted action, delivered exactly once.
///
/// Dropping the handle is the fire-and-forget mode: the worker still runs the
/// action to resolution, logs the outcome, and discards it.
#[derive(Debug)]
pub struct OutcomeHandle {
    rx: oneshot::Receiver<ActionOutcome>,
}

impl OutcomeHandle {
    /// Wait for the action to resolve.
    pub async fn outcome(self) -> ActionOutcome {
        match self.rx.await {
            Ok(outcome) => outcome,
            // Worker panicked or the runtime shut down before resolution.
            Err(_) => Err(ActionError::unknown(
                "submission task ended without an outcome",
            )),
        }
    }
}

/// Dispatches outbound actions to the platform from background workers.
///
/// Cloning is cheap and all clones feed the same in-flight counter, so
/// [`ActionQueue::drain`] on any clone waits for work submitted through all
/// of them.
pub struct ActionQueue<P, C = SystemClock> {
    platform: Arc<P>,
    clock: Arc<C>,
    in_flight: watch::Sender<usize>,
}

impl<P, C> Clone for ActionQueue<P, C> {
    fn clone(&self) -> Self {
        Self {
            platform: Arc::clone(&self.platform),
            clock: Arc::clone(&self.clock),
            in_flight: self.in_flight.clone(),
        }
    }
}

impl<P: PlatformClient> ActionQueue<P> {
    pub fn new(platform: P) -> Self {
        Self::with_clock(platform, SystemClock)
    }
}

impl<P: PlatformClient, C: Clock> ActionQueue<P, C> {
    pub fn with_clock(platform: P, clock: C) -> Self {
        let (in_flight, _) = watch::channel(0usize);
        Self {
            platform: Arc::new(platform),
            clock: Arc::new(clock),
            in_flight,
        }
    }

    /// Submit an action without blocking the caller.
    ///
    /// A background worker runs the action to resolution, retrying rate
    /// limits after each reported delay. The returned handle resolves with
    /// the terminal outcome; if the caller has dropped it by then, the
    /// outcome is logged here and lost, which is the accepted cost of
    /// fire-and-forget submissions.
    pub fn submit(&self, action: OutboundAction) -> OutcomeHandle {
        let (tx, rx) = oneshot::channel();
        let platform = Arc::clone(&self.platform);
        let clock = Arc::clone(&self.clock);
        // Count the task before it is spawned so a drain started now waits for it.
        let guard = InFlightGuard::register(&self.in_flight);
        tokio::spawn(async move {
            let _guard = guard;
            let outcome = run_to_resolution(platform.as_ref(), clock.as_ref(), &action).await;
            if let Err(outcome) = tx.send(outcome) {
                match &outcome {
                    Ok(receipt) => debug!(
                        kind = action.kind(),
                        message_id = receipt.message_id(),
                        "Fire-and-forget action succeeded"
                    ),
                    Err(error) => warn!(
                        kind = action.kind(),
                        error = %error,
                        "Fire-and-forget action failed, outcome discarded"
                    ),
                }
            }
        });
        OutcomeHandle { rx }
    }

    /// Attach a success-only continuation to a pending submission.
    ///
    /// When the handle resolves `Ok`, `next` may produce a follow-up action,
    /// which is submitted fire-and-forget. On failure, or when `next` returns
    /// `None`, nothing is submitted.
    pub fn chain<F>(&self, handle: OutcomeHandle, next: F)
    where
        F: FnOnce(&ActionReceipt) -> Option<OutboundAction> + Send + 'static,
    {
        let queue = self.clone();
        let guard = InFlightGuard::register(&self.in_flight);
        tokio::spawn(async move {
            let _guard = guard;
            match handle.outcome().await {
                Ok(receipt) => {
                    if let Some(follow_up) = next(&receipt) {
                        queue.submit(follow_up);
                    }
                }
                Err(error) => {
                    debug!(error = %error, "Skipping continuation, primary action failed");
                }
            }
        });
    }

    /// Submit an action and suspend the caller until it resolves.
    ///
    /// With `queue_on_rate_limit` set, rate limits are absorbed here by
    /// waiting out each reported delay, and the caller only ever sees a
    /// terminal outcome. Without it, the first attempt's outcome is returned
    /// as-is, so the caller observes `ActionError::RateLimited` directly.
    pub async fn submit_blocking(
        &self,
        action: OutboundAction,
        queue_on_rate_limit: bool,
    ) -> ActionOutcome {
        if queue_on_rate_limit {
            run_to_resolution(self.platform.as_ref(), self.clock.as_ref(), &action).await
        } else {
            self.platform.perform(&action).await
        }
    }

    /// Wait until every background worker and continuation has settled.
    ///
    /// Work submitted while draining extends the wait.
    pub async fn drain(&self) {
        let mut rx = self.in_flight.subscribe();
        // Cannot fail: `self` holds a sender for the lifetime of the call.
        let _ = rx.wait_for(|count| *count == 0).await;
    }

    /// Live view of the number of in-flight background tasks.
    pub fn subscribe_in_flight(&self) -> watch::Receiver<usize> {
        self.in_flight.subscribe()
    }
}

/// Decrements the in-flight counter when a worker finishes, however it exits.
struct InFlightGuard {
    counter: watch::Sender<usize>,
}

impl InFlightGuard {
    fn register(counter: &watch::Sender<usize>) -> Self {
        counter.send_modify(|count| *count += 1);
        Self {
            counter: counter.clone(),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

/// Attempt `action` until the platform reports something other than a rate
/// limit, sleeping out each reported retry-after in between.
async fn run_to_resolution<P: PlatformClient, C: Clock>(
    platform: &P,
    clock: &C,
    action: &OutboundAction,
) -> ActionOutcome {
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        match platform.perform(action).await {
            Err(ActionError::RateLimited { retry_after }) => {
                warn!(
                    kind = action.kind(),
                    attempt = attempts,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Action rate limited, waiting before retry"
                );
                clock.sleep(retry_after).await;
            }
            outcome => return outcome,
        }
    }
}
