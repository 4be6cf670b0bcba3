//! The seam between the queue and a concrete chat platform.

use async_trait::async_trait;
use bouncer_types::{ActionOutcome, OutboundAction};

/// A client that can carry out one outbound action against the platform.
///
/// Implementations report the result of a single attempt. Retry policy lives
/// in [`crate::queue::ActionQueue`], above this seam, so `perform` must never
/// loop on rate limits itself.
#[async_trait]
pub trait PlatformClient: Send + Sync + 'static {
    /// Carry out `action` once and report how the platform answered.
    async fn perform(&self, action: &OutboundAction) -> ActionOutcome;
}
