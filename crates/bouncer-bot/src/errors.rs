//! Maps serenity errors onto the action failure taxonomy.
//!
//! The queue retries `RateLimited` and resolves everything else, so the
//! classification here decides which failures reach the user.

use std::time::Duration;

use serenity::http::HttpError;

use bouncer_types::ActionError;

/// Fallback retry delay when Discord reports a rate limit; the precise value
/// is in the JSON body, which serenity has already consumed at this point.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Discord error codes that signal a permission problem regardless of the
/// HTTP status they arrive with.
const CODE_MISSING_ACCESS: u32 = 50001;
const CODE_MISSING_PERMISSIONS: u32 = 50013;

/// Classify a serenity `Error` raised by an action needing `capability`.
pub fn classify(err: &serenity::Error, capability: Option<&str>) -> ActionError {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) => classify_response(
            resp.status_code.as_u16(),
            resp.error.code as u32,
            &resp.error.message,
            capability,
        ),
        // Network and serialization failures carry no Discord error code.
        _ => ActionError::unknown(err.to_string()),
    }
}

/// Classify one unsuccessful Discord API response.
fn classify_response(
    status: u16,
    code: u32,
    message: &str,
    capability: Option<&str>,
) -> ActionError {
    if status == 429 {
        return ActionError::rate_limited(DEFAULT_RETRY_AFTER);
    }
    if status == 403 || code == CODE_MISSING_ACCESS || code == CODE_MISSING_PERMISSIONS {
        return ActionError::permission_denied(capability, message);
    }
    ActionError::unknown(message)
}
