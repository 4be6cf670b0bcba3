//! The failure taxonomy for outbound actions.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a submitted action failed.
///
/// Deliberately a closed enum: handlers match it exhaustively, so adding a
/// failure kind is a compile error at every consumer rather than a silent
/// fall-through into a generic branch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionError {
    /// The platform throttled the action.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// The bot lacks a capability the action needs.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// The missing capability, when the platform names one.
        #[serde(skip_serializing_if = "Option::is_none")]
        capability: Option<String>,
        message: String,
    },

    /// Anything the platform reported that fits no other kind.
    #[error("{message}")]
    Unknown { message: String },
}

impl ActionError {
    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited { retry_after }
    }

    pub fn permission_denied(capability: Option<&str>, message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            capability: capability.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Stable label naming the failure kind, for user-facing error texts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "RateLimited",
            Self::PermissionDenied { .. } => "PermissionDenied",
            Self::Unknown { .. } => "Unknown",
        }
    }

    /// Retry-after duration, for the rate-limited kind only.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// User-facing detail line: the platform message, with the missing
    /// capability appended when known.
    pub fn detail(&self) -> String {
        match self {
            Self::RateLimited { retry_after } => {
                format!("rate limited, retry after {:?}", retry_after)
            }
            Self::PermissionDenied {
                capability: Some(capability),
                message,
            } => format!("{} (missing {})", message, capability),
            Self::PermissionDenied {
                capability: None,
                message,
            } => message.clone(),
            Self::Unknown { message } => message.clone(),
        }
    }
}
