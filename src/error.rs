//! Errors returned to the host for a single request.
//!
//! Every variant maps to a stable wire code. None of them is fatal: a failed
//! request leaves the handlers ready for the next one.

use thiserror::Error;

use crate::platform::PlatformError;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Missing or mistyped request arguments. Raised before any OS call.
    #[error("{0}")]
    InvalidArgument(String),
    #[error("unsupported media key {0:?}")]
    UnsupportedKey(String),
    /// The OS accepted fewer events than were queued. Delivered events are
    /// not rolled back.
    #[error("SendInput delivered {delivered} of {requested} events")]
    SendInputFailed { requested: usize, delivered: usize },
    #[error("method {0:?} is not implemented")]
    NotImplemented(String),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl BridgeError {
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::InvalidArgument(_) => "INVALID_ARGUMENT",
            BridgeError::UnsupportedKey(_) => "UNSUPPORTED_KEY",
            BridgeError::SendInputFailed { .. } => "SEND_INPUT_FAILED",
            BridgeError::NotImplemented(_) => "NOT_IMPLEMENTED",
            BridgeError::Platform(_) => "PLATFORM_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            BridgeError::InvalidArgument("x".into()).code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(
            BridgeError::UnsupportedKey("bogus".into()).code(),
            "UNSUPPORTED_KEY"
        );
        assert_eq!(
            BridgeError::SendInputFailed {
                requested: 2,
                delivered: 1
            }
            .code(),
            "SEND_INPUT_FAILED"
        );
        assert_eq!(
            BridgeError::NotImplemented("foo".into()).code(),
            "NOT_IMPLEMENTED"
        );
        assert_eq!(
            BridgeError::from(PlatformError::Unavailable("no SendInput".into())).code(),
            "PLATFORM_ERROR"
        );
    }

    #[test]
    fn delivery_message_reports_counts() {
        let err = BridgeError::SendInputFailed {
            requested: 3,
            delivered: 1,
        };
        assert_eq!(err.to_string(), "SendInput delivered 1 of 3 events");
    }
}
