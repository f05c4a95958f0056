//! Error types for the room layer.

use draftforge_protocol::{ErrorCode, RoomCode};

use crate::Rejection;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// `join`, `set_ready` or `submit` named a room that doesn't exist.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// `rejoin` named a room that was reaped or never existed.
    #[error("session {0} expired")]
    SessionExpired(RoomCode),

    #[error("unknown schema {0:?}")]
    UnknownSchema(String),

    /// Every room code tried was already taken.
    #[error("could not allocate a free room code")]
    CodeSpaceExhausted,

    /// The session refused the command. Never surfaced to the client.
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),
}

impl RoomError {
    /// The code sent to the caller, or `None` for silent refusals.
    pub fn client_code(&self) -> Option<ErrorCode> {
        match self {
            Self::NotFound(_) => Some(ErrorCode::RoomNotFound),
            Self::SessionExpired(_) => Some(ErrorCode::SessionExpired),
            Self::UnknownSchema(_) => Some(ErrorCode::UnknownSchema),
            Self::CodeSpaceExhausted => Some(ErrorCode::Unavailable),
            Self::Rejected(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_code_lookup_failures_are_distinct() {
        let code = RoomCode::new("ABCD");
        assert_eq!(
            RoomError::NotFound(code.clone()).client_code(),
            Some(ErrorCode::RoomNotFound)
        );
        assert_eq!(
            RoomError::SessionExpired(code).client_code(),
            Some(ErrorCode::SessionExpired)
        );
    }

    #[test]
    fn test_client_code_exhausted_codes_unavailable() {
        assert_eq!(
            RoomError::CodeSpaceExhausted.client_code(),
            Some(ErrorCode::Unavailable)
        );
    }

    #[test]
    fn test_client_code_rejection_is_silent() {
        let err = RoomError::from(Rejection::NotStarted);
        assert_eq!(err.client_code(), None);
    }
}
