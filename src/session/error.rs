//! Errors raised by the session core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("malformed '{action}' action: {reason}")]
    MalformedAction { action: String, reason: String },

    #[error("product index {index} is out of range (session holds {len} products)")]
    InvalidIndex { index: usize, len: usize },

    #[error("cannot add more than {maximum} products")]
    CapacityExceeded { maximum: usize },

    #[error("persisted session state is corrupt: {0}")]
    CorruptPersistedState(String),

    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("failed to serialize session state: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SessionError {
    /// Errors the caller can recover from without restarting the session
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidIndex { .. }
                | SessionError::CapacityExceeded { .. }
                | SessionError::CorruptPersistedState(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SessionError::InvalidIndex { index: 4, len: 2 };
        assert_eq!(
            err.to_string(),
            "product index 4 is out of range (session holds 2 products)"
        );

        let err = SessionError::UnknownAction("SET_COLOR".to_string());
        assert_eq!(err.to_string(), "unknown action 'SET_COLOR'");
    }

    #[test]
    fn test_recoverable() {
        assert!(SessionError::CapacityExceeded { maximum: 5 }.is_recoverable());
        assert!(!SessionError::UnknownAction("X".to_string()).is_recoverable());
    }
}
