//! Error types for the game engine.
//!
//! Precondition failures and lost races are not errors: the engine answers
//! them with a notice and returns `Ok`. What ends up here is collaborator
//! trouble, and writes that only got half done.

use codehunt_store::StoreError;
use codehunt_transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The store failed (after any retries the store itself performs).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A notice could not be delivered.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Some writes of a multi-step operation landed and some didn't.
    /// The records named in `detail` need reconciling by hand.
    #[error("partial write during {operation}: {detail}")]
    PartialWrite {
        operation: &'static str,
        detail: String,
    },
}

impl EngineError {
    pub fn is_partial_write(&self) -> bool {
        matches!(self, Self::PartialWrite { .. })
    }
}

#[cfg(test)]
mod tests {
    use codehunt_protocol::ActorId;

    use super::*;

    #[test]
    fn test_partial_write_display_names_operation() {
        let err = EngineError::PartialWrite {
            operation: "submit_code",
            detail: "P-1 has P-2, P-2 lacks P-1".into(),
        };
        assert!(err.is_partial_write());
        assert_eq!(
            err.to_string(),
            "partial write during submit_code: P-1 has P-2, P-2 lacks P-1"
        );
    }

    #[test]
    fn test_from_transport_error() {
        let err: EngineError = TransportError::Unreachable(ActorId(4)).into();
        assert!(matches!(err, EngineError::Transport(_)));
        assert!(!err.is_partial_write());
    }
}
