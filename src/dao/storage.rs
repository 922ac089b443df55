use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Result of a conditional seat claim against the backing store.
///
/// The claim is a compare-and-set: it only appends the assignment when the
/// seat number and the case-folded participant name are both absent from the
/// session's assignment list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The assignment was appended; the seat now belongs to the participant.
    Claimed,
    /// Another assignment holds the seat; the caller should re-select.
    SeatTaken,
    /// The participant already drew a seat in this session.
    NameTaken,
    /// The session does not exist (deleted or never created).
    SessionMissing,
}
