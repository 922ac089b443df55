#[cfg(feature = "firebase-store")]
pub mod firebase;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{AssignmentEntity, PredefinedSeats, SessionEntity};
use crate::dao::storage::{ClaimOutcome, StorageResult};
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for lottery sessions and assignments.
pub trait SessionStore: Send + Sync {
    /// Persist a new session. Returns `false` when the identifier is already in use.
    fn create_session(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<bool>>;
    fn find_session(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>>;
    fn list_assignments(
        &self,
        session_id: &str,
    ) -> BoxFuture<'static, StorageResult<Vec<AssignmentEntity>>>;
    /// Conditionally append an assignment; see [`ClaimOutcome`] for the contract.
    fn claim_seat(
        &self,
        session_id: &str,
        assignment: AssignmentEntity,
    ) -> BoxFuture<'static, StorageResult<ClaimOutcome>>;
    /// Replace the per-session forced assignments. Returns `false` when the session is unknown.
    fn set_predefined_seats(
        &self,
        session_id: &str,
        seats: PredefinedSeats,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn global_predefined_seats(&self) -> BoxFuture<'static, StorageResult<PredefinedSeats>>;
    fn set_global_predefined_seats(
        &self,
        seats: PredefinedSeats,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn clear_global_predefined_seats(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
