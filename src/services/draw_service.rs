//! Draw orchestration: allocation, the conditional claim, and the countdown.

use std::sync::Arc;

use rand::Rng;
use tokio::time::sleep;

use crate::{
    dao::{models::AssignmentEntity, storage::ClaimOutcome},
    dto::draw::{DrawRequest, DrawResponse},
    error::ServiceError,
    services::{allocator, predefined_service, session_service, sse_events},
    state::{AppState, SharedState},
};

/// Draw a seat for a participant and record the assignment exactly once.
///
/// The seat claim is a compare-and-set against the store: when another client
/// wins the race for the selected seat, the draw re-selects from the seats
/// that are still free instead of silently double-booking.
pub async fn draw_seat(
    state: &SharedState,
    session_id: &str,
    request: DrawRequest,
) -> Result<DrawResponse, ServiceError> {
    session_service::ensure_session_id(session_id)?;

    let participant = request.name.trim().to_owned();
    if participant.is_empty() {
        return Err(ServiceError::InvalidInput(
            "participant name must not be empty".into(),
        ));
    }

    let key = allocator::name_key(&participant);
    let _guard = AppState::begin_draw(state, session_id, &key).ok_or_else(|| {
        ServiceError::InvalidState("a draw for this name is already in progress".into())
    })?;

    let store = state.require_session_store().await?;
    let Some(session) = store.find_session(session_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };

    let global = store.global_predefined_seats().await?;
    let predefined = predefined_service::merge_mappings(&session.predefined_seats, &global);

    sse_events::broadcast_draw_started(state, session_id, &participant);

    let mut assignments = store.list_assignments(session_id).await?;
    let recorded = loop {
        if assignments
            .iter()
            .any(|assignment| assignment.name_key == key)
        {
            return Err(already_drawn());
        }

        let taken: Vec<u16> = assignments.iter().map(|assignment| assignment.seat).collect();
        let seat = allocator::select_seat(session.total_seats, &taken, &participant, &predefined)
            .map_err(|err| ServiceError::InvalidState(err.to_string()))?;

        let candidate = AssignmentEntity::new(participant.clone(), key.clone(), seat);
        match store.claim_seat(session_id, candidate.clone()).await? {
            ClaimOutcome::Claimed => break candidate,
            ClaimOutcome::SeatTaken => {
                // Lost the race for this seat. Every retry observes at least
                // one more taken seat, so the loop is bounded by the seat
                // count and ends in `AllSeatsTaken` at worst.
                assignments = store.list_assignments(session_id).await?;
            }
            ClaimOutcome::NameTaken => return Err(already_drawn()),
            ClaimOutcome::SessionMissing => {
                return Err(ServiceError::NotFound(format!(
                    "session `{session_id}` not found"
                )));
            }
        }
    };

    let remaining = usize::from(session.total_seats).saturating_sub(assignments.len() + 1);

    spawn_draw_countdown(
        state,
        session_id,
        session.total_seats,
        recorded.clone(),
        remaining,
    );

    Ok(DrawResponse {
        assignment: recorded.into(),
        remaining,
    })
}

fn already_drawn() -> ServiceError {
    ServiceError::InvalidState("this name has already drawn a seat".into())
}

/// Broadcast the cosmetic countdown on the session stream, ending with the
/// recorded assignment. The draw itself has already been persisted; clients
/// that skip the stream simply see the result immediately.
fn spawn_draw_countdown(
    state: &SharedState,
    session_id: &str,
    total_seats: u16,
    recorded: AssignmentEntity,
    remaining: usize,
) {
    let interval = state.config().draw_tick_interval;

    // Pre-generate the displayed numbers so no RNG handle crosses an await.
    let mut rng = rand::rng();
    let ticks: Vec<u16> = (0..state.config().draw_tick_count)
        .map(|_| rng.random_range(1..=total_seats))
        .collect();

    let state = Arc::clone(state);
    let session_id = session_id.to_owned();
    tokio::spawn(async move {
        for seat in ticks {
            sse_events::broadcast_draw_tick(&state, &session_id, seat);
            sleep(interval).await;
        }
        sse_events::broadcast_assignment_recorded(&state, &session_id, &recorded, remaining);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Arc, Mutex},
        time::SystemTime,
    };

    use futures::future::BoxFuture;

    use crate::{
        config::AppConfig,
        dao::{
            models::{PredefinedSeats, SessionEntity},
            session_store::SessionStore,
            storage::StorageResult,
        },
        state::{AppState, SharedState},
    };

    /// In-memory store whose claim behaves like the real compare-and-set.
    /// `scripted_outcomes` lets a test inject lost races.
    struct TestStore {
        session: SessionEntity,
        assignments: Mutex<Vec<AssignmentEntity>>,
        global: PredefinedSeats,
        scripted_outcomes: Mutex<Vec<ClaimOutcome>>,
    }

    impl TestStore {
        fn new(session: SessionEntity) -> Self {
            Self {
                session,
                assignments: Mutex::new(Vec::new()),
                global: PredefinedSeats::default(),
                scripted_outcomes: Mutex::new(Vec::new()),
            }
        }

        fn with_global(mut self, global: PredefinedSeats) -> Self {
            self.global = global;
            self
        }

        fn with_assignment(self, name: &str, seat: u16) -> Self {
            self.assignments.lock().unwrap().push(AssignmentEntity::new(
                name.to_owned(),
                allocator::name_key(name),
                seat,
            ));
            self
        }

        fn script_outcome(&self, outcome: ClaimOutcome) {
            self.scripted_outcomes.lock().unwrap().push(outcome);
        }

        fn recorded_seats(&self) -> Vec<u16> {
            self.assignments
                .lock()
                .unwrap()
                .iter()
                .map(|assignment| assignment.seat)
                .collect()
        }
    }

    impl SessionStore for Arc<TestStore> {
        fn create_session(
            &self,
            _session: SessionEntity,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            Box::pin(async { Ok(true) })
        }

        fn find_session(
            &self,
            id: &str,
        ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
            let found = (id == self.session.id).then(|| self.session.clone());
            Box::pin(async move { Ok(found) })
        }

        fn list_assignments(
            &self,
            _session_id: &str,
        ) -> BoxFuture<'static, StorageResult<Vec<AssignmentEntity>>> {
            let assignments = self.assignments.lock().unwrap().clone();
            Box::pin(async move { Ok(assignments) })
        }

        fn claim_seat(
            &self,
            _session_id: &str,
            assignment: AssignmentEntity,
        ) -> BoxFuture<'static, StorageResult<ClaimOutcome>> {
            if let Some(outcome) = self.scripted_outcomes.lock().unwrap().pop() {
                return Box::pin(async move { Ok(outcome) });
            }

            let mut assignments = self.assignments.lock().unwrap();
            let outcome = if assignments
                .iter()
                .any(|existing| existing.name_key == assignment.name_key)
            {
                ClaimOutcome::NameTaken
            } else if assignments
                .iter()
                .any(|existing| existing.seat == assignment.seat)
            {
                ClaimOutcome::SeatTaken
            } else {
                assignments.push(assignment);
                ClaimOutcome::Claimed
            };
            Box::pin(async move { Ok(outcome) })
        }

        fn set_predefined_seats(
            &self,
            _session_id: &str,
            _seats: PredefinedSeats,
        ) -> BoxFuture<'static, StorageResult<bool>> {
            Box::pin(async { Ok(true) })
        }

        fn global_predefined_seats(&self) -> BoxFuture<'static, StorageResult<PredefinedSeats>> {
            let global = self.global.clone();
            Box::pin(async move { Ok(global) })
        }

        fn set_global_predefined_seats(
            &self,
            _seats: PredefinedSeats,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn clear_global_predefined_seats(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn session(total_seats: u16, predefined: &[(&str, u16)]) -> SessionEntity {
        SessionEntity {
            id: "AB12CD".into(),
            name: "office party".into(),
            total_seats,
            created_at: SystemTime::now(),
            predefined_seats: predefined
                .iter()
                .map(|(name, seat)| (name.to_string(), *seat))
                .collect(),
        }
    }

    async fn state_with(store: Arc<TestStore>) -> SharedState {
        let state = AppState::new(AppConfig::default());
        state.set_session_store(Arc::new(store)).await;
        state
    }

    fn draw(name: &str) -> DrawRequest {
        DrawRequest {
            name: name.to_owned(),
        }
    }

    #[tokio::test]
    async fn draw_records_a_free_seat() {
        let store = Arc::new(TestStore::new(session(5, &[])));
        let state = state_with(Arc::clone(&store)).await;

        let response = draw_seat(&state, "AB12CD", draw("alice")).await.unwrap();

        assert!((1..=5).contains(&response.assignment.seat));
        assert_eq!(response.remaining, 4);
        assert_eq!(store.recorded_seats().len(), 1);
    }

    #[tokio::test]
    async fn predefined_seat_wins_case_insensitively() {
        let store = Arc::new(
            TestStore::new(session(5, &[("YT", 3)]))
                .with_assignment("bob", 2)
                .with_assignment("carol", 4),
        );
        let state = state_with(Arc::clone(&store)).await;

        let response = draw_seat(&state, "AB12CD", draw("yt")).await.unwrap();
        assert_eq!(response.assignment.seat, 3);
    }

    #[tokio::test]
    async fn global_mapping_shadows_the_session_mapping() {
        let global: PredefinedSeats = [("YT".to_owned(), 5)].into_iter().collect();
        let store = Arc::new(TestStore::new(session(5, &[("YT", 1)])).with_global(global));
        let state = state_with(Arc::clone(&store)).await;

        let response = draw_seat(&state, "AB12CD", draw("yt")).await.unwrap();
        assert_eq!(response.assignment.seat, 5);
    }

    #[tokio::test]
    async fn full_session_reports_all_seats_taken() {
        let store = Arc::new(
            TestStore::new(session(2, &[]))
                .with_assignment("alice", 1)
                .with_assignment("bob", 2),
        );
        let state = state_with(store).await;

        let err = draw_seat(&state, "AB12CD", draw("carol")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(message) if message.contains("all seats are taken")));
    }

    #[tokio::test]
    async fn second_draw_for_the_same_name_conflicts() {
        let store = Arc::new(TestStore::new(session(5, &[])).with_assignment("alice", 1));
        let state = state_with(store).await;

        let err = draw_seat(&state, "AB12CD", draw(" ALICE ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(message) if message.contains("already drawn")));
    }

    #[tokio::test]
    async fn lost_race_reselects_another_seat() {
        let store = Arc::new(TestStore::new(session(3, &[])));
        // First claim attempt loses the race; the retry goes through the
        // real compare-and-set and must settle on a free seat.
        store.script_outcome(ClaimOutcome::SeatTaken);
        let state = state_with(Arc::clone(&store)).await;

        let response = draw_seat(&state, "AB12CD", draw("alice")).await.unwrap();
        assert!((1..=3).contains(&response.assignment.seat));
        assert_eq!(store.recorded_seats().len(), 1);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = Arc::new(TestStore::new(session(5, &[])));
        let state = state_with(store).await;

        let err = draw_seat(&state, "ZZZZZZ", draw("alice")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let store = Arc::new(TestStore::new(session(5, &[])));
        let state = state_with(store).await;

        let err = draw_seat(&state, "AB12CD", draw("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
