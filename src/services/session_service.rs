use rand::Rng;

use crate::{
    dao::models::SessionEntity,
    dto::{
        session::{AssignmentSummary, CreateSessionRequest, SessionSummary},
        validation::validate_session_id,
    },
    error::ServiceError,
    state::SharedState,
};

/// Alphabet used for generated session identifiers, mirroring the share codes
/// participants type by hand: unambiguous to read aloud, fine in URLs.
const SESSION_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Attempts before giving up on finding an unused identifier.
const MAX_ID_ATTEMPTS: usize = 5;

/// Create a fresh session and persist it.
pub async fn create_session(
    state: &SharedState,
    request: CreateSessionRequest,
) -> Result<SessionSummary, ServiceError> {
    let CreateSessionRequest { name, total_seats } = request;

    let name = name.trim().to_owned();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "session name must not be empty".into(),
        ));
    }

    let max_seats = state.config().max_seats;
    if total_seats == 0 || total_seats > max_seats {
        return Err(ServiceError::InvalidInput(format!(
            "seat count must be between 1 and {max_seats}"
        )));
    }

    let store = state.require_session_store().await?;

    // Identifiers are short, so collide occasionally; retry with a fresh one
    // instead of overwriting someone else's session.
    for _ in 0..MAX_ID_ATTEMPTS {
        let session = SessionEntity {
            id: generate_session_id(state.config().session_id_length),
            name: name.clone(),
            total_seats,
            created_at: std::time::SystemTime::now(),
            predefined_seats: Default::default(),
        };

        if store.create_session(session.clone()).await? {
            let share_url = state.config().share_url(&session.id);
            return Ok(SessionSummary::from_parts(session, Vec::new(), share_url));
        }
    }

    Err(ServiceError::InvalidState(
        "could not allocate a session identifier".into(),
    ))
}

/// Reject identifiers that cannot have been generated before touching storage.
pub(crate) fn ensure_session_id(id: &str) -> Result<(), ServiceError> {
    validate_session_id(id).map_err(|err| {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| "invalid session id".into());
        ServiceError::InvalidInput(message)
    })
}

/// Load a session and its assignments for the join/overview screen.
pub async fn fetch_session(
    state: &SharedState,
    session_id: &str,
) -> Result<SessionSummary, ServiceError> {
    ensure_session_id(session_id)?;
    let store = state.require_session_store().await?;

    let Some(session) = store.find_session(session_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };

    let assignments = store.list_assignments(session_id).await?;
    let share_url = state.config().share_url(&session.id);
    Ok(SessionSummary::from_parts(session, assignments, share_url))
}

/// List a session's assignments sorted by seat number.
pub async fn list_assignments(
    state: &SharedState,
    session_id: &str,
) -> Result<Vec<AssignmentSummary>, ServiceError> {
    ensure_session_id(session_id)?;
    let store = state.require_session_store().await?;

    if store.find_session(session_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    }

    let mut assignments = store.list_assignments(session_id).await?;
    assignments.sort_by_key(|assignment| assignment.seat);
    Ok(assignments.into_iter().map(Into::into).collect())
}

fn generate_session_id(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let index = rng.random_range(0..SESSION_ID_ALPHABET.len());
            char::from(SESSION_ID_ALPHABET[index])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_the_requested_length_and_alphabet() {
        for _ in 0..20 {
            let id = generate_session_id(6);
            assert_eq!(id.len(), 6);
            assert!(validate_session_id(&id).is_ok());
        }
    }
}
