//! Organizer-facing management of forced assignments, per session and global.

use std::collections::HashSet;

use crate::{
    dao::models::PredefinedSeats,
    dto::admin::{PredefinedSeatInput, PredefinedSeatsResponse, UpdatePredefinedSeatsRequest},
    error::ServiceError,
    services::{allocator, session_service},
    state::SharedState,
};

/// Current forced assignments for a session.
pub async fn session_predefined(
    state: &SharedState,
    session_id: &str,
) -> Result<PredefinedSeatsResponse, ServiceError> {
    session_service::ensure_session_id(session_id)?;
    let store = state.require_session_store().await?;

    let Some(session) = store.find_session(session_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };

    Ok(session.predefined_seats.into())
}

/// Replace a session's forced assignments.
pub async fn set_session_predefined(
    state: &SharedState,
    session_id: &str,
    request: UpdatePredefinedSeatsRequest,
) -> Result<PredefinedSeatsResponse, ServiceError> {
    session_service::ensure_session_id(session_id)?;
    let store = state.require_session_store().await?;

    let Some(session) = store.find_session(session_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };

    let mapping = build_mapping(request.seats, session.total_seats)?;
    if !store.set_predefined_seats(session_id, mapping.clone()).await? {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    }

    Ok(mapping.into())
}

/// Current forced assignments shared by every session.
pub async fn global_predefined(
    state: &SharedState,
) -> Result<PredefinedSeatsResponse, ServiceError> {
    let store = state.require_session_store().await?;
    Ok(store.global_predefined_seats().await?.into())
}

/// Replace the global forced assignments.
pub async fn set_global_predefined(
    state: &SharedState,
    request: UpdatePredefinedSeatsRequest,
) -> Result<PredefinedSeatsResponse, ServiceError> {
    let store = state.require_session_store().await?;

    let mapping = build_mapping(request.seats, state.config().max_seats)?;
    store.set_global_predefined_seats(mapping.clone()).await?;
    Ok(mapping.into())
}

/// Remove every global forced assignment.
pub async fn reset_global_predefined(state: &SharedState) -> Result<(), ServiceError> {
    let store = state.require_session_store().await?;
    store.clear_global_predefined_seats().await?;
    Ok(())
}

/// Merge the per-session mapping with the global one; on a key collision the
/// global entry wins, matching the frontends' merge order.
pub fn merge_mappings(session: &PredefinedSeats, global: &PredefinedSeats) -> PredefinedSeats {
    let mut merged = session.clone();
    for (name, seat) in global {
        merged.insert(name.clone(), *seat);
    }
    merged
}

/// Validate organizer input and fold it into the stored mapping shape.
fn build_mapping(
    entries: Vec<PredefinedSeatInput>,
    max_seat: u16,
) -> Result<PredefinedSeats, ServiceError> {
    let mut seen = HashSet::new();
    let mut mapping = PredefinedSeats::default();

    for entry in entries {
        let key = allocator::name_key(&entry.name);
        if key.is_empty() {
            return Err(ServiceError::InvalidInput(
                "predefined name must not be empty".into(),
            ));
        }

        if entry.seat == 0 || entry.seat > max_seat {
            return Err(ServiceError::InvalidInput(format!(
                "seat for `{}` must be between 1 and {max_seat}",
                entry.name
            )));
        }

        if !seen.insert(key.clone()) {
            return Err(ServiceError::InvalidInput(format!(
                "duplicate predefined name `{}`",
                entry.name
            )));
        }

        mapping.insert(key, entry.seat);
    }

    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, seat: u16) -> PredefinedSeatInput {
        PredefinedSeatInput {
            name: name.to_owned(),
            seat,
        }
    }

    #[test]
    fn build_mapping_case_folds_names() {
        let mapping = build_mapping(vec![input(" yt ", 3)], 10).unwrap();
        assert_eq!(mapping.get("YT"), Some(&3));
    }

    #[test]
    fn build_mapping_rejects_out_of_range_seats() {
        assert!(build_mapping(vec![input("yt", 0)], 10).is_err());
        assert!(build_mapping(vec![input("yt", 11)], 10).is_err());
    }

    #[test]
    fn build_mapping_rejects_case_insensitive_duplicates() {
        let err = build_mapping(vec![input("yt", 1), input("YT", 2)], 10).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn global_entries_shadow_session_entries() {
        let session: PredefinedSeats = [("YT".to_owned(), 1), ("AB".to_owned(), 2)]
            .into_iter()
            .collect();
        let global: PredefinedSeats = [("YT".to_owned(), 9)].into_iter().collect();

        let merged = merge_mappings(&session, &global);
        assert_eq!(merged.get("YT"), Some(&9));
        assert_eq!(merged.get("AB"), Some(&2));
    }
}
