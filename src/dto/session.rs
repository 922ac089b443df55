use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{AssignmentEntity, SessionEntity},
    dto::format_system_time,
};

/// Payload used to create a brand-new lottery session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSessionRequest {
    /// Display name for the event, e.g. "New Year Party 2026".
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Number of seats participants can draw.
    #[validate(range(min = 1, max = 100))]
    pub total_seats: u16,
}

/// Public projection of a session exposed to REST and SSE clients.
///
/// Forced assignments deliberately never appear here.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSummary {
    pub id: String,
    pub name: String,
    pub total_seats: u16,
    pub created_at: String,
    /// Link participants open (or scan) to join the session.
    pub share_url: String,
    /// Number of seats already drawn.
    pub drawn: usize,
    /// Number of seats still available.
    pub remaining: usize,
    /// Assignments sorted by seat number.
    pub assignments: Vec<AssignmentSummary>,
}

/// Single (participant, seat) pair as shown in the results list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignmentSummary {
    pub name: String,
    pub seat: u16,
    pub drawn_at: String,
}

impl From<AssignmentEntity> for AssignmentSummary {
    fn from(entity: AssignmentEntity) -> Self {
        Self {
            name: entity.name,
            seat: entity.seat,
            drawn_at: format_system_time(entity.drawn_at),
        }
    }
}

impl SessionSummary {
    /// Assemble the public projection from the stored session and its
    /// assignments, sorted by seat number for the results list.
    pub fn from_parts(
        session: SessionEntity,
        mut assignments: Vec<AssignmentEntity>,
        share_url: String,
    ) -> Self {
        assignments.sort_by_key(|assignment| assignment.seat);

        let drawn = assignments.len();
        let remaining = usize::from(session.total_seats).saturating_sub(drawn);

        Self {
            id: session.id,
            name: session.name,
            total_seats: session.total_seats,
            created_at: format_system_time(session.created_at),
            share_url,
            drawn,
            remaining,
            assignments: assignments.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn session() -> SessionEntity {
        SessionEntity {
            id: "AB12CD".into(),
            name: "office party".into(),
            total_seats: 5,
            created_at: SystemTime::now(),
            predefined_seats: Default::default(),
        }
    }

    #[test]
    fn summary_sorts_assignments_and_counts_remaining() {
        let assignments = vec![
            AssignmentEntity::new("carol".into(), "CAROL".into(), 4),
            AssignmentEntity::new("alice".into(), "ALICE".into(), 2),
        ];

        let summary =
            SessionSummary::from_parts(session(), assignments, "http://x/?s=AB12CD".into());

        assert_eq!(summary.drawn, 2);
        assert_eq!(summary.remaining, 3);
        let seats: Vec<u16> = summary.assignments.iter().map(|a| a.seat).collect();
        assert_eq!(seats, vec![2, 4]);
    }
}
