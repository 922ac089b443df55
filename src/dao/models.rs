use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Organizer-configured forced assignments: case-folded name to seat number.
pub type PredefinedSeats = IndexMap<String, u16>;

/// Lottery session persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionEntity {
    /// Short shareable identifier (uppercase letters and digits).
    pub id: String,
    /// Display name chosen by the organizer.
    pub name: String,
    /// Number of seats that can be drawn, numbered `1..=total_seats`.
    pub total_seats: u16,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Forced assignments for this session, hidden from participants.
    pub predefined_seats: PredefinedSeats,
}

/// A finalized (participant, seat) pair appended to a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentEntity {
    /// Stable identifier for the assignment.
    pub id: Uuid,
    /// Participant name as typed.
    pub name: String,
    /// Case-folded name used to enforce one draw per participant.
    pub name_key: String,
    /// Seat number in `[1, total_seats]`.
    pub seat: u16,
    /// Time the draw was finalized.
    pub drawn_at: SystemTime,
}

impl AssignmentEntity {
    /// Build a fresh assignment stamped with the current time.
    pub fn new(name: String, name_key: String, seat: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            name_key,
            seat,
            drawn_at: SystemTime::now(),
        }
    }
}
