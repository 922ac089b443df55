//! DTO definitions used by the organizer-facing REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::PredefinedSeats;

/// One forced assignment as edited by the organizer.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct PredefinedSeatInput {
    /// Participant name the entry applies to (matched case-insensitively).
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Seat the participant will receive when it is still free.
    pub seat: u16,
}

/// Payload replacing a forced-assignment mapping wholesale.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdatePredefinedSeatsRequest {
    #[validate(nested)]
    pub seats: Vec<PredefinedSeatInput>,
}

/// One stored forced assignment returned to the organizer.
#[derive(Debug, Serialize, ToSchema)]
pub struct PredefinedSeatEntry {
    /// Stored case-folded name key.
    pub name: String,
    pub seat: u16,
}

/// Current forced-assignment mapping for a session or the global scope.
#[derive(Debug, Serialize, ToSchema)]
pub struct PredefinedSeatsResponse {
    pub seats: Vec<PredefinedSeatEntry>,
}

impl From<PredefinedSeats> for PredefinedSeatsResponse {
    fn from(seats: PredefinedSeats) -> Self {
        Self {
            seats: seats
                .into_iter()
                .map(|(name, seat)| PredefinedSeatEntry { name, seat })
                .collect(),
        }
    }
}

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}
