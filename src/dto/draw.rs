use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::session::AssignmentSummary;

/// Payload submitted by a participant to draw a seat.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct DrawRequest {
    /// Name the participant typed on the session screen.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Outcome of a finalized draw.
#[derive(Debug, Serialize, ToSchema)]
pub struct DrawResponse {
    /// The recorded assignment.
    pub assignment: AssignmentSummary,
    /// Seats still available after this draw.
    pub remaining: usize,
}
