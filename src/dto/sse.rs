use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::session::AssignmentSummary;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the mirrored session.
    pub session_id: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a participant submits a draw.
pub struct DrawStartedEvent {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// One cosmetic countdown step; `seat` is a random number to display.
pub struct DrawTickEvent {
    pub seat: u16,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once a draw has been persisted.
pub struct AssignmentRecordedEvent {
    pub assignment: AssignmentSummary,
    /// Seats still available in the session.
    pub remaining: usize,
}
