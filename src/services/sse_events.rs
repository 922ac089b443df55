use serde::Serialize;
use tracing::warn;

use crate::{
    dao::models::AssignmentEntity,
    dto::sse::{AssignmentRecordedEvent, DrawStartedEvent, DrawTickEvent, ServerEvent, SystemStatus},
    state::SharedState,
};

const EVENT_DRAW_STARTED: &str = "draw.started";
const EVENT_DRAW_TICK: &str = "draw.tick";
const EVENT_ASSIGNMENT_RECORDED: &str = "assignment.recorded";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast that a participant submitted a draw.
pub fn broadcast_draw_started(state: &SharedState, session_id: &str, name: &str) {
    let payload = DrawStartedEvent {
        name: name.to_owned(),
    };
    send_session_event(state, session_id, EVENT_DRAW_STARTED, &payload);
}

/// Broadcast one cosmetic countdown step.
pub fn broadcast_draw_tick(state: &SharedState, session_id: &str, seat: u16) {
    let payload = DrawTickEvent { seat };
    send_session_event(state, session_id, EVENT_DRAW_TICK, &payload);
}

/// Broadcast a persisted assignment so every mirror updates its results list.
pub fn broadcast_assignment_recorded(
    state: &SharedState,
    session_id: &str,
    assignment: &AssignmentEntity,
    remaining: usize,
) {
    let payload = AssignmentRecordedEvent {
        assignment: assignment.clone().into(),
        remaining,
    };
    send_session_event(state, session_id, EVENT_ASSIGNMENT_RECORDED, &payload);
}

/// Broadcast a degraded-mode change to every live session stream.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    match ServerEvent::json(EVENT_SYSTEM_STATUS.to_string(), &payload) {
        Ok(event) => state.streams().broadcast_all(&event),
        Err(err) => warn!(error = %err, "failed to serialize system status payload"),
    }
}

fn send_session_event(state: &SharedState, session_id: &str, event: &str, payload: &impl Serialize) {
    // Sessions nobody mirrors have no hub; skip instead of allocating one.
    let Some(hub) = state.streams().get(session_id) else {
        return;
    };

    match ServerEvent::json(event.to_string(), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize session SSE payload"),
    }
}
