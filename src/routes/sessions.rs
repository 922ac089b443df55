use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        draw::{DrawRequest, DrawResponse},
        session::{AssignmentSummary, CreateSessionRequest, SessionSummary},
    },
    error::AppError,
    services::{draw_service, session_service},
    state::SharedState,
};

/// Routes handling session bootstrap, lookup, and drawing.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/assignments", get(list_assignments))
        .route("/sessions/{id}/draw", post(draw_seat))
}

/// Create a fresh lottery session and persist it.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "session",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created", body = SessionSummary),
        (status = 400, description = "Invalid name or seat count")
    )
)]
pub async fn create_session(
    State(state): State<SharedState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<SessionSummary>, AppError> {
    payload.validate()?;
    let summary = session_service::create_session(&state, payload).await?;
    Ok(Json(summary))
}

/// Fetch a session for the join/overview screen.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "session",
    params(("id" = String, Path, description = "Identifier of the session to fetch")),
    responses(
        (status = 200, description = "Session found", body = SessionSummary),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, AppError> {
    let summary = session_service::fetch_session(&state, &id).await?;
    Ok(Json(summary))
}

/// List a session's assignments sorted by seat number.
#[utoipa::path(
    get,
    path = "/sessions/{id}/assignments",
    tag = "session",
    params(("id" = String, Path, description = "Identifier of the session")),
    responses(
        (status = 200, description = "Assignments sorted by seat", body = [AssignmentSummary]),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn list_assignments(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AssignmentSummary>>, AppError> {
    let assignments = session_service::list_assignments(&state, &id).await?;
    Ok(Json(assignments))
}

/// Draw a random unoccupied seat for a participant.
#[utoipa::path(
    post,
    path = "/sessions/{id}/draw",
    tag = "draw",
    params(("id" = String, Path, description = "Identifier of the session")),
    request_body = DrawRequest,
    responses(
        (status = 200, description = "Seat drawn and recorded", body = DrawResponse),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Name already drew, or all seats are taken")
    )
)]
pub async fn draw_seat(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<DrawRequest>,
) -> Result<Json<DrawResponse>, AppError> {
    payload.validate()?;
    let response = draw_service::draw_seat(&state, &id, payload).await?;
    Ok(Json(response))
}
