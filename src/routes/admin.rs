//! Organizer-only endpoints managing forced assignments.
//!
//! These surfaces are reached through unguessable URLs, exactly like the
//! web frontends' `?admin=` and `?global` pages; there is no account system.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use validator::Validate;

use crate::{
    dto::admin::{ActionResponse, PredefinedSeatsResponse, UpdatePredefinedSeatsRequest},
    error::AppError,
    services::predefined_service,
    state::SharedState,
};

/// Admin route subtree for per-session and global forced assignments.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/admin/sessions/{id}/predefined",
            get(get_session_predefined).put(set_session_predefined),
        )
        .route(
            "/admin/global/predefined",
            get(get_global_predefined)
                .put(set_global_predefined)
                .delete(reset_global_predefined),
        )
}

/// Read a session's forced assignments.
#[utoipa::path(
    get,
    path = "/admin/sessions/{id}/predefined",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the session")),
    responses(
        (status = 200, description = "Current mapping", body = PredefinedSeatsResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session_predefined(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PredefinedSeatsResponse>, AppError> {
    Ok(Json(
        predefined_service::session_predefined(&state, &id).await?,
    ))
}

/// Replace a session's forced assignments.
#[utoipa::path(
    put,
    path = "/admin/sessions/{id}/predefined",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the session")),
    request_body = UpdatePredefinedSeatsRequest,
    responses(
        (status = 200, description = "Mapping replaced", body = PredefinedSeatsResponse),
        (status = 400, description = "Invalid name or seat number"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn set_session_predefined(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePredefinedSeatsRequest>,
) -> Result<Json<PredefinedSeatsResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        predefined_service::set_session_predefined(&state, &id, payload).await?,
    ))
}

/// Read the forced assignments shared by every session.
#[utoipa::path(
    get,
    path = "/admin/global/predefined",
    tag = "admin",
    responses((status = 200, description = "Current mapping", body = PredefinedSeatsResponse))
)]
pub async fn get_global_predefined(
    State(state): State<SharedState>,
) -> Result<Json<PredefinedSeatsResponse>, AppError> {
    Ok(Json(predefined_service::global_predefined(&state).await?))
}

/// Replace the global forced assignments.
#[utoipa::path(
    put,
    path = "/admin/global/predefined",
    tag = "admin",
    request_body = UpdatePredefinedSeatsRequest,
    responses(
        (status = 200, description = "Mapping replaced", body = PredefinedSeatsResponse),
        (status = 400, description = "Invalid name or seat number")
    )
)]
pub async fn set_global_predefined(
    State(state): State<SharedState>,
    Json(payload): Json<UpdatePredefinedSeatsRequest>,
) -> Result<Json<PredefinedSeatsResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        predefined_service::set_global_predefined(&state, payload).await?,
    ))
}

/// Remove every global forced assignment.
#[utoipa::path(
    delete,
    path = "/admin/global/predefined",
    tag = "admin",
    responses((status = 200, description = "Mapping cleared", body = ActionResponse))
)]
pub async fn reset_global_predefined(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    predefined_service::reset_global_predefined(&state).await?;
    Ok(Json(ActionResponse {
        message: "global predefined seats cleared".into(),
    }))
}
