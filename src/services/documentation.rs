use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the seat lottery backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sessions::create_session,
        crate::routes::sessions::get_session,
        crate::routes::sessions::list_assignments,
        crate::routes::sessions::draw_seat,
        crate::routes::sse::session_stream,
        crate::routes::screens::resolve_entry,
        crate::routes::admin::get_session_predefined,
        crate::routes::admin::set_session_predefined,
        crate::routes::admin::get_global_predefined,
        crate::routes::admin::set_global_predefined,
        crate::routes::admin::reset_global_predefined,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::CreateSessionRequest,
            crate::dto::session::SessionSummary,
            crate::dto::session::AssignmentSummary,
            crate::dto::draw::DrawRequest,
            crate::dto::draw::DrawResponse,
            crate::dto::screen::EntryResponse,
            crate::dto::admin::PredefinedSeatInput,
            crate::dto::admin::UpdatePredefinedSeatsRequest,
            crate::dto::admin::PredefinedSeatsResponse,
            crate::dto::admin::PredefinedSeatEntry,
            crate::dto::admin::ActionResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::DrawStartedEvent,
            crate::dto::sse::DrawTickEvent,
            crate::dto::sse::AssignmentRecordedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Session creation and lookup"),
        (name = "draw", description = "Seat drawing"),
        (name = "sse", description = "Per-session server-sent event streams"),
        (name = "screen", description = "Entry screen resolution"),
        (name = "admin", description = "Organizer-only forced assignment management"),
    )
)]
pub struct ApiDoc;
