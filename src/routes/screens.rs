use axum::{Json, Router, extract::Query, routing::get};

use crate::{
    dto::screen::{EntryQuery, EntryResponse},
    state::{SharedState, screen},
};

#[utoipa::path(
    get,
    path = "/screens/resolve",
    tag = "screen",
    params(EntryQuery),
    responses((status = 200, description = "Resolved entry screen", body = EntryResponse))
)]
/// Resolve the entry screen for the query parameters of a join URL.
pub async fn resolve_entry(Query(query): Query<EntryQuery>) -> Json<EntryResponse> {
    let entry = screen::resolve_entry(
        query.is_global(),
        query.preconfig.as_deref(),
        query.admin.as_deref(),
        query.s.as_deref(),
    );
    Json(entry.into())
}

/// Configure the screen resolution subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/screens/resolve", get(resolve_entry))
}
