use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::state::screen::Entry;

/// URL query parameters a frontend forwards to resolve its entry screen.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EntryQuery {
    /// Join link parameter (`?s=<id>`).
    pub s: Option<String>,
    /// Organizer admin page (`?admin=<id>`).
    pub admin: Option<String>,
    /// Post-creation setup page (`?preconfig=<id>`).
    pub preconfig: Option<String>,
    /// Global settings page (`?global`).
    pub global: Option<String>,
}

impl EntryQuery {
    /// Presence check: `?global` carries no value.
    pub fn is_global(&self) -> bool {
        self.global.is_some()
    }
}

/// Resolved entry screen for the requesting client.
#[derive(Debug, Serialize, ToSchema)]
pub struct EntryResponse {
    /// Screen name: `create`, `session`, `drawing`, `result`, `admin`,
    /// `preconfig`, or `global`.
    pub screen: String,
    /// Session the screen targets, when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            screen: entry.screen.to_string(),
            session_id: entry.session_id,
        }
    }
}
