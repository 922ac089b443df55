use std::{
    collections::BTreeMap,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{AssignmentEntity, PredefinedSeats, SessionEntity};

/// Database path of a session node.
pub fn session_path(id: &str) -> String {
    format!("sessions/{id}")
}

/// Database path of a session's assignment collection.
pub fn assignments_path(id: &str) -> String {
    format!("sessions/{id}/assignments")
}

/// Database path of the global forced assignments node.
pub const GLOBAL_PREDEFINED_PATH: &str = "globalSettings/predefinedSeats";

/// Session node as stored under `sessions/{id}`. Field names mirror the
/// camelCase layout the web frontends read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseSessionDocument {
    pub name: String,
    pub total_seats: u16,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Stored as a list: participant names are user-supplied and may contain
    /// characters that are invalid in database keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predefined_seats: Vec<FirebasePredefinedSeat>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub assignments: BTreeMap<String, FirebaseAssignmentDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebasePredefinedSeat {
    pub name: String,
    pub seat: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseAssignmentDocument {
    pub name: String,
    pub name_key: String,
    pub seat: u16,
    /// Milliseconds since the Unix epoch.
    pub drawn_at: u64,
}

pub fn millis_since_epoch(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub fn time_from_millis(millis: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(millis)
}

pub fn predefined_to_list(seats: &PredefinedSeats) -> Vec<FirebasePredefinedSeat> {
    seats
        .iter()
        .map(|(name, seat)| FirebasePredefinedSeat {
            name: name.clone(),
            seat: *seat,
        })
        .collect()
}

pub fn predefined_from_list(entries: Vec<FirebasePredefinedSeat>) -> PredefinedSeats {
    entries
        .into_iter()
        .map(|entry| (entry.name, entry.seat))
        .collect()
}

impl From<&SessionEntity> for FirebaseSessionDocument {
    fn from(value: &SessionEntity) -> Self {
        Self {
            name: value.name.clone(),
            total_seats: value.total_seats,
            created_at: millis_since_epoch(value.created_at),
            predefined_seats: predefined_to_list(&value.predefined_seats),
            assignments: BTreeMap::new(),
        }
    }
}

impl FirebaseSessionDocument {
    /// Map the node back to an entity for the given identifier.
    pub fn into_entity(self, id: &str) -> SessionEntity {
        SessionEntity {
            id: id.to_owned(),
            name: self.name,
            total_seats: self.total_seats,
            created_at: time_from_millis(self.created_at),
            predefined_seats: predefined_from_list(self.predefined_seats),
        }
    }
}

impl From<&AssignmentEntity> for FirebaseAssignmentDocument {
    fn from(value: &AssignmentEntity) -> Self {
        Self {
            name: value.name.clone(),
            name_key: value.name_key.clone(),
            seat: value.seat,
            drawn_at: millis_since_epoch(value.drawn_at),
        }
    }
}

/// Rebuild assignment entities from the keyed node map. Keys are the
/// assignment identifiers chosen at claim time.
pub fn assignments_from_map(
    map: BTreeMap<String, FirebaseAssignmentDocument>,
) -> Vec<AssignmentEntity> {
    let mut assignments: Vec<AssignmentEntity> = map
        .into_iter()
        .map(|(key, document)| AssignmentEntity {
            id: Uuid::parse_str(&key).unwrap_or_else(|_| Uuid::new_v4()),
            name: document.name,
            name_key: document.name_key,
            seat: document.seat,
            drawn_at: time_from_millis(document.drawn_at),
        })
        .collect();

    assignments.sort_by_key(|assignment| assignment.drawn_at);
    assignments
}
