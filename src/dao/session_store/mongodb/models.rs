use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::models::{AssignmentEntity, PredefinedSeats, SessionEntity};

/// Session document embedding its assignments so that a seat claim is a
/// single-document conditional update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSessionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub total_seats: u32,
    pub created_at: DateTime,
    /// Stored as an array: participant names are user-supplied and may
    /// contain characters that are invalid as BSON map keys.
    #[serde(default)]
    pub predefined_seats: Vec<PredefinedSeatDocument>,
    #[serde(default)]
    pub assignments: Vec<MongoAssignmentDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredefinedSeatDocument {
    pub name: String,
    pub seat: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAssignmentDocument {
    pub id: String,
    pub name: String,
    pub name_key: String,
    pub seat: u32,
    pub drawn_at: DateTime,
}

/// Singleton settings document carrying the global forced assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettingsDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub predefined_seats: Vec<PredefinedSeatDocument>,
}

pub fn predefined_to_documents(seats: &PredefinedSeats) -> Vec<PredefinedSeatDocument> {
    seats
        .iter()
        .map(|(name, seat)| PredefinedSeatDocument {
            name: name.clone(),
            seat: u32::from(*seat),
        })
        .collect()
}

pub fn predefined_from_documents(documents: Vec<PredefinedSeatDocument>) -> PredefinedSeats {
    documents
        .into_iter()
        .map(|entry| (entry.name, entry.seat as u16))
        .collect()
}

impl From<&SessionEntity> for MongoSessionDocument {
    fn from(value: &SessionEntity) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            total_seats: u32::from(value.total_seats),
            created_at: DateTime::from_system_time(value.created_at),
            predefined_seats: predefined_to_documents(&value.predefined_seats),
            assignments: Vec::new(),
        }
    }
}

impl From<MongoSessionDocument> for SessionEntity {
    fn from(value: MongoSessionDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            total_seats: value.total_seats as u16,
            created_at: value.created_at.to_system_time(),
            predefined_seats: predefined_from_documents(value.predefined_seats),
        }
    }
}

impl From<&AssignmentEntity> for MongoAssignmentDocument {
    fn from(value: &AssignmentEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
            name_key: value.name_key.clone(),
            seat: u32::from(value.seat),
            drawn_at: DateTime::from_system_time(value.drawn_at),
        }
    }
}

impl MongoAssignmentDocument {
    /// Map the document back to an entity, reporting malformed identifiers.
    pub fn into_entity(self, session_id: &str) -> Result<AssignmentEntity, MongoDaoError> {
        let id = Uuid::parse_str(&self.id).map_err(|err| MongoDaoError::MalformedAssignment {
            id: session_id.to_owned(),
            message: format!("invalid assignment id `{}`: {err}", self.id),
        })?;

        Ok(AssignmentEntity {
            id,
            name: self.name,
            name_key: self.name_key,
            seat: self.seat as u16,
            drawn_at: self.drawn_at.to_system_time(),
        })
    }
}
