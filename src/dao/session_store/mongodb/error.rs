//! Error types shared by the MongoDB storage implementation.

use thiserror::Error;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection string could not be parsed.
    #[error("invalid MongoDB URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// The client could not be constructed from the parsed options.
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        #[source]
        source: mongodb::error::Error,
    },
    /// The initial connectivity ping never succeeded.
    #[error("MongoDB did not answer the initial ping after {attempts} attempts")]
    InitialPing {
        attempts: u32,
        #[source]
        source: mongodb::error::Error,
    },
    /// Inserting a new session document failed.
    #[error("failed to create session `{id}`")]
    CreateSession {
        id: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// Reading a session document failed.
    #[error("failed to load session `{id}`")]
    LoadSession {
        id: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// The conditional assignment append failed.
    #[error("failed to claim seat in session `{id}`")]
    ClaimSeat {
        id: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// Updating the per-session forced assignments failed.
    #[error("failed to update predefined seats for session `{id}`")]
    UpdatePredefined {
        id: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// Reading or writing the global settings document failed.
    #[error("failed to access global settings")]
    GlobalSettings {
        #[source]
        source: mongodb::error::Error,
    },
    /// Serializing an assignment into BSON failed.
    #[error("failed to encode assignment for session `{id}`")]
    EncodeAssignment {
        id: String,
        #[source]
        source: mongodb::bson::ser::Error,
    },
    /// Serializing a predefined-seat mapping into BSON failed.
    #[error("failed to encode predefined seats for session `{id}`")]
    EncodePredefined {
        id: String,
        #[source]
        source: mongodb::bson::ser::Error,
    },
    /// A stored assignment could not be mapped back to an entity.
    #[error("malformed assignment document in session `{id}`: {message}")]
    MalformedAssignment { id: String, message: String },
    /// The health-check ping failed.
    #[error("MongoDB health ping failed")]
    HealthPing {
        #[source]
        source: mongodb::error::Error,
    },
}
