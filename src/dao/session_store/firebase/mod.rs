mod config;
mod error;
mod models;
mod store;

pub use config::FirebaseConfig;
pub use error::FirebaseDaoError;
pub use store::FirebaseSessionStore;

use crate::dao::storage::StorageError;

impl From<FirebaseDaoError> for StorageError {
    fn from(err: FirebaseDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
