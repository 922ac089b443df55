use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{
    Client, Collection, Database,
    bson::{doc, to_bson},
    error::{ErrorKind, WriteFailure},
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        GlobalSettingsDocument, MongoAssignmentDocument, MongoSessionDocument,
        predefined_from_documents, predefined_to_documents,
    },
};
use crate::dao::{
    models::{AssignmentEntity, PredefinedSeats, SessionEntity},
    session_store::SessionStore,
    storage::{ClaimOutcome, StorageResult},
};

const SESSION_COLLECTION_NAME: &str = "sessions";
const SETTINGS_COLLECTION_NAME: &str = "settings";
const GLOBAL_SETTINGS_DOC_ID: &str = "global_predefined_seats";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoSessionStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoSessionStore {
    /// Establish a connection to MongoDB.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        Ok(Self { inner })
    }

    async fn sessions(&self) -> Collection<MongoSessionDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoSessionDocument>(SESSION_COLLECTION_NAME)
    }

    async fn settings(&self) -> Collection<GlobalSettingsDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<GlobalSettingsDocument>(SETTINGS_COLLECTION_NAME)
    }

    async fn create_session(&self, session: SessionEntity) -> MongoResult<bool> {
        let document = MongoSessionDocument::from(&session);
        let collection = self.sessions().await;

        match collection.insert_one(&document).await {
            Ok(_) => Ok(true),
            Err(err) => {
                // A duplicate `_id` means the generated identifier collided;
                // the caller retries with a fresh one.
                if let ErrorKind::Write(WriteFailure::WriteError(ref write_error)) = *err.kind {
                    if write_error.code == DUPLICATE_KEY_CODE {
                        return Ok(false);
                    }
                }
                Err(MongoDaoError::CreateSession {
                    id: session.id,
                    source: err,
                })
            }
        }
    }

    async fn find_document(&self, id: &str) -> MongoResult<Option<MongoSessionDocument>> {
        let collection = self.sessions().await;
        collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|source| MongoDaoError::LoadSession {
                id: id.to_owned(),
                source,
            })
    }

    async fn find_session(&self, id: &str) -> MongoResult<Option<SessionEntity>> {
        Ok(self.find_document(id).await?.map(Into::into))
    }

    async fn list_assignments(&self, session_id: &str) -> MongoResult<Vec<AssignmentEntity>> {
        let Some(document) = self.find_document(session_id).await? else {
            return Ok(Vec::new());
        };

        document
            .assignments
            .into_iter()
            .map(|assignment| assignment.into_entity(session_id))
            .collect()
    }

    /// Conditional append: the filter only matches when neither the seat nor
    /// the case-folded name appears in the embedded assignment list, so the
    /// whole claim is one atomic document update.
    async fn claim_seat(
        &self,
        session_id: &str,
        assignment: AssignmentEntity,
    ) -> MongoResult<ClaimOutcome> {
        let document = MongoAssignmentDocument::from(&assignment);
        let payload = to_bson(&document).map_err(|source| MongoDaoError::EncodeAssignment {
            id: session_id.to_owned(),
            source,
        })?;

        let filter = doc! {
            "_id": session_id,
            "assignments.seat": { "$ne": document.seat },
            "assignments.name_key": { "$ne": document.name_key.clone() },
        };
        let update = doc! { "$push": { "assignments": payload } };

        let collection = self.sessions().await;
        let result = collection.update_one(filter, update).await.map_err(|source| {
            MongoDaoError::ClaimSeat {
                id: session_id.to_owned(),
                source,
            }
        })?;

        if result.modified_count == 1 {
            return Ok(ClaimOutcome::Claimed);
        }

        // The guarded update did not match; re-read to tell the caller why.
        let Some(current) = self.find_document(session_id).await? else {
            return Ok(ClaimOutcome::SessionMissing);
        };

        if current
            .assignments
            .iter()
            .any(|existing| existing.name_key == document.name_key)
        {
            Ok(ClaimOutcome::NameTaken)
        } else {
            Ok(ClaimOutcome::SeatTaken)
        }
    }

    async fn set_predefined_seats(
        &self,
        session_id: &str,
        seats: PredefinedSeats,
    ) -> MongoResult<bool> {
        let documents = predefined_to_documents(&seats);
        let payload =
            to_bson(&documents).map_err(|source| MongoDaoError::EncodePredefined {
                id: session_id.to_owned(),
                source,
            })?;

        let collection = self.sessions().await;
        let result = collection
            .update_one(
                doc! { "_id": session_id },
                doc! { "$set": { "predefined_seats": payload } },
            )
            .await
            .map_err(|source| MongoDaoError::UpdatePredefined {
                id: session_id.to_owned(),
                source,
            })?;

        Ok(result.matched_count == 1)
    }

    async fn global_predefined_seats(&self) -> MongoResult<PredefinedSeats> {
        let collection = self.settings().await;
        let document = collection
            .find_one(doc! { "_id": GLOBAL_SETTINGS_DOC_ID })
            .await
            .map_err(|source| MongoDaoError::GlobalSettings { source })?;

        Ok(document
            .map(|settings| predefined_from_documents(settings.predefined_seats))
            .unwrap_or_default())
    }

    async fn set_global_predefined_seats(&self, seats: PredefinedSeats) -> MongoResult<()> {
        let document = GlobalSettingsDocument {
            id: GLOBAL_SETTINGS_DOC_ID.to_owned(),
            predefined_seats: predefined_to_documents(&seats),
        };

        let collection = self.settings().await;
        collection
            .replace_one(doc! { "_id": GLOBAL_SETTINGS_DOC_ID }, &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::GlobalSettings { source })?;

        Ok(())
    }

    async fn clear_global_predefined_seats(&self) -> MongoResult<()> {
        let collection = self.settings().await;
        collection
            .delete_one(doc! { "_id": GLOBAL_SETTINGS_DOC_ID })
            .await
            .map_err(|source| MongoDaoError::GlobalSettings { source })?;

        Ok(())
    }
}

impl SessionStore for MongoSessionStore {
    fn create_session(&self, session: SessionEntity) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.create_session(session).await.map_err(Into::into) })
    }

    fn find_session(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { store.find_session(&id).await.map_err(Into::into) })
    }

    fn list_assignments(
        &self,
        session_id: &str,
    ) -> BoxFuture<'static, StorageResult<Vec<AssignmentEntity>>> {
        let store = self.clone();
        let session_id = session_id.to_owned();
        Box::pin(async move { store.list_assignments(&session_id).await.map_err(Into::into) })
    }

    fn claim_seat(
        &self,
        session_id: &str,
        assignment: AssignmentEntity,
    ) -> BoxFuture<'static, StorageResult<ClaimOutcome>> {
        let store = self.clone();
        let session_id = session_id.to_owned();
        Box::pin(async move {
            store
                .claim_seat(&session_id, assignment)
                .await
                .map_err(Into::into)
        })
    }

    fn set_predefined_seats(
        &self,
        session_id: &str,
        seats: PredefinedSeats,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let session_id = session_id.to_owned();
        Box::pin(async move {
            store
                .set_predefined_seats(&session_id, seats)
                .await
                .map_err(Into::into)
        })
    }

    fn global_predefined_seats(&self) -> BoxFuture<'static, StorageResult<PredefinedSeats>> {
        let store = self.clone();
        Box::pin(async move { store.global_predefined_seats().await.map_err(Into::into) })
    }

    fn set_global_predefined_seats(
        &self,
        seats: PredefinedSeats,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .set_global_predefined_seats(seats)
                .await
                .map_err(Into::into)
        })
    }

    fn clear_global_predefined_seats(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .clear_global_predefined_seats()
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
