use std::{collections::BTreeMap, sync::Arc};

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};

use super::{
    config::FirebaseConfig,
    error::{FirebaseDaoError, FirebaseResult},
    models::{
        FirebaseAssignmentDocument, FirebasePredefinedSeat, FirebaseSessionDocument,
        GLOBAL_PREDEFINED_PATH, assignments_from_map, assignments_path, predefined_from_list,
        predefined_to_list, session_path,
    },
};
use crate::dao::{
    models::{AssignmentEntity, PredefinedSeats, SessionEntity},
    session_store::SessionStore,
    storage::{ClaimOutcome, StorageResult},
};

/// Header requesting an ETag for the target node.
const ETAG_REQUEST_HEADER: &str = "X-Firebase-ETag";
/// Header carrying the expected ETag on conditional writes.
const ETAG_MATCH_HEADER: &str = "if-match";

/// Session store backed by the Firebase Realtime Database REST API.
///
/// Seat claims use the database's ETag support: the assignment collection is
/// fetched together with its ETag and written back with `if-match`, so a
/// concurrent claim surfaces as a 412 instead of a silent lost update.
#[derive(Clone)]
pub struct FirebaseSessionStore {
    client: Client,
    base_url: Arc<str>,
    auth_token: Option<Arc<str>>,
}

impl FirebaseSessionStore {
    /// Build the HTTP client and verify the database answers.
    pub async fn connect(config: FirebaseConfig) -> FirebaseResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| FirebaseDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            auth_token: config.auth_token.map(Arc::<str>::from),
        };

        store.ping().await?;
        Ok(store)
    }

    fn url(&self, path: &str) -> String {
        match &self.auth_token {
            Some(token) => format!("{}/{path}.json?auth={token}", self.base_url),
            None => format!("{}/{path}.json", self.base_url),
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn ping(&self) -> FirebaseResult<()> {
        let path = "sessions";
        let response = self
            .request(Method::GET, path)
            .query(&[("shallow", "true")])
            .send()
            .await
            .map_err(|source| FirebaseDaoError::RequestSend {
                path: path.to_owned(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(FirebaseDaoError::RequestStatus {
                path: path.to_owned(),
                status: response.status(),
            })
        }
    }

    /// GET a node, treating both a 404 and a JSON `null` body as absent.
    async fn get_node<T>(&self, path: &str) -> FirebaseResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.request(Method::GET, path).send().await.map_err(|source| {
            FirebaseDaoError::RequestSend {
                path: path.to_owned(),
                source,
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<Option<T>>()
                .await
                .map_err(|source| FirebaseDaoError::DecodeResponse {
                    path: path.to_owned(),
                    source,
                }),
            status => Err(FirebaseDaoError::RequestStatus {
                path: path.to_owned(),
                status,
            }),
        }
    }

    /// GET a node together with its ETag for a later conditional write.
    async fn get_node_with_etag<T>(&self, path: &str) -> FirebaseResult<(Option<T>, String)>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, path)
            .header(ETAG_REQUEST_HEADER, "true")
            .send()
            .await
            .map_err(|source| FirebaseDaoError::RequestSend {
                path: path.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FirebaseDaoError::RequestStatus {
                path: path.to_owned(),
                status,
            });
        }

        let etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| FirebaseDaoError::MissingEtag {
                path: path.to_owned(),
            })?;

        let body = response
            .json::<Option<T>>()
            .await
            .map_err(|source| FirebaseDaoError::DecodeResponse {
                path: path.to_owned(),
                source,
            })?;

        Ok((body, etag))
    }

    async fn put_node<T>(&self, path: &str, payload: &T) -> FirebaseResult<()>
    where
        T: Serialize,
    {
        let response = self
            .request(Method::PUT, path)
            .json(payload)
            .send()
            .await
            .map_err(|source| FirebaseDaoError::RequestSend {
                path: path.to_owned(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(FirebaseDaoError::RequestStatus {
                path: path.to_owned(),
                status: response.status(),
            })
        }
    }

    async fn delete_node(&self, path: &str) -> FirebaseResult<()> {
        let response = self.request(Method::DELETE, path).send().await.map_err(|source| {
            FirebaseDaoError::RequestSend {
                path: path.to_owned(),
                source,
            }
        })?;

        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(FirebaseDaoError::RequestStatus {
                path: path.to_owned(),
                status: response.status(),
            })
        }
    }

    async fn create_session(&self, session: SessionEntity) -> FirebaseResult<bool> {
        let path = session_path(&session.id);

        // Reserve the node with a conditional write against the "absent"
        // ETag so a colliding identifier is reported instead of overwritten.
        let (existing, etag) = self
            .get_node_with_etag::<FirebaseSessionDocument>(&path)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let document = FirebaseSessionDocument::from(&session);
        let response = self
            .request(Method::PUT, &path)
            .header(ETAG_MATCH_HEADER, etag)
            .json(&document)
            .send()
            .await
            .map_err(|source| FirebaseDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::PRECONDITION_FAILED => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(FirebaseDaoError::RequestStatus { path, status }),
        }
    }

    async fn find_session(&self, id: &str) -> FirebaseResult<Option<SessionEntity>> {
        let path = session_path(id);
        let document = self.get_node::<FirebaseSessionDocument>(&path).await?;
        Ok(document.map(|node| node.into_entity(id)))
    }

    async fn list_assignments(&self, session_id: &str) -> FirebaseResult<Vec<AssignmentEntity>> {
        let path = assignments_path(session_id);
        let map = self
            .get_node::<BTreeMap<String, FirebaseAssignmentDocument>>(&path)
            .await?
            .unwrap_or_default();
        Ok(assignments_from_map(map))
    }

    async fn claim_seat(
        &self,
        session_id: &str,
        assignment: AssignmentEntity,
    ) -> FirebaseResult<ClaimOutcome> {
        let path = assignments_path(session_id);
        let (current, etag) = self
            .get_node_with_etag::<BTreeMap<String, FirebaseAssignmentDocument>>(&path)
            .await?;
        let mut current = current.unwrap_or_default();

        if current.is_empty()
            && self
                .get_node::<FirebaseSessionDocument>(&session_path(session_id))
                .await?
                .is_none()
        {
            return Ok(ClaimOutcome::SessionMissing);
        }

        if let Some(outcome) = conflict_outcome(&current, &assignment) {
            return Ok(outcome);
        }

        current.insert(
            assignment.id.to_string(),
            FirebaseAssignmentDocument::from(&assignment),
        );

        let response = self
            .request(Method::PUT, &path)
            .header(ETAG_MATCH_HEADER, etag)
            .json(&current)
            .send()
            .await
            .map_err(|source| FirebaseDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::PRECONDITION_FAILED => {
                // Lost the race; re-read so the caller learns which
                // condition failed and can re-select a seat.
                let refreshed = self
                    .get_node::<BTreeMap<String, FirebaseAssignmentDocument>>(&path)
                    .await?
                    .unwrap_or_default();
                Ok(conflict_outcome(&refreshed, &assignment).unwrap_or(ClaimOutcome::SeatTaken))
            }
            status if status.is_success() => Ok(ClaimOutcome::Claimed),
            status => Err(FirebaseDaoError::RequestStatus { path, status }),
        }
    }

    async fn set_predefined_seats(
        &self,
        session_id: &str,
        seats: PredefinedSeats,
    ) -> FirebaseResult<bool> {
        if self.find_session(session_id).await?.is_none() {
            return Ok(false);
        }

        let path = format!("{}/predefinedSeats", session_path(session_id));
        self.put_node(&path, &predefined_to_list(&seats)).await?;
        Ok(true)
    }

    async fn global_predefined_seats(&self) -> FirebaseResult<PredefinedSeats> {
        let entries = self
            .get_node::<Vec<FirebasePredefinedSeat>>(GLOBAL_PREDEFINED_PATH)
            .await?
            .unwrap_or_default();
        Ok(predefined_from_list(entries))
    }

    async fn set_global_predefined_seats(&self, seats: PredefinedSeats) -> FirebaseResult<()> {
        self.put_node(GLOBAL_PREDEFINED_PATH, &predefined_to_list(&seats))
            .await
    }
}

/// Detect whether an assignment would collide with the current collection.
fn conflict_outcome(
    current: &BTreeMap<String, FirebaseAssignmentDocument>,
    candidate: &AssignmentEntity,
) -> Option<ClaimOutcome> {
    if current
        .values()
        .any(|existing| existing.name_key == candidate.name_key)
    {
        return Some(ClaimOutcome::NameTaken);
    }
    if current.values().any(|existing| existing.seat == candidate.seat) {
        return Some(ClaimOutcome::SeatTaken);
    }
    None
}

impl SessionStore for FirebaseSessionStore {
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
                .delete_node(GLOBAL_PREDEFINED_PATH)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        // The REST client is stateless; a successful ping is all a
        // "reconnect" amounts to.
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::AssignmentEntity;

    fn document(name: &str, seat: u16) -> FirebaseAssignmentDocument {
        FirebaseAssignmentDocument {
            name: name.to_owned(),
            name_key: name.to_uppercase(),
            seat,
            drawn_at: 0,
        }
    }

    fn candidate(name: &str, seat: u16) -> AssignmentEntity {
        AssignmentEntity::new(name.to_owned(), name.to_uppercase(), seat)
    }

    #[test]
    fn conflict_outcome_prefers_name_over_seat() {
        let mut current = BTreeMap::new();
        current.insert("a".to_owned(), document("alice", 3));

        assert_eq!(
            conflict_outcome(&current, &candidate("Alice", 3)),
            Some(ClaimOutcome::NameTaken)
        );
        assert_eq!(
            conflict_outcome(&current, &candidate("bob", 3)),
            Some(ClaimOutcome::SeatTaken)
        );
        assert_eq!(conflict_outcome(&current, &candidate("bob", 4)), None);
    }
}
