use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    error::ServiceError,
    services::session_service,
    state::SharedState,
};

/// Subscribe to a session's mirror stream, verifying the session exists.
pub async fn subscribe(
    state: &SharedState,
    session_id: &str,
) -> Result<broadcast::Receiver<ServerEvent>, ServiceError> {
    session_service::ensure_session_id(session_id)?;
    let store = state.require_session_store().await?;
    if store.find_session(session_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    }

    Ok(state.streams().hub(session_id).subscribe())
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    state: SharedState,
    session_id: String,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive.
                            continue;
                        }
                    }
                }
            }
        }

        // Own the shared state inside the spawned task so the hub can be
        // pruned even if the request context has already dropped.
        drop(receiver);
        state.streams().release(&session_id);
        tracing::info!(%session_id, "session SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Send the initial handshake onto a session's stream.
pub async fn broadcast_handshake(state: &SharedState, session_id: &str) {
    let payload = Handshake {
        session_id: session_id.to_owned(),
        message: "session stream connected".to_owned(),
        degraded: state.is_degraded().await,
    };

    if let Ok(event) = ServerEvent::json("handshake".to_string(), &payload) {
        state.streams().hub(session_id).broadcast(event);
    }
}
