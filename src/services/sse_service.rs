//! Subscription broadcaster: room snapshot streams over SSE.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::{game::GameSnapshot, sse::ServerEvent},
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

/// Subscribe to a room's snapshot stream.
///
/// Fails with `RoomNotFound` for rooms that were never created — subscribing
/// must not create sessions. The room lock is held while the broadcast
/// cursor and the initial snapshot are taken together, so the snapshot a
/// late subscriber receives on connect is never older than the first
/// broadcast it observes afterwards.
pub async fn subscribe(
    state: &SharedState,
    code: &str,
) -> Result<(broadcast::Receiver<ServerEvent>, GameSnapshot), ServiceError> {
    let room = state
        .existing_room(code)
        .ok_or_else(|| ServiceError::RoomNotFound(code.to_owned()))?;

    let session = room.session().lock().await;
    let receiver = room.hub().subscribe();
    Ok((receiver, GameSnapshot::from(&*session)))
}

/// Convert a broadcast receiver into an SSE response, delivering the initial
/// snapshot first and forwarding subsequent events until the client
/// disconnects.
pub fn to_sse_stream(
    room_code: String,
    initial: GameSnapshot,
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: pushes the initial snapshot, then relays broadcasts
    tokio::spawn(async move {
        if let Ok(payload) = sse_events::session_event(&initial) {
            if tx.send(Ok(to_axum_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_axum_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // A lagging client misses intermediate snapshots
                            // but the next delivered one is always newer.
                            tracing::debug!(room = %room_code, skipped, "SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!(room = %room_code, "SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops it
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_axum_event(payload: ServerEvent) -> Event {
    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::game::{JoinTeamRequest, PlayerInput},
        services::session_service,
        state::{AppState, game::TeamId},
    };

    #[tokio::test]
    async fn subscribe_requires_an_existing_room() {
        let state = AppState::new(AppConfig::default());
        let err = subscribe(&state, "nowhere").await.unwrap_err();
        assert!(matches!(err, ServiceError::RoomNotFound(_)));
    }

    #[tokio::test]
    async fn subscriber_gets_current_snapshot_then_ordered_updates() {
        let state = AppState::new(AppConfig::default());
        session_service::get_or_create(&state, "lobby").await.unwrap();

        let (mut receiver, initial) = subscribe(&state, "lobby").await.unwrap();
        assert_eq!(initial.version, 0);

        session_service::join_team(
            &state,
            "lobby",
            JoinTeamRequest {
                player: PlayerInput {
                    id: "a".into(),
                    name: "Ana".into(),
                    emoji: "🐙".into(),
                },
                team: TeamId::SplatSquad,
            },
        )
        .await
        .unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("session.snapshot"));
        let value: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert!(value["version"].as_u64().unwrap() > initial.version);
        assert_eq!(value["teams"]["splatSquad"]["players"][0]["id"], "a");
    }
}
