//! Server-Sent Events payload construction and broadcasting helpers.

use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        game::GameSnapshot,
        sse::{CaptureNotice, ServerEvent, SessionFinished},
    },
    state::SseHub,
};

const EVENT_SESSION: &str = "session.snapshot";
const EVENT_CAPTURE: &str = "zone.captured";
const EVENT_FINISHED: &str = "session.finished";

/// Build the snapshot event sent to a subscriber on connect.
pub fn session_event(snapshot: &GameSnapshot) -> serde_json::Result<ServerEvent> {
    ServerEvent::json(Some(EVENT_SESSION.to_string()), snapshot)
}

/// Broadcast the post-mutation session snapshot to the room's subscribers.
pub fn broadcast_session(hub: &SseHub, snapshot: &GameSnapshot) {
    send_event(hub, EVENT_SESSION, snapshot);
}

/// Broadcast a zone ownership change.
pub fn broadcast_capture(hub: &SseHub, notice: &CaptureNotice) {
    send_event(hub, EVENT_CAPTURE, notice);
}

/// Broadcast that the session reached `finished`.
pub fn broadcast_finished(hub: &SseHub, finished: &SessionFinished) {
    send_event(hub, EVENT_FINISHED, finished);
}

fn send_event(hub: &SseHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
