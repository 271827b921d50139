use serde::Serialize;
use utoipa::ToSchema;

use crate::{dto::game::WinnerDto, state::game::TeamId};

#[derive(Clone, Debug)]
/// Dispatched payload carried across a room's SSE channel.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast alongside the snapshot when a zone changes hands, so clients
/// can render per-capture feedback without diffing snapshots.
pub struct CaptureNotice {
    /// Zone that changed hands.
    pub zone_id: String,
    /// Team that took the zone.
    pub team_id: TeamId,
    /// Player that scanned the zone.
    pub player_id: String,
    /// Whether the zone was taken from the other team.
    pub recapture: bool,
}

/// Why a session transitioned to `finished`.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinishCause {
    /// One team captured every zone.
    Sweep,
    /// The match deadline expired.
    Timeout,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast when a session reaches `finished`.
pub struct SessionFinished {
    /// Match outcome.
    pub winner: WinnerDto,
    /// What ended the match.
    pub cause: FinishCause,
}
