//! Session store & mutator: applies room commands under the per-room lock.
//!
//! Each function locks the target room, applies one command, and broadcasts
//! the post-mutation snapshot while still holding the lock, which is what
//! gives subscribers the per-room total order. Informational no-ops
//! (rejoining the same team, re-scanning an owned zone) skip the broadcast
//! since nothing changed.

use std::{sync::Arc, time::SystemTime};

use tracing::info;

use crate::{
    dto::{
        game::{
            CaptureEventRecord, CaptureResponse, CaptureZoneRequest, GameSnapshot, JoinResponse,
            JoinTeamRequest, SelectColorRequest, ToggleReadyRequest, VoteRequest,
        },
        sse::{CaptureNotice, FinishCause, SessionFinished},
        validation::validate_room_code,
    },
    error::ServiceError,
    services::sse_events,
    state::{Room, SharedState, game::{GameDuration, Player}},
};

/// Fetch (or lazily create) the room for `code`, rejecting malformed codes.
fn checked_room(state: &SharedState, code: &str) -> Result<Arc<Room>, ServiceError> {
    validate_room_code(code)
        .map_err(|_| ServiceError::InvalidInput(format!("invalid room code `{code}`")))?;
    Ok(state.room(code))
}

/// Return the session snapshot, creating a default session on first access.
pub async fn get_or_create(state: &SharedState, code: &str) -> Result<GameSnapshot, ServiceError> {
    let room = checked_room(state, code)?;
    let session = room.session().lock().await;
    Ok(GameSnapshot::from(&*session))
}

/// Put the player on the requested team.
pub async fn join_team(
    state: &SharedState,
    code: &str,
    request: JoinTeamRequest,
) -> Result<JoinResponse, ServiceError> {
    let room = checked_room(state, code)?;
    let mut session = room.session().lock().await;

    let player = Player {
        id: request.player.id,
        name: request.player.name,
        emoji: request.player.emoji,
    };
    let outcome = session.join_team(player, request.team)?;

    let snapshot = GameSnapshot::from(&*session);
    if !outcome.already_member {
        sse_events::broadcast_session(room.hub(), &snapshot);
    }

    Ok(JoinResponse {
        already_member: outcome.already_member,
        session: snapshot,
    })
}

/// Set a team's color from the configured palette.
pub async fn select_color(
    state: &SharedState,
    code: &str,
    request: SelectColorRequest,
) -> Result<GameSnapshot, ServiceError> {
    if !state.config().is_palette_color(&request.color) {
        return Err(ServiceError::InvalidInput(format!(
            "color `{}` is not in the team palette",
            request.color
        )));
    }

    let room = checked_room(state, code)?;
    let mut session = room.session().lock().await;

    session.select_color(&request.player_id, request.team, &request.color)?;

    let snapshot = GameSnapshot::from(&*session);
    sse_events::broadcast_session(room.hub(), &snapshot);
    Ok(snapshot)
}

/// Cast the player's duration vote.
pub async fn vote(
    state: &SharedState,
    code: &str,
    request: VoteRequest,
) -> Result<GameSnapshot, ServiceError> {
    let Some(duration) = GameDuration::from_minutes(request.duration) else {
        return Err(ServiceError::InvalidInput(format!(
            "unsupported duration `{}`: expected 15 or 30",
            request.duration
        )));
    };

    let room = checked_room(state, code)?;
    let mut session = room.session().lock().await;

    session.vote(&request.player_id, duration)?;

    let snapshot = GameSnapshot::from(&*session);
    sse_events::broadcast_session(room.hub(), &snapshot);
    Ok(snapshot)
}

/// Toggle the player's readiness; may start the match.
pub async fn toggle_ready(
    state: &SharedState,
    code: &str,
    request: ToggleReadyRequest,
) -> Result<GameSnapshot, ServiceError> {
    let room = checked_room(state, code)?;
    let mut session = room.session().lock().await;

    let outcome = session.toggle_ready(&request.player_id, SystemTime::now())?;

    let snapshot = GameSnapshot::from(&*session);
    sse_events::broadcast_session(room.hub(), &snapshot);

    if outcome.started {
        info!(
            room = code,
            duration = session.duration.minutes(),
            "all rostered players ready; match started"
        );
    }

    Ok(snapshot)
}

/// Capture a zone for the acting player's team.
pub async fn capture_zone(
    state: &SharedState,
    code: &str,
    request: CaptureZoneRequest,
) -> Result<CaptureResponse, ServiceError> {
    let room = checked_room(state, code)?;
    let mut session = room.session().lock().await;

    let outcome = session.capture_zone(&request.player_id, &request.zone, SystemTime::now())?;

    let snapshot = GameSnapshot::from(&*session);
    if !outcome.already_owned {
        sse_events::broadcast_session(room.hub(), &snapshot);
        sse_events::broadcast_capture(
            room.hub(),
            &CaptureNotice {
                zone_id: outcome.zone_id.clone(),
                team_id: outcome.team,
                player_id: request.player_id.clone(),
                recapture: outcome.recapture,
            },
        );
    }

    if outcome.swept {
        info!(room = code, team = ?outcome.team, "all zones captured; session finished");
        sse_events::broadcast_finished(
            room.hub(),
            &SessionFinished {
                winner: outcome.team.into(),
                cause: FinishCause::Sweep,
            },
        );
    }

    Ok(CaptureResponse {
        already_owned: outcome.already_owned,
        recapture: outcome.recapture,
        session: snapshot,
    })
}

/// Reinitialize the room's session to defaults. Idempotent.
pub async fn reset(state: &SharedState, code: &str) -> Result<GameSnapshot, ServiceError> {
    let room = checked_room(state, code)?;
    let mut session = room.session().lock().await;

    session.reset(state.config().zone_count());
    info!(room = code, "session reset");

    let snapshot = GameSnapshot::from(&*session);
    sse_events::broadcast_session(room.hub(), &snapshot);
    Ok(snapshot)
}

/// Query the room's capture audit log. Does not create rooms.
pub async fn capture_log(
    state: &SharedState,
    code: &str,
) -> Result<Vec<CaptureEventRecord>, ServiceError> {
    let room = state
        .existing_room(code)
        .ok_or_else(|| ServiceError::RoomNotFound(code.to_owned()))?;
    let session = room.session().lock().await;
    Ok(session.capture_log.iter().map(Into::into).collect())
}
