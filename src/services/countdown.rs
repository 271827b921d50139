//! Countdown/win evaluator.
//!
//! A single background task polls every room at a fixed cadence and finishes
//! matches whose deadline has passed, comparing held zone counts to pick the
//! winner (draw on equality). Polling tolerates restarts and clock skew
//! better than per-session one-shot timers, and the transition itself is
//! idempotent: the status is re-checked under the room lock, so a sweep win
//! that lands just before the tick takes precedence and repeated ticks are
//! no-ops.

use std::time::{Duration, SystemTime};

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::{
    dto::{
        game::GameSnapshot,
        sse::{FinishCause, SessionFinished},
    },
    services::sse_events,
    state::SharedState,
};

/// Cadence of the deadline sweep.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Run the evaluator until the process shuts down.
pub async fn run(state: SharedState) {
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        sweep_expired(&state, SystemTime::now()).await;
    }
}

/// Finish every playing session whose deadline is at or before `now`.
/// Returns the number of sessions transitioned.
pub async fn sweep_expired(state: &SharedState, now: SystemTime) -> usize {
    let mut finished = 0;

    for (code, room) in state.rooms() {
        let mut session = room.session().lock().await;
        if !session.finish_if_expired(now) {
            continue;
        }
        finished += 1;

        // Winner is always set by finish_if_expired.
        let Some(winner) = session.winner else {
            continue;
        };

        info!(room = %code, winner = ?winner, "match deadline reached; session finished");

        let snapshot = GameSnapshot::from(&*session);
        sse_events::broadcast_session(room.hub(), &snapshot);
        sse_events::broadcast_finished(
            room.hub(),
            &SessionFinished {
                winner: winner.into(),
                cause: FinishCause::Timeout,
            },
        );
    }

    finished
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::game::WinnerDto,
        state::{
            AppState,
            game::{Player, TeamId},
        },
    };

    fn player(id: &str) -> Player {
        Player {
            id: id.to_owned(),
            name: id.to_owned(),
            emoji: "🏁".to_owned(),
        }
    }

    /// Start a two-player match in the given room with `start` as kickoff.
    async fn start_match(state: &SharedState, code: &str, start: SystemTime) {
        let room = state.room(code);
        let mut session = room.session().lock().await;
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::InkMasters).unwrap();
        session.toggle_ready("a", start).unwrap();
        session.toggle_ready("b", start).unwrap();
    }

    #[tokio::test]
    async fn expired_sessions_finish_with_zone_majority_winner() {
        let state = AppState::new(AppConfig::default());
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        start_match(&state, "lobby", start).await;

        {
            let room = state.room("lobby");
            let mut session = room.session().lock().await;
            session.capture_zone("a", "zone-a", start).unwrap();
        }

        let deadline = start + Duration::from_secs(15 * 60);
        assert_eq!(sweep_expired(&state, deadline).await, 1);

        let room = state.room("lobby");
        let session = room.session().lock().await;
        assert_eq!(
            WinnerDto::from(session.winner.unwrap()),
            WinnerDto::SplatSquad
        );
    }

    #[tokio::test]
    async fn even_zone_split_finishes_as_draw() {
        let state = AppState::new(AppConfig::default());
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        start_match(&state, "lobby", start).await;

        {
            let room = state.room("lobby");
            let mut session = room.session().lock().await;
            session.capture_zone("a", "zone-a", start).unwrap();
            session.capture_zone("b", "zone-b", start).unwrap();
        }

        let deadline = start + Duration::from_secs(15 * 60);
        assert_eq!(sweep_expired(&state, deadline).await, 1);

        let room = state.room("lobby");
        let session = room.session().lock().await;
        assert_eq!(WinnerDto::from(session.winner.unwrap()), WinnerDto::Draw);
    }

    #[tokio::test]
    async fn sweep_leaves_running_and_settled_sessions_alone() {
        let state = AppState::new(AppConfig::default());
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        start_match(&state, "lobby", start).await;

        // Before the deadline: nothing to do.
        assert_eq!(sweep_expired(&state, start + Duration::from_secs(60)).await, 0);

        let deadline = start + Duration::from_secs(15 * 60);
        assert_eq!(sweep_expired(&state, deadline).await, 1);

        // Repeated ticks against the finished session are no-ops.
        assert_eq!(sweep_expired(&state, deadline + Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn setup_rooms_are_never_finished() {
        let state = AppState::new(AppConfig::default());
        state.room("idle-room");

        let far_future = SystemTime::UNIX_EPOCH + Duration::from_secs(4_000_000_000);
        assert_eq!(sweep_expired(&state, far_future).await, 0);
    }
}
