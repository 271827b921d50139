//! Mutation rules for [`GameSession`].
//!
//! Every command validates its preconditions against the current session and
//! either applies a transition or returns a typed [`CommandError`]. Callers
//! are expected to hold the room's lock, so each method can assume exclusive
//! access and never observes a half-applied state.

use std::time::SystemTime;

use thiserror::Error;
use uuid::Uuid;

use crate::state::game::{
    CaptureEvent, GameDuration, GameSession, GameStatus, Player, TeamId, Winner,
};

/// Validation failure raised by a session command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command is not valid for the session's current status.
    #[error("operation not allowed while the session is {status:?}")]
    InvalidState {
        /// Status the session was in when the command arrived.
        status: GameStatus,
    },
    /// A ready player tried to change team, color, or vote.
    #[error("player `{0}` is marked ready and cannot change their choices")]
    AlreadyReady(String),
    /// The command requires team membership the player does not have.
    #[error("player `{0}` is not on a team")]
    NotOnTeam(String),
    /// The player already cast a duration vote this session.
    #[error("player `{0}` has already voted")]
    AlreadyVoted(String),
    /// The other team already holds the requested color.
    #[error("color `{0}` is already taken by the other team")]
    ColorConflict(String),
    /// The referenced zone is not part of this session.
    #[error("zone `{0}` is not part of this session")]
    UnknownZone(String),
}

/// Result of a join command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The player was already on the requested team; nothing changed.
    pub already_member: bool,
}

/// Result of a ready toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyOutcome {
    /// Whether the player is ready after the toggle.
    pub ready: bool,
    /// Whether this toggle completed the all-ready gate and started the
    /// match.
    pub started: bool,
}

/// Result of a capture command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// Canonical id of the zone that was scanned.
    pub zone_id: String,
    /// Team the acting player belongs to.
    pub team: TeamId,
    /// The acting team already owned the zone; nothing changed.
    pub already_owned: bool,
    /// The zone was taken from the other team rather than from neutral.
    pub recapture: bool,
    /// This capture completed a sweep and finished the session.
    pub swept: bool,
}

impl GameSession {
    /// Put `player` on `team`'s roster, leaving the other roster if needed.
    ///
    /// Only valid during setup and while the player is not ready. Joining a
    /// team the player is already on is an informational no-op.
    pub fn join_team(
        &mut self,
        player: Player,
        team: TeamId,
    ) -> Result<JoinOutcome, CommandError> {
        self.ensure_status(GameStatus::Setup)?;
        self.ensure_not_ready(&player.id)?;

        if self.teams.get(team).has_player(&player.id) {
            return Ok(JoinOutcome {
                already_member: true,
            });
        }

        let rival = team.rival();
        self.teams
            .get_mut(rival)
            .players
            .retain(|p| p.id != player.id);
        self.teams.get_mut(team).players.push(player);
        self.bump_version();

        Ok(JoinOutcome {
            already_member: false,
        })
    }

    /// Set `team`'s color, rejecting the color currently held by the rival.
    pub fn select_color(
        &mut self,
        player_id: &str,
        team: TeamId,
        color: &str,
    ) -> Result<(), CommandError> {
        self.ensure_status(GameStatus::Setup)?;
        self.ensure_not_ready(player_id)?;

        let rival_color = &self.teams.get(team.rival()).color;
        if rival_color.eq_ignore_ascii_case(color) {
            return Err(CommandError::ColorConflict(color.to_owned()));
        }

        self.teams.get_mut(team).color = color.to_owned();
        self.bump_version();
        Ok(())
    }

    /// Cast the player's single duration vote.
    pub fn vote(
        &mut self,
        player_id: &str,
        duration: GameDuration,
    ) -> Result<(), CommandError> {
        self.ensure_status(GameStatus::Setup)?;
        self.ensure_not_ready(player_id)?;

        if self.votes.has_voted(player_id) {
            return Err(CommandError::AlreadyVoted(player_id.to_owned()));
        }

        self.votes.cast(player_id, duration);
        self.bump_version();
        Ok(())
    }

    /// Toggle the player's membership in the ready set.
    ///
    /// Readying up requires team membership; un-readying is always allowed.
    /// When the toggle leaves every rostered player ready (and at least one
    /// player is rostered) the match starts: the vote ledger decides the
    /// duration and `now` is stamped as the start time.
    pub fn toggle_ready(
        &mut self,
        player_id: &str,
        now: SystemTime,
    ) -> Result<ReadyOutcome, CommandError> {
        self.ensure_status(GameStatus::Setup)?;

        if let Some(position) = self.ready_players.iter().position(|id| id == player_id) {
            self.ready_players.remove(position);
            self.bump_version();
            return Ok(ReadyOutcome {
                ready: false,
                started: false,
            });
        }

        if self.teams.member_of(player_id).is_none() {
            return Err(CommandError::NotOnTeam(player_id.to_owned()));
        }

        self.ready_players.push(player_id.to_owned());

        let rostered: Vec<&str> = self
            .teams
            .rostered_players()
            .map(|p| p.id.as_str())
            .collect();
        let started =
            !rostered.is_empty() && rostered.iter().all(|id| self.is_ready(id));

        if started {
            self.duration = self.votes.winning_duration();
            self.status = GameStatus::Playing;
            self.started_at = Some(now);
        }

        self.bump_version();
        Ok(ReadyOutcome {
            ready: true,
            started,
        })
    }

    /// Capture the zone referenced by `zone_ref` (a zone id or a scan code)
    /// for the acting player's team.
    ///
    /// Re-scanning a zone the team already owns is an informational no-op.
    /// Taking the last zone held by anyone else finishes the session with an
    /// immediate sweep win.
    pub fn capture_zone(
        &mut self,
        player_id: &str,
        zone_ref: &str,
        now: SystemTime,
    ) -> Result<CaptureOutcome, CommandError> {
        self.ensure_status(GameStatus::Playing)?;

        let Some(team) = self.teams.member_of(player_id) else {
            return Err(CommandError::NotOnTeam(player_id.to_owned()));
        };

        let Some(index) = self
            .zones
            .iter()
            .position(|zone| zone.id == zone_ref || zone.scan_code == zone_ref)
        else {
            return Err(CommandError::UnknownZone(zone_ref.to_owned()));
        };

        let zone_id = self.zones[index].id.clone();
        let previous_owner = self.zones[index].captured_by;

        if previous_owner == Some(team) {
            return Ok(CaptureOutcome {
                zone_id,
                team,
                already_owned: true,
                recapture: false,
                swept: false,
            });
        }

        let recapture = previous_owner.is_some();

        let zone = &mut self.zones[index];
        zone.captured_by = Some(team);
        zone.captured_at = Some(now);

        self.capture_stats.total_captures.bump(team);
        if recapture {
            self.capture_stats.recaptures.bump(team);
        }

        self.capture_log.push(CaptureEvent {
            id: Uuid::new_v4(),
            zone_id: zone_id.clone(),
            team_id: team,
            player_id: player_id.to_owned(),
            timestamp: now,
            is_recapture: recapture,
        });

        let swept = self.zones.iter().all(|z| z.captured_by == Some(team));
        if swept {
            self.status = GameStatus::Finished;
            self.winner = Some(Winner::Team(team));
        }

        self.bump_version();
        Ok(CaptureOutcome {
            zone_id,
            team,
            already_owned: false,
            recapture,
            swept,
        })
    }

    /// Reinitialize the session to its default setup state.
    ///
    /// Rosters, votes, the ready set, capture stats, and the audit log are
    /// cleared and zones are rebuilt with fresh scan codes. The version
    /// counter keeps increasing so subscribers never see it regress.
    /// Idempotent: resetting an already-default session yields the same
    /// default again.
    pub fn reset(&mut self, zone_count: usize) {
        let version = self.version + 1;
        *self = GameSession::new(zone_count);
        self.version = version;
    }

    /// Finish the session if its deadline has passed, comparing held zone
    /// counts to pick the winner (draw on equality).
    ///
    /// Returns whether a transition happened. No-op on sessions that are not
    /// playing, so repeated evaluator ticks and races with a sweep win are
    /// harmless.
    pub fn finish_if_expired(&mut self, now: SystemTime) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        let Some(deadline) = self.deadline() else {
            return false;
        };
        if now < deadline {
            return false;
        }

        let splat = self.zones_held(TeamId::SplatSquad);
        let ink = self.zones_held(TeamId::InkMasters);
        self.winner = Some(match splat.cmp(&ink) {
            std::cmp::Ordering::Greater => Winner::Team(TeamId::SplatSquad),
            std::cmp::Ordering::Less => Winner::Team(TeamId::InkMasters),
            std::cmp::Ordering::Equal => Winner::Draw,
        });
        self.status = GameStatus::Finished;
        self.bump_version();
        true
    }

    fn ensure_status(&self, expected: GameStatus) -> Result<(), CommandError> {
        if self.status != expected {
            return Err(CommandError::InvalidState {
                status: self.status,
            });
        }
        Ok(())
    }

    fn ensure_not_ready(&self, player_id: &str) -> Result<(), CommandError> {
        if self.is_ready(player_id) {
            return Err(CommandError::AlreadyReady(player_id.to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::state::game::GameDuration;

    fn player(id: &str) -> Player {
        Player {
            id: id.to_owned(),
            name: format!("Player {id}"),
            emoji: "🦑".to_owned(),
        }
    }

    fn now() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    /// Join `id` to `team` and mark them ready.
    fn join_and_ready(session: &mut GameSession, id: &str, team: TeamId) {
        session.join_team(player(id), team).unwrap();
        session.toggle_ready(id, now()).unwrap();
    }

    #[test]
    fn join_puts_player_on_roster_in_order() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::SplatSquad).unwrap();

        let roster: Vec<&str> = session
            .teams
            .splat_squad
            .players
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(roster, ["a", "b"]);
    }

    #[test]
    fn join_swaps_teams_without_duplicating() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("a"), TeamId::InkMasters).unwrap();

        assert!(!session.teams.splat_squad.has_player("a"));
        assert!(session.teams.ink_masters.has_player("a"));
        assert_eq!(session.teams.rostered_players().count(), 1);
    }

    #[test]
    fn join_same_team_is_informational_noop() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        let version = session.version;

        let outcome = session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        assert!(outcome.already_member);
        assert_eq!(session.teams.splat_squad.players.len(), 1);
        assert_eq!(session.version, version);
    }

    #[test]
    fn ready_player_cannot_switch_team() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::SplatSquad).unwrap();
        session.toggle_ready("a", now()).unwrap();

        let err = session
            .join_team(player("a"), TeamId::InkMasters)
            .unwrap_err();
        assert_eq!(err, CommandError::AlreadyReady("a".into()));
    }

    #[test]
    fn color_conflict_is_rejected() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session
            .select_color("a", TeamId::SplatSquad, "#FF4500")
            .unwrap();

        let err = session
            .select_color("b", TeamId::InkMasters, "#ff4500")
            .unwrap_err();
        assert_eq!(err, CommandError::ColorConflict("#ff4500".into()));
        assert_ne!(
            session.teams.splat_squad.color,
            session.teams.ink_masters.color
        );
    }

    #[test]
    fn ready_player_cannot_change_color_or_vote() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::InkMasters).unwrap();
        session.toggle_ready("a", now()).unwrap();

        assert_eq!(
            session
                .select_color("a", TeamId::SplatSquad, "#2E8B57")
                .unwrap_err(),
            CommandError::AlreadyReady("a".into())
        );
        assert_eq!(
            session.vote("a", GameDuration::Thirty).unwrap_err(),
            CommandError::AlreadyReady("a".into())
        );
    }

    #[test]
    fn double_vote_is_rejected_across_durations() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.vote("a", GameDuration::Fifteen).unwrap();

        let err = session.vote("a", GameDuration::Thirty).unwrap_err();
        assert_eq!(err, CommandError::AlreadyVoted("a".into()));
        assert_eq!(session.votes.fifteen, vec!["a".to_owned()]);
        assert!(session.votes.thirty.is_empty());
    }

    #[test]
    fn ready_requires_team_membership() {
        let mut session = GameSession::new(2);
        let err = session.toggle_ready("ghost", now()).unwrap_err();
        assert_eq!(err, CommandError::NotOnTeam("ghost".into()));
    }

    #[test]
    fn unready_is_always_allowed() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::InkMasters).unwrap();
        session.toggle_ready("a", now()).unwrap();

        let outcome = session.toggle_ready("a", now()).unwrap();
        assert!(!outcome.ready);
        assert!(!outcome.started);
        assert!(session.ready_players.is_empty());
    }

    #[test]
    fn all_ready_starts_match_with_voted_duration() {
        let mut session = GameSession::new(2);
        session.join_team(player("solo"), TeamId::SplatSquad).unwrap();
        session.vote("solo", GameDuration::Thirty).unwrap();

        let outcome = session.toggle_ready("solo", now()).unwrap();
        assert!(outcome.started);
        assert_eq!(session.status, GameStatus::Playing);
        assert_eq!(session.duration, GameDuration::Thirty);
        assert_eq!(session.started_at, Some(now()));
    }

    #[test]
    fn vote_tie_starts_fifteen_minute_match() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::InkMasters).unwrap();
        session.vote("a", GameDuration::Thirty).unwrap();
        session.vote("b", GameDuration::Fifteen).unwrap();

        session.toggle_ready("a", now()).unwrap();
        let outcome = session.toggle_ready("b", now()).unwrap();
        assert!(outcome.started);
        assert_eq!(session.duration, GameDuration::Fifteen);
    }

    #[test]
    fn match_does_not_start_while_someone_is_not_ready() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::InkMasters).unwrap();

        let outcome = session.toggle_ready("a", now()).unwrap();
        assert!(!outcome.started);
        assert_eq!(session.status, GameStatus::Setup);
    }

    #[test]
    fn capture_requires_playing_status() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();

        let err = session.capture_zone("a", "zone-a", now()).unwrap_err();
        assert_eq!(
            err,
            CommandError::InvalidState {
                status: GameStatus::Setup
            }
        );
    }

    #[test]
    fn capture_requires_team_membership() {
        let mut session = GameSession::new(2);
        join_and_ready(&mut session, "a", TeamId::SplatSquad);

        let err = session.capture_zone("ghost", "zone-a", now()).unwrap_err();
        assert_eq!(err, CommandError::NotOnTeam("ghost".into()));
    }

    #[test]
    fn capture_rejects_unknown_zone() {
        let mut session = GameSession::new(2);
        join_and_ready(&mut session, "a", TeamId::SplatSquad);

        let err = session.capture_zone("a", "zone-z", now()).unwrap_err();
        assert_eq!(err, CommandError::UnknownZone("zone-z".into()));
    }

    #[test]
    fn capture_resolves_scan_codes() {
        let mut session = GameSession::new(3);
        join_and_ready(&mut session, "a", TeamId::SplatSquad);
        let code = session.zones[1].scan_code.clone();

        let outcome = session.capture_zone("a", &code, now()).unwrap();
        assert_eq!(outcome.zone_id, "zone-b");
        assert_eq!(session.zones[1].captured_by, Some(TeamId::SplatSquad));
    }

    #[test]
    fn repeat_capture_by_owner_changes_nothing() {
        let mut session = GameSession::new(3);
        join_and_ready(&mut session, "a", TeamId::SplatSquad);
        session.capture_zone("a", "zone-a", now()).unwrap();
        let version = session.version;

        let outcome = session.capture_zone("a", "zone-a", now()).unwrap();
        assert!(outcome.already_owned);
        assert!(!outcome.recapture);
        assert_eq!(session.version, version);
        assert_eq!(session.capture_stats.total_captures.splat_squad, 1);
        assert_eq!(session.capture_log.len(), 1);
    }

    #[test]
    fn capture_and_recapture_accounting() {
        let mut session = GameSession::new(3);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::InkMasters).unwrap();
        session.toggle_ready("a", now()).unwrap();
        session.toggle_ready("b", now()).unwrap();

        session.capture_zone("a", "zone-a", now()).unwrap();
        assert_eq!(session.capture_stats.total_captures.splat_squad, 1);
        assert_eq!(session.capture_stats.recaptures.splat_squad, 0);

        let outcome = session.capture_zone("b", "zone-a", now()).unwrap();
        assert!(outcome.recapture);
        assert_eq!(session.capture_stats.total_captures.ink_masters, 1);
        assert_eq!(session.capture_stats.recaptures.ink_masters, 1);

        session.capture_zone("a", "zone-a", now()).unwrap();
        assert_eq!(session.capture_stats.total_captures.splat_squad, 2);
        assert_eq!(session.capture_stats.recaptures.splat_squad, 1);

        assert_eq!(session.capture_log.len(), 3);
        assert!(session.capture_log[0].timestamp <= session.capture_log[2].timestamp);
    }

    #[test]
    fn sweeping_every_zone_wins_immediately() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::InkMasters).unwrap();
        session.toggle_ready("a", now()).unwrap();
        session.toggle_ready("b", now()).unwrap();

        session.capture_zone("a", "zone-a", now()).unwrap();
        let outcome = session.capture_zone("a", "zone-b", now()).unwrap();

        assert!(outcome.swept);
        assert_eq!(session.status, GameStatus::Finished);
        assert_eq!(session.winner, Some(Winner::Team(TeamId::SplatSquad)));
    }

    #[test]
    fn capture_after_finish_is_invalid() {
        let mut session = GameSession::new(1);
        join_and_ready(&mut session, "a", TeamId::SplatSquad);
        session.capture_zone("a", "zone-a", now()).unwrap();

        let err = session.capture_zone("a", "zone-a", now()).unwrap_err();
        assert_eq!(
            err,
            CommandError::InvalidState {
                status: GameStatus::Finished
            }
        );
    }

    #[test]
    fn deadline_expiry_picks_zone_majority_winner() {
        let mut session = GameSession::new(3);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::InkMasters).unwrap();
        session.toggle_ready("a", now()).unwrap();
        session.toggle_ready("b", now()).unwrap();

        session.capture_zone("a", "zone-a", now()).unwrap();
        session.capture_zone("a", "zone-b", now()).unwrap();
        session.capture_zone("b", "zone-c", now()).unwrap();

        let late = now() + session.duration.as_duration();
        assert!(session.finish_if_expired(late));
        assert_eq!(session.status, GameStatus::Finished);
        assert_eq!(session.winner, Some(Winner::Team(TeamId::SplatSquad)));
    }

    #[test]
    fn deadline_expiry_with_even_split_is_a_draw() {
        let mut session = GameSession::new(2);
        session.join_team(player("a"), TeamId::SplatSquad).unwrap();
        session.join_team(player("b"), TeamId::InkMasters).unwrap();
        session.toggle_ready("a", now()).unwrap();
        session.toggle_ready("b", now()).unwrap();

        session.capture_zone("a", "zone-a", now()).unwrap();
        session.capture_zone("b", "zone-b", now()).unwrap();

        let late = now() + session.duration.as_duration();
        assert!(session.finish_if_expired(late));
        assert_eq!(session.winner, Some(Winner::Draw));
    }

    #[test]
    fn finish_if_expired_is_idempotent_and_respects_running_matches() {
        let mut session = GameSession::new(2);
        join_and_ready(&mut session, "a", TeamId::SplatSquad);

        // Before the deadline nothing happens.
        assert!(!session.finish_if_expired(now() + Duration::from_secs(60)));
        assert_eq!(session.status, GameStatus::Playing);

        let late = now() + session.duration.as_duration();
        assert!(session.finish_if_expired(late));
        let version = session.version;

        // Second tick against the finished session is a no-op.
        assert!(!session.finish_if_expired(late + Duration::from_secs(5)));
        assert_eq!(session.version, version);
    }

    #[test]
    fn reset_restores_defaults_and_keeps_version_monotonic() {
        let mut session = GameSession::new(2);
        join_and_ready(&mut session, "a", TeamId::SplatSquad);
        session.capture_zone("a", "zone-a", now()).unwrap();
        let version_before = session.version;

        session.reset(2);
        assert_eq!(session.status, GameStatus::Setup);
        assert!(session.teams.rostered_players().count() == 0);
        assert!(session.capture_log.is_empty());
        assert_eq!(
            session.capture_stats.total_captures,
            crate::state::game::TeamTally::default()
        );
        assert!(session.version > version_before);

        let version_after_first = session.version;
        session.reset(2);
        assert_eq!(session.status, GameStatus::Setup);
        assert!(session.zones.iter().all(|z| z.captured_by.is_none()));
        assert!(session.version > version_after_first);
    }
}
