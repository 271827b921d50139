use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{format_system_time, validation::validate_team_color},
    state::game::{
        CaptureEvent, CaptureStats, GameSession, GameStatus, Player, Team, TeamId, TeamTally,
        Winner, Zone,
    },
};

/// Player identity submitted when joining a team.
///
/// Players are created client-side at login, so the full identity travels
/// with the join command and is stored on the roster as-is.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct PlayerInput {
    /// Stable player identifier.
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    /// Display name.
    #[validate(length(min = 1, max = 32))]
    pub name: String,
    /// Emoji avatar.
    #[validate(length(min = 1, max = 16))]
    pub emoji: String,
}

/// Payload for the join-team command.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinTeamRequest {
    /// The acting player.
    #[validate(nested)]
    pub player: PlayerInput,
    /// Team to join.
    pub team: TeamId,
}

/// Payload for the select-color command.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectColorRequest {
    /// The acting player's id.
    pub player_id: String,
    /// Team whose color is being set.
    pub team: TeamId,
    /// Requested color (`#RRGGBB`, must be a palette entry).
    pub color: String,
}

impl Validate for SelectColorRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.player_id.is_empty() || self.player_id.len() > 64 {
            errors.add(
                "player_id",
                validator::ValidationError::new("player_id_length"),
            );
        }

        if let Err(e) = validate_team_color(&self.color) {
            errors.add("color", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload for the duration vote command.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct VoteRequest {
    /// The acting player's id.
    #[validate(length(min = 1, max = 64))]
    pub player_id: String,
    /// Requested match duration in minutes; only 15 and 30 are accepted.
    pub duration: u8,
}

/// Payload for the ready toggle command.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ToggleReadyRequest {
    /// The acting player's id.
    #[validate(length(min = 1, max = 64))]
    pub player_id: String,
}

/// Payload for the capture command.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CaptureZoneRequest {
    /// The acting player's id.
    #[validate(length(min = 1, max = 64))]
    pub player_id: String,
    /// Zone reference: either the zone id (`zone-a`) or the opaque scan code
    /// from the zone's QR code.
    #[validate(length(min = 1, max = 64))]
    pub zone: String,
}

/// Session lifecycle status as exposed on the wire.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatusDto {
    /// Teams are forming.
    Setup,
    /// The match is running.
    Playing,
    /// The match is over.
    Finished,
}

impl From<GameStatus> for GameStatusDto {
    fn from(value: GameStatus) -> Self {
        match value {
            GameStatus::Setup => GameStatusDto::Setup,
            GameStatus::Playing => GameStatusDto::Playing,
            GameStatus::Finished => GameStatusDto::Finished,
        }
    }
}

/// Match outcome as exposed on the wire.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WinnerDto {
    /// The splat squad won.
    SplatSquad,
    /// The ink masters won.
    InkMasters,
    /// Even zone split at the deadline.
    Draw,
}

impl From<TeamId> for WinnerDto {
    fn from(value: TeamId) -> Self {
        match value {
            TeamId::SplatSquad => WinnerDto::SplatSquad,
            TeamId::InkMasters => WinnerDto::InkMasters,
        }
    }
}

impl From<Winner> for WinnerDto {
    fn from(value: Winner) -> Self {
        match value {
            Winner::Team(TeamId::SplatSquad) => WinnerDto::SplatSquad,
            Winner::Team(TeamId::InkMasters) => WinnerDto::InkMasters,
            Winner::Draw => WinnerDto::Draw,
        }
    }
}

/// Public projection of a roster entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerSnapshot {
    /// Stable player identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Emoji avatar.
    pub emoji: String,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            emoji: player.emoji.clone(),
        }
    }
}

/// Public projection of a team.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamSnapshot {
    /// Display name.
    pub name: String,
    /// Current hex color.
    pub color: String,
    /// Roster in insertion order.
    pub players: Vec<PlayerSnapshot>,
}

impl From<&Team> for TeamSnapshot {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name.clone(),
            color: team.color.clone(),
            players: team.players.iter().map(Into::into).collect(),
        }
    }
}

/// Both team slots keyed by their wire names.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamsSnapshot {
    /// Splat squad slot.
    pub splat_squad: TeamSnapshot,
    /// Ink masters slot.
    pub ink_masters: TeamSnapshot,
}

/// Public projection of a zone.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSnapshot {
    /// Stable zone identifier.
    pub id: String,
    /// Opaque identifier embedded in the zone's scan URL / QR code.
    pub scan_code: String,
    /// Current owner, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_by: Option<TeamId>,
    /// When the current owner took the zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
}

impl From<&Zone> for ZoneSnapshot {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id.clone(),
            scan_code: zone.scan_code.clone(),
            captured_by: zone.captured_by,
            captured_at: zone.captured_at.map(format_system_time),
        }
    }
}

/// Vote ledger keyed by the duration options.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VotesSnapshot {
    /// Player ids that voted for fifteen minutes.
    #[serde(rename = "15")]
    pub fifteen: Vec<String>,
    /// Player ids that voted for thirty minutes.
    #[serde(rename = "30")]
    pub thirty: Vec<String>,
}

/// Per-team counter pair.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamTallySnapshot {
    /// Count for the splat squad.
    pub splat_squad: u32,
    /// Count for the ink masters.
    pub ink_masters: u32,
}

impl From<TeamTally> for TeamTallySnapshot {
    fn from(tally: TeamTally) -> Self {
        Self {
            splat_squad: tally.splat_squad,
            ink_masters: tally.ink_masters,
        }
    }
}

/// Capture accounting counters.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureStatsSnapshot {
    /// Owner-changing captures per team.
    pub total_captures: TeamTallySnapshot,
    /// Captures taken from the other team, per team.
    pub recaptures: TeamTallySnapshot,
}

impl From<CaptureStats> for CaptureStatsSnapshot {
    fn from(stats: CaptureStats) -> Self {
        Self {
            total_captures: stats.total_captures.into(),
            recaptures: stats.recaptures.into(),
        }
    }
}

/// Full session snapshot returned by every command and streamed over SSE.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Monotonic per-room mutation counter.
    pub version: u64,
    /// Lifecycle status.
    pub status: GameStatusDto,
    /// Both team slots.
    pub teams: TeamsSnapshot,
    /// The session's zone set.
    pub zones: Vec<ZoneSnapshot>,
    /// Match duration in minutes.
    pub game_duration: u8,
    /// Match start time, present once the match started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_start_time: Option<String>,
    /// Duration vote ledger.
    pub votes: VotesSnapshot,
    /// Match outcome, present once the session finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<WinnerDto>,
    /// Ids of players that signaled readiness.
    pub ready_players: Vec<String>,
    /// Capture accounting counters.
    pub capture_stats: CaptureStatsSnapshot,
}

impl From<&GameSession> for GameSnapshot {
    fn from(session: &GameSession) -> Self {
        Self {
            version: session.version,
            status: session.status.into(),
            teams: TeamsSnapshot {
                splat_squad: (&session.teams.splat_squad).into(),
                ink_masters: (&session.teams.ink_masters).into(),
            },
            zones: session.zones.iter().map(Into::into).collect(),
            game_duration: session.duration.minutes(),
            game_start_time: session.started_at.map(format_system_time),
            votes: VotesSnapshot {
                fifteen: session.votes.fifteen.clone(),
                thirty: session.votes.thirty.clone(),
            },
            winner: session.winner.map(Into::into),
            ready_players: session.ready_players.clone(),
            capture_stats: session.capture_stats.into(),
        }
    }
}

/// Response of the join-team command.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    /// The player was already on the requested team; nothing changed.
    pub already_member: bool,
    /// Post-command session snapshot.
    pub session: GameSnapshot,
}

/// Response of the capture command.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    /// The acting team already owned the zone; nothing changed.
    pub already_owned: bool,
    /// The zone was taken from the other team.
    pub recapture: bool,
    /// Post-command session snapshot.
    pub session: GameSnapshot,
}

/// One entry of the capture audit log.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureEventRecord {
    /// Unique identifier of the log entry.
    pub id: Uuid,
    /// Zone that changed hands.
    pub zone_id: String,
    /// Team that took the zone.
    pub team_id: TeamId,
    /// Player that scanned the zone.
    pub player_id: String,
    /// When the capture was applied.
    pub timestamp: String,
    /// Whether the zone was taken from the other team.
    pub is_recapture: bool,
}

impl From<&CaptureEvent> for CaptureEventRecord {
    fn from(event: &CaptureEvent) -> Self {
        Self {
            id: event.id,
            zone_id: event.zone_id.clone(),
            team_id: event.team_id,
            player_id: event.player_id.clone(),
            timestamp: format_system_time(event.timestamp),
            is_recapture: event.is_recapture,
        }
    }
}
