use std::time::{Duration, SystemTime};

use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Number of zones a default session is created with.
pub const DEFAULT_ZONE_COUNT: usize = 11;
/// Color assigned to the splat squad before anyone picks one.
pub const SPLAT_SQUAD_DEFAULT_COLOR: &str = "#FF00FF";
/// Color assigned to the ink masters before anyone picks one.
pub const INK_MASTERS_DEFAULT_COLOR: &str = "#00FFFF";

/// Identifier of one of the two fixed teams.
///
/// The wire names (`splatSquad` / `inkMasters`) are part of the public
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum TeamId {
    /// The splat squad.
    SplatSquad,
    /// The ink masters.
    InkMasters,
}

impl TeamId {
    /// Both team identifiers in declaration order.
    pub const BOTH: [TeamId; 2] = [TeamId::SplatSquad, TeamId::InkMasters];

    /// The opposing team.
    pub fn rival(self) -> TeamId {
        match self {
            TeamId::SplatSquad => TeamId::InkMasters,
            TeamId::InkMasters => TeamId::SplatSquad,
        }
    }
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Teams are forming, colors and duration are being decided.
    Setup,
    /// The match is running and zones can be captured.
    Playing,
    /// A winner (or draw) has been decided.
    Finished,
}

/// Outcome of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// One team won.
    Team(TeamId),
    /// Both teams held the same number of zones at the deadline.
    Draw,
}

/// Match duration decided by the pre-game vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameDuration {
    /// A fifteen minute match.
    Fifteen,
    /// A thirty minute match.
    Thirty,
}

impl GameDuration {
    /// Parse a duration from its minute count; only 15 and 30 are valid.
    pub fn from_minutes(minutes: u8) -> Option<Self> {
        match minutes {
            15 => Some(GameDuration::Fifteen),
            30 => Some(GameDuration::Thirty),
            _ => None,
        }
    }

    /// Duration in minutes.
    pub fn minutes(self) -> u8 {
        match self {
            GameDuration::Fifteen => 15,
            GameDuration::Thirty => 30,
        }
    }

    /// Duration as wall-clock time.
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.minutes()) * 60)
    }
}

/// A participant, created at login and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Stable identifier chosen at login.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Emoji avatar.
    pub emoji: String,
}

/// One of the two fixed teams and its roster.
#[derive(Debug, Clone)]
pub struct Team {
    /// Display name.
    pub name: String,
    /// Hex color, unique across the two teams.
    pub color: String,
    /// Roster in insertion order.
    pub players: Vec<Player>,
}

impl Team {
    fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_owned(),
            color: color.to_owned(),
            players: Vec::new(),
        }
    }

    /// Whether the player id is on this roster.
    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }
}

/// The two team slots of a session.
#[derive(Debug, Clone)]
pub struct Teams {
    /// Splat squad slot.
    pub splat_squad: Team,
    /// Ink masters slot.
    pub ink_masters: Team,
}

impl Teams {
    fn new() -> Self {
        Self {
            splat_squad: Team::new("Splat Squad", SPLAT_SQUAD_DEFAULT_COLOR),
            ink_masters: Team::new("Ink Masters", INK_MASTERS_DEFAULT_COLOR),
        }
    }

    /// Borrow a team by identifier.
    pub fn get(&self, id: TeamId) -> &Team {
        match id {
            TeamId::SplatSquad => &self.splat_squad,
            TeamId::InkMasters => &self.ink_masters,
        }
    }

    /// Mutably borrow a team by identifier.
    pub fn get_mut(&mut self, id: TeamId) -> &mut Team {
        match id {
            TeamId::SplatSquad => &mut self.splat_squad,
            TeamId::InkMasters => &mut self.ink_masters,
        }
    }

    /// Which team the player belongs to, if any.
    pub fn member_of(&self, player_id: &str) -> Option<TeamId> {
        TeamId::BOTH
            .into_iter()
            .find(|id| self.get(*id).has_player(player_id))
    }

    /// Every rostered player across both teams.
    pub fn rostered_players(&self) -> impl Iterator<Item = &Player> {
        self.splat_squad
            .players
            .iter()
            .chain(self.ink_masters.players.iter())
    }
}

/// A capturable zone defined at session creation.
#[derive(Debug, Clone)]
pub struct Zone {
    /// Stable zone identifier (`zone-a`, `zone-b`, ...).
    pub id: String,
    /// Opaque identifier embedded in the zone's scan URL / QR code.
    pub scan_code: String,
    /// Current owner, if any.
    pub captured_by: Option<TeamId>,
    /// When the current owner took the zone.
    pub captured_at: Option<SystemTime>,
}

/// Per-team counter pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamTally {
    /// Count for the splat squad.
    pub splat_squad: u32,
    /// Count for the ink masters.
    pub ink_masters: u32,
}

impl TeamTally {
    /// Counter for one team.
    pub fn get(self, team: TeamId) -> u32 {
        match team {
            TeamId::SplatSquad => self.splat_squad,
            TeamId::InkMasters => self.ink_masters,
        }
    }

    /// Increment a team's counter.
    pub fn bump(&mut self, team: TeamId) {
        match team {
            TeamId::SplatSquad => self.splat_squad += 1,
            TeamId::InkMasters => self.ink_masters += 1,
        }
    }
}

/// Capture accounting kept incrementally.
///
/// Zones only store their current owner, so recapture counts cannot be
/// recomputed from the zone list and must be maintained as running counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureStats {
    /// Every capture that changed a zone's owner, per team.
    pub total_captures: TeamTally,
    /// Captures that took a zone away from the other team, per team.
    pub recaptures: TeamTally,
}

/// Duration vote ledger: each player casts at most one vote per session
/// lifecycle.
#[derive(Debug, Clone, Default)]
pub struct VoteLedger {
    /// Player ids that voted for a fifteen minute match.
    pub fifteen: Vec<String>,
    /// Player ids that voted for a thirty minute match.
    pub thirty: Vec<String>,
}

impl VoteLedger {
    /// Whether the player already voted for either duration.
    pub fn has_voted(&self, player_id: &str) -> bool {
        self.fifteen.iter().any(|id| id == player_id)
            || self.thirty.iter().any(|id| id == player_id)
    }

    /// Record a vote. Callers must have checked [`Self::has_voted`] first.
    pub fn cast(&mut self, player_id: &str, duration: GameDuration) {
        let bucket = match duration {
            GameDuration::Fifteen => &mut self.fifteen,
            GameDuration::Thirty => &mut self.thirty,
        };
        bucket.push(player_id.to_owned());
    }

    /// Duration picked at match start: thirty only on a strict majority,
    /// ties favor fifteen.
    pub fn winning_duration(&self) -> GameDuration {
        if self.thirty.len() > self.fifteen.len() {
            GameDuration::Thirty
        } else {
            GameDuration::Fifteen
        }
    }
}

/// One entry of the append-only capture audit log.
#[derive(Debug, Clone)]
pub struct CaptureEvent {
    /// Unique identifier of the log entry.
    pub id: Uuid,
    /// Zone that changed hands.
    pub zone_id: String,
    /// Team that now owns the zone.
    pub team_id: TeamId,
    /// Player that scanned the zone.
    pub player_id: String,
    /// When the capture was applied.
    pub timestamp: SystemTime,
    /// Whether the zone was taken from the other team.
    pub is_recapture: bool,
}

/// Root aggregate for one room: teams, zones, votes, ready set, capture
/// accounting, and the audit log.
///
/// All mutation rules live in [`crate::state::commands`]; this module only
/// defines the shape and default construction.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Lifecycle status.
    pub status: GameStatus,
    /// The two team slots.
    pub teams: Teams,
    /// Fixed zone set, created with the session.
    pub zones: Vec<Zone>,
    /// Match duration; meaningful once the match started.
    pub duration: GameDuration,
    /// When the match started, if it did.
    pub started_at: Option<SystemTime>,
    /// Duration vote ledger.
    pub votes: VoteLedger,
    /// Set once the session is finished, never before.
    pub winner: Option<Winner>,
    /// Ids of players that signaled readiness.
    pub ready_players: Vec<String>,
    /// Incremental capture accounting.
    pub capture_stats: CaptureStats,
    /// Append-only capture audit log, cleared on reset.
    pub capture_log: Vec<CaptureEvent>,
    /// Monotonic mutation counter; survives resets so snapshot ordering
    /// never regresses within a room.
    pub version: u64,
}

impl GameSession {
    /// Build a default session in `setup` status with `zone_count` fresh
    /// zones.
    pub fn new(zone_count: usize) -> Self {
        Self {
            status: GameStatus::Setup,
            teams: Teams::new(),
            zones: build_zones(zone_count),
            duration: GameDuration::Fifteen,
            started_at: None,
            votes: VoteLedger::default(),
            winner: None,
            ready_players: Vec::new(),
            capture_stats: CaptureStats::default(),
            capture_log: Vec::new(),
            version: 0,
        }
    }

    /// Whether the player is in the ready set.
    pub fn is_ready(&self, player_id: &str) -> bool {
        self.ready_players.iter().any(|id| id == player_id)
    }

    /// Wall-clock instant at which a running match expires.
    pub fn deadline(&self) -> Option<SystemTime> {
        self.started_at
            .map(|start| start + self.duration.as_duration())
    }

    /// Number of zones currently held by `team`.
    pub fn zones_held(&self, team: TeamId) -> usize {
        self.zones
            .iter()
            .filter(|zone| zone.captured_by == Some(team))
            .count()
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}

/// Build the fixed zone set: ids are lettered `zone-a`, `zone-b`, ... and
/// each zone gets a freshly generated scan code.
fn build_zones(zone_count: usize) -> Vec<Zone> {
    (0..zone_count)
        .map(|index| {
            let letter = char::from(b'a' + index as u8);
            Zone {
                id: format!("zone-{letter}"),
                scan_code: generate_scan_code(letter),
                captured_by: None,
                captured_at: None,
            }
        })
        .collect()
}

/// Generate the opaque identifier embedded in a zone's QR code: twenty
/// random base-36 characters followed by the zone letter.
fn generate_scan_code(letter: char) -> String {
    const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    let mut code: String = (0..20)
        .map(|_| char::from(CHARSET[rng.random_range(0..CHARSET.len())]))
        .collect();
    code.push(letter);
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_shape() {
        let session = GameSession::new(DEFAULT_ZONE_COUNT);
        assert_eq!(session.status, GameStatus::Setup);
        assert_eq!(session.zones.len(), 11);
        assert_eq!(session.zones[0].id, "zone-a");
        assert_eq!(session.zones[10].id, "zone-k");
        assert_eq!(session.teams.splat_squad.color, SPLAT_SQUAD_DEFAULT_COLOR);
        assert_eq!(session.teams.ink_masters.color, INK_MASTERS_DEFAULT_COLOR);
        assert!(session.winner.is_none());
        assert!(session.started_at.is_none());
    }

    #[test]
    fn scan_codes_carry_the_zone_letter() {
        let session = GameSession::new(3);
        for (zone, letter) in session.zones.iter().zip(['a', 'b', 'c']) {
            assert_eq!(zone.scan_code.len(), 21);
            assert!(zone.scan_code.ends_with(letter));
            assert!(zone.scan_code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn winning_duration_tie_favors_fifteen() {
        let mut votes = VoteLedger::default();
        assert_eq!(votes.winning_duration(), GameDuration::Fifteen);

        votes.cast("p1", GameDuration::Thirty);
        assert_eq!(votes.winning_duration(), GameDuration::Thirty);

        votes.cast("p2", GameDuration::Fifteen);
        assert_eq!(votes.winning_duration(), GameDuration::Fifteen);
    }

    #[test]
    fn rival_is_symmetric() {
        assert_eq!(TeamId::SplatSquad.rival(), TeamId::InkMasters);
        assert_eq!(TeamId::InkMasters.rival(), TeamId::SplatSquad);
    }
}
