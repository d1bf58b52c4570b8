//! Tournament, TournamentStatus and TournamentError.

use crate::models::game::{Bracket, MatchKey, Side};
use crate::models::invite::{Invite, InviteId};
use crate::models::team::{Team, TeamId, TeamStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    #[error("Tournament not found")]
    TournamentNotFound(TournamentId),
    #[error("Team not found")]
    TeamNotFound(TeamId),
    #[error("Match {0} not found")]
    MatchNotFound(MatchKey),
    #[error("Invite not found")]
    InviteNotFound(InviteId),
    #[error("No tournament is open for registration")]
    NoOpenTournament,
    /// Registration needs DRAFT or REG_OPEN.
    #[error("Registration is not open (tournament is {0})")]
    RegistrationClosed(TournamentStatus),
    #[error("Cannot move tournament from {from} to {to}")]
    InvalidTransition {
        from: TournamentStatus,
        to: TournamentStatus,
    },
    #[error("Need at least 2 active teams to lock (have {active})")]
    NotEnoughTeams { active: u32 },
    #[error("Team is no longer active or waitlisted")]
    TeamNotLive(TeamId),
    #[error("Match {key} has no team in slot {side:?}")]
    EmptySlot { key: MatchKey, side: Side },
    #[error("Both slots of match {0} are already taken")]
    NextSlotTaken(MatchKey),
    #[error("Seed {0} is already taken")]
    SeedTaken(u32),
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Invalid tournament options: {0}")]
    InvalidOptions(&'static str),
    #[error("Invalid CSV: {0}")]
    Csv(String),
    /// Tournament or match is not in a state that allows this action.
    #[error("Invalid state for this action: {0}")]
    InvalidState(&'static str),
    #[error("Tournament is at capacity ({max_teams} teams)")]
    AtCapacity { max_teams: u32 },
    #[error("{0} is already registered on another team in this tournament")]
    DuplicateMember(UserId),
    #[error("A team must have 1 or 2 members (got {0})")]
    InvalidMemberCount(usize),
    /// Team names are unique per tournament, case-insensitive.
    #[error("Team name {0:?} is already in use in this tournament")]
    DuplicateName(String),
}

/// Coarse error classes surfaced to callers for user-facing translation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    CapacityExceeded,
    DuplicateMember,
    InvalidMemberCount,
    DuplicateName,
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            TournamentNotFound(_) | TeamNotFound(_) | MatchNotFound(_) | InviteNotFound(_)
            | NoOpenTournament => ErrorKind::NotFound,
            RegistrationClosed(_) | InvalidTransition { .. } | NotEnoughTeams { .. }
            | TeamNotLive(_) | EmptySlot { .. } | NextSlotTaken(_) | SeedTaken(_) | EmptyName
            | InvalidOptions(_) | Csv(_) | InvalidState(_) => ErrorKind::InvalidState,
            AtCapacity { .. } => ErrorKind::CapacityExceeded,
            DuplicateMember(_) => ErrorKind::DuplicateMember,
            InvalidMemberCount(_) => ErrorKind::InvalidMemberCount,
            DuplicateName(_) => ErrorKind::DuplicateName,
        }
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    /// Created, registration not yet open; new teams go to the waitlist.
    #[default]
    Draft,
    RegOpen,
    /// Registration closed and seeds fixed.
    Locked,
    /// Bracket materialised; results are being reported.
    InProgress,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    /// Teams may register (and be promoted) before lock.
    pub fn accepts_registration(self) -> bool {
        matches!(self, TournamentStatus::Draft | TournamentStatus::RegOpen)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Completed | TournamentStatus::Cancelled)
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TournamentStatus::Draft => "DRAFT",
            TournamentStatus::RegOpen => "REG_OPEN",
            TournamentStatus::Locked => "LOCKED",
            TournamentStatus::InProgress => "IN_PROGRESS",
            TournamentStatus::Completed => "COMPLETED",
            TournamentStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// How seeds are assigned at lock time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeedingMethod {
    /// Registration order.
    #[default]
    FirstCome,
    Random,
    /// Keep seeds set by an admin; the rest follow in registration order.
    Manual,
}

/// Options for creating a tournament.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TournamentOptions {
    pub name: String,
    #[serde(default)]
    pub seeding_method: SeedingMethod,
    #[serde(default)]
    pub max_teams: Option<u32>,
    #[serde(default)]
    pub bracket_size: Option<u32>,
    #[serde(default)]
    pub registration_opens_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TournamentOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Full tournament state: teams, bracket, invites, and lifecycle status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub seeding_method: SeedingMethod,
    /// Registration cap on ACTIVE teams.
    pub max_teams: Option<u32>,
    /// Set to the next power of two at start when not configured.
    pub bracket_size: Option<u32>,
    /// Number of ACTIVE teams.
    pub team_count: u32,
    /// Number of WAITLIST teams.
    pub waitlist_count: u32,
    pub created_at: DateTime<Utc>,
    pub registration_opens_at: Option<DateTime<Utc>>,
    pub registration_closes_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// All teams ever registered, in registration order.
    pub teams: Vec<Team>,
    pub bracket: Bracket,
    pub invites: Vec<Invite>,
}

impl Tournament {
    /// Create a new tournament in Draft state with no teams.
    pub fn new(options: TournamentOptions) -> Result<Self, TournamentError> {
        let name = options.name.trim();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        if options.max_teams.is_some_and(|n| n < 2) {
            return Err(TournamentError::InvalidOptions("max_teams must be at least 2"));
        }
        if options.bracket_size.is_some_and(|n| n < 2) {
            return Err(TournamentError::InvalidOptions("bracket_size must be at least 2"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: TournamentStatus::Draft,
            seeding_method: options.seeding_method,
            max_teams: options.max_teams,
            bracket_size: options.bracket_size,
            team_count: 0,
            waitlist_count: 0,
            created_at: Utc::now(),
            registration_opens_at: options.registration_opens_at,
            registration_closes_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            notes: options.notes,
            teams: Vec::new(),
            bracket: Bracket::default(),
            invites: Vec::new(),
        })
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Index of a team in `teams`, or `TeamNotFound`.
    pub fn team_index(&self, id: TeamId) -> Result<usize, TournamentError> {
        self.teams
            .iter()
            .position(|t| t.id == id)
            .ok_or(TournamentError::TeamNotFound(id))
    }

    /// ACTIVE teams in registration order.
    pub fn active_teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(|t| t.status == TeamStatus::Active)
    }

    /// Live team (other than `excluding`) that already has this participant.
    pub fn live_team_of(&self, user_id: &str, excluding: Option<TeamId>) -> Option<&Team> {
        self.teams
            .iter()
            .filter(|t| Some(t.id) != excluding)
            .find(|t| t.is_live() && t.has_member(user_id))
    }

    /// Whether another team (any status) already uses this name.
    pub fn name_taken(&self, name: &str, excluding: Option<TeamId>) -> bool {
        let wanted = name.to_lowercase();
        self.teams
            .iter()
            .filter(|t| Some(t.id) != excluding)
            .any(|t| t.name.to_lowercase() == wanted)
    }

    pub fn is_at_capacity(&self) -> bool {
        self.max_teams.is_some_and(|max| self.team_count >= max)
    }

    /// Append a new team and count it under its initial status.
    pub(crate) fn push_team(&mut self, team: Team) -> usize {
        if let Some(counter) = self.counter_mut(team.status) {
            *counter += 1;
        }
        self.teams.push(team);
        self.teams.len() - 1
    }

    /// The one place a team's status changes: moves the team between the
    /// ACTIVE/WAITLIST counters by exactly the delta of the transition.
    pub(crate) fn set_team_status(&mut self, index: usize, status: TeamStatus) {
        let prior = self.teams[index].status;
        if prior == status {
            return;
        }
        if let Some(counter) = self.counter_mut(prior) {
            *counter = counter.saturating_sub(1);
        }
        if let Some(counter) = self.counter_mut(status) {
            *counter += 1;
        }
        self.teams[index].status = status;
    }

    fn counter_mut(&mut self, status: TeamStatus) -> Option<&mut u32> {
        match status {
            TeamStatus::Active => Some(&mut self.team_count),
            TeamStatus::Waitlist => Some(&mut self.waitlist_count),
            TeamStatus::Disqualified | TeamStatus::Withdrawn => None,
        }
    }

    pub fn invite_index(&self, id: InviteId) -> Result<usize, TournamentError> {
        self.invites
            .iter()
            .position(|i| i.id == id)
            .ok_or(TournamentError::InviteNotFound(id))
    }
}
