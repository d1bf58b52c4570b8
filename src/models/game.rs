//! Match (game), contender slots, results, and the per-tournament bracket table.

use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Address of a match inside a tournament: `(round, match_number)`, both 1-based.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MatchKey {
    pub round: u32,
    pub match_number: u32,
}

impl MatchKey {
    pub fn new(round: u32, match_number: u32) -> Self {
        Self { round, match_number }
    }

    /// Slot the winner of this match lands in: odd match numbers feed slot A, even feed slot B.
    pub fn feeds_side(&self) -> Side {
        if self.match_number % 2 == 1 {
            Side::A
        } else {
            Side::B
        }
    }
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}M{}", self.round, self.match_number)
    }
}

/// One of the two contender positions in a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// A contender position: either still empty or holding a team.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "team_id", rename_all = "snake_case")]
pub enum Slot {
    #[default]
    Empty,
    Team(TeamId),
}

impl Slot {
    pub fn team(&self) -> Option<TeamId> {
        match self {
            Slot::Empty => None,
            Slot::Team(id) => Some(*id),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Pending,
    Ongoing,
    Complete,
}

/// How a completed match was decided.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchResult {
    TeamA,
    TeamB,
    Bye,
    DqA,
    DqB,
}

/// Outcome reported for a match by the command surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    A,
    B,
    #[serde(rename = "BYE")]
    Bye,
    #[serde(rename = "DQ_A")]
    DqA,
    #[serde(rename = "DQ_B")]
    DqB,
}

/// A single bracket match between the teams in slot A and slot B.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub round: u32,
    pub match_number: u32,
    pub team_a: Slot,
    pub team_b: Slot,
    pub status: MatchStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub winner: Option<TeamId>,
    pub loser: Option<TeamId>,
    pub result: Option<MatchResult>,
    /// Free-form score, e.g. "2-1".
    pub score: Option<String>,
    pub dq_reason: Option<String>,
    /// Where the winner advances to. None for the final.
    pub next: Option<MatchKey>,
}

impl GameMatch {
    pub fn new(key: MatchKey, next: Option<MatchKey>) -> Self {
        Self {
            round: key.round,
            match_number: key.match_number,
            team_a: Slot::Empty,
            team_b: Slot::Empty,
            status: MatchStatus::Pending,
            scheduled_at: None,
            started_at: None,
            completed_at: None,
            winner: None,
            loser: None,
            result: None,
            score: None,
            dq_reason: None,
            next,
        }
    }

    pub fn with_teams(mut self, team_a: Slot, team_b: Slot) -> Self {
        self.team_a = team_a;
        self.team_b = team_b;
        self
    }

    pub fn key(&self) -> MatchKey {
        MatchKey::new(self.round, self.match_number)
    }

    pub fn slot(&self, side: Side) -> Slot {
        match side {
            Side::A => self.team_a,
            Side::B => self.team_b,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut Slot {
        match side {
            Side::A => &mut self.team_a,
            Side::B => &mut self.team_b,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == MatchStatus::Complete
    }

    /// True when the team sits in either slot.
    pub fn involves(&self, team: TeamId) -> bool {
        self.team_a.team() == Some(team) || self.team_b.team() == Some(team)
    }
}

/// All matches of a tournament, keyed by `(round, match_number)`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "BracketRepr", into = "BracketRepr")]
pub struct Bracket {
    /// Number of rounds computed when the bracket was built (0 before start).
    pub rounds: u32,
    matches: BTreeMap<MatchKey, GameMatch>,
}

/// JSON shape: maps with struct keys don't serialize, so matches go out as a list.
#[derive(Serialize, Deserialize)]
struct BracketRepr {
    rounds: u32,
    matches: Vec<GameMatch>,
}

impl From<BracketRepr> for Bracket {
    fn from(repr: BracketRepr) -> Self {
        Self {
            rounds: repr.rounds,
            matches: repr.matches.into_iter().map(|m| (m.key(), m)).collect(),
        }
    }
}

impl From<Bracket> for BracketRepr {
    fn from(bracket: Bracket) -> Self {
        Self {
            rounds: bracket.rounds,
            matches: bracket.matches.into_values().collect(),
        }
    }
}

impl Bracket {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn get(&self, key: MatchKey) -> Option<&GameMatch> {
        self.matches.get(&key)
    }

    pub fn get_mut(&mut self, key: MatchKey) -> Option<&mut GameMatch> {
        self.matches.get_mut(&key)
    }

    /// Insert unless a match already exists at that key. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, m: GameMatch) -> bool {
        let key = m.key();
        if self.matches.contains_key(&key) {
            return false;
        }
        self.matches.insert(key, m);
        true
    }

    /// Insert or overwrite the match at its key.
    pub(crate) fn put(&mut self, m: GameMatch) {
        self.matches.insert(m.key(), m);
    }

    /// Matches in `(round, match_number)` order.
    pub fn iter(&self) -> impl Iterator<Item = &GameMatch> {
        self.matches.values()
    }

    pub fn round(&self, round: u32) -> impl Iterator<Item = &GameMatch> {
        self.matches
            .range(MatchKey::new(round, 0)..=MatchKey::new(round, u32::MAX))
            .map(|(_, m)| m)
    }
}
