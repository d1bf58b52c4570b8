//! Team data structure.

use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches and lookups).
pub type TeamId = Uuid;

/// Chat-platform participant id.
pub type UserId = String;

/// Most members a team may have.
pub const MAX_MEMBERS: usize = 2;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamStatus {
    Active,
    #[default]
    Waitlist,
    Disqualified,
    Withdrawn,
}

impl TeamStatus {
    /// ACTIVE and WAITLIST teams hold their members; the others are terminal.
    pub fn is_live(self) -> bool {
        matches!(self, TeamStatus::Active | TeamStatus::Waitlist)
    }
}

/// A team registered in one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub tournament_id: TournamentId,
    pub name: String,
    /// 1 or 2 distinct participant ids, in join order.
    pub member_ids: Vec<UserId>,
    pub captain_id: Option<UserId>,
    /// Who created the team.
    pub owner_id: UserId,
    /// Fixed at lock time.
    pub seed: Option<u32>,
    /// Only changed through `Tournament::set_team_status` so counters stay in step.
    pub status: TeamStatus,
    pub dq_reason: Option<String>,
    pub dq_at: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
}

impl Team {
    pub fn new(
        tournament_id: TournamentId,
        name: impl Into<String>,
        owner_id: impl Into<UserId>,
        member_ids: Vec<UserId>,
        status: TeamStatus,
    ) -> Self {
        let captain_id = member_ids.first().cloned();
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            member_ids,
            captain_id,
            owner_id: owner_id.into(),
            seed: None,
            status,
            dq_reason: None,
            dq_at: None,
            registered_at: Utc::now(),
        }
    }

    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.member_ids.iter().any(|m| m == user_id)
    }

    pub fn is_full(&self) -> bool {
        self.member_ids.len() >= MAX_MEMBERS
    }
}
