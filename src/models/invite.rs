//! Invitations to join a team.

use crate::models::team::{TeamId, UserId};
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type InviteId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteStatus {
    #[default]
    Pending,
    Accepted,
    Denied,
    Expired,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub id: InviteId,
    pub tournament_id: TournamentId,
    /// Inviter's team.
    pub team_id: TeamId,
    pub inviter_id: UserId,
    pub invitee_id: UserId,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Invite {
    pub fn new(
        tournament_id: TournamentId,
        team_id: TeamId,
        inviter_id: impl Into<UserId>,
        invitee_id: impl Into<UserId>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            team_id,
            inviter_id: inviter_id.into(),
            invitee_id: invitee_id.into(),
            status: InviteStatus::Pending,
            created_at: Utc::now(),
            expires_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Pending
    }

    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
