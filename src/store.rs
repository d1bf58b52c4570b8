//! In-memory tournament store. A tournament owns its teams, matches and invites,
//! so removing it removes them too.

use crate::logic::expire_stale_invites;
use crate::models::{
    InviteId, TeamId, Tournament, TournamentError, TournamentId, TournamentOptions,
    TournamentStatus,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct TournamentStore {
    tournaments: HashMap<TournamentId, Tournament>,
}

impl TournamentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tournament in Draft.
    pub fn create(&mut self, options: TournamentOptions) -> Result<&Tournament, TournamentError> {
        let tournament = Tournament::new(options)?;
        let id = tournament.id;
        log::info!("Created tournament {:?} ({})", tournament.name, id);
        Ok(self.tournaments.entry(id).or_insert(tournament))
    }

    pub fn get(&self, id: TournamentId) -> Result<&Tournament, TournamentError> {
        self.tournaments
            .get(&id)
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    pub fn get_mut(&mut self, id: TournamentId) -> Result<&mut Tournament, TournamentError> {
        self.tournaments
            .get_mut(&id)
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    /// Remove a tournament along with everything it owns.
    pub fn remove(&mut self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.tournaments
            .remove(&id)
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    /// All tournaments, oldest first.
    pub fn list(&self) -> Vec<&Tournament> {
        let mut all: Vec<_> = self.tournaments.values().collect();
        all.sort_by_key(|t| t.created_at);
        all
    }

    /// The tournament currently taking registrations (oldest first if several).
    pub fn open_for_registration(&self) -> Result<&Tournament, TournamentError> {
        self.tournaments
            .values()
            .filter(|t| t.status == TournamentStatus::RegOpen)
            .min_by_key(|t| t.created_at)
            .ok_or(TournamentError::NoOpenTournament)
    }

    /// Tournament owning the team.
    pub fn for_team_mut(&mut self, team_id: TeamId) -> Result<&mut Tournament, TournamentError> {
        self.tournaments
            .values_mut()
            .find(|t| t.team(team_id).is_some())
            .ok_or(TournamentError::TeamNotFound(team_id))
    }

    /// Tournament owning the invite.
    pub fn for_invite_mut(
        &mut self,
        invite_id: InviteId,
    ) -> Result<&mut Tournament, TournamentError> {
        self.tournaments
            .values_mut()
            .find(|t| t.invites.iter().any(|i| i.id == invite_id))
            .ok_or(TournamentError::InviteNotFound(invite_id))
    }

    /// Expire lapsed invites across all tournaments.
    pub fn expire_stale_invites(&mut self, now: DateTime<Utc>) -> usize {
        self.tournaments
            .values_mut()
            .map(|t| expire_stale_invites(t, now))
            .sum()
    }
}
