//! Data structures for the bracket tournament: teams, matches, invites, tournament state.

mod game;
mod invite;
mod team;
mod tournament;

pub use game::{Bracket, GameMatch, MatchKey, MatchResult, MatchStatus, Outcome, Side, Slot};
pub use invite::{Invite, InviteId, InviteStatus};
pub use team::{Team, TeamId, TeamStatus, UserId, MAX_MEMBERS};
pub use tournament::{
    ErrorKind, SeedingMethod, Tournament, TournamentError, TournamentId, TournamentOptions,
    TournamentStatus,
};
