//! Single-elimination bracket organizer: library with models, business logic and the tournament store.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    accept_invite, add_member, build_bracket, cancel_tournament, champion, complete_tournament,
    deny_invite, disqualify_team, expire_stale_invites, import_teams_csv, list_matches,
    lock_and_seed, lock_and_seed_with_rng, open_registration, promote_from_waitlist,
    register_team, remove_member, rename_team, schedule_match, send_invite, set_manual_seed,
    set_seeding_method, start_match, start_tournament, submit_result, withdraw_team,
};
pub use models::{
    Bracket, ErrorKind, GameMatch, Invite, InviteId, InviteStatus, MatchKey, MatchResult,
    MatchStatus, Outcome, SeedingMethod, Side, Slot, Team, TeamId, TeamStatus, Tournament,
    TournamentError, TournamentId, TournamentOptions, TournamentStatus, UserId,
};
pub use store::TournamentStore;
