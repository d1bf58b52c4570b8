//! Tournament business logic: team registry, lifecycle, bracket building, results.

mod advancement;
mod bracket;
mod invites;
mod lifecycle;
mod registration;

pub use advancement::{champion, list_matches, schedule_match, start_match, submit_result};
pub use bracket::{
    build_bracket, matches_in_round, next_match_number_for, next_round_for, play_in_count,
    rounds_required, teams_after_round_one,
};
pub use invites::{accept_invite, deny_invite, expire_stale_invites, send_invite};
pub use lifecycle::{
    cancel_tournament, complete_tournament, lock_and_seed, lock_and_seed_with_rng,
    open_registration, set_seeding_method, start_tournament,
};
pub use registration::{
    add_member, disqualify_team, import_teams_csv, promote_from_waitlist, register_team,
    remove_member, rename_team, set_manual_seed, withdraw_team,
};
