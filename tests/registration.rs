//! Integration tests for the team registry: registration, membership, waitlist and counters.

use bracket_tournament_web::{
    add_member, disqualify_team, import_teams_csv, lock_and_seed, open_registration,
    promote_from_waitlist, register_team, remove_member, rename_team, set_manual_seed,
    withdraw_team, ErrorKind, Team, TeamStatus, Tournament, TournamentError, TournamentOptions,
    TournamentStatus,
};

fn tournament(max_teams: Option<u32>) -> Tournament {
    Tournament::new(TournamentOptions {
        max_teams,
        ..TournamentOptions::named("Uno Cup")
    })
    .unwrap()
}

fn open_tournament(max_teams: Option<u32>) -> Tournament {
    let mut t = tournament(max_teams);
    open_registration(&mut t).unwrap();
    t
}

fn register(t: &mut Tournament, name: &str, members: &[&str]) -> Team {
    register_team(
        t,
        members.iter().map(|m| m.to_string()).collect(),
        name,
        members[0],
    )
    .unwrap()
}

fn assert_counters_match(t: &Tournament) {
    let active = t.teams.iter().filter(|x| x.status == TeamStatus::Active).count() as u32;
    let waitlist = t.teams.iter().filter(|x| x.status == TeamStatus::Waitlist).count() as u32;
    assert_eq!(t.team_count, active);
    assert_eq!(t.waitlist_count, waitlist);
}

#[test]
fn registration_in_open_tournament_is_active() {
    let mut t = open_tournament(None);
    let team = register(&mut t, "Reverse", &["u1", "u2"]);
    assert_eq!(team.status, TeamStatus::Active);
    assert_eq!(team.member_ids, vec!["u1", "u2"]);
    assert_eq!(team.captain_id.as_deref(), Some("u1"));
    assert_eq!(team.seed, None);
    assert_eq!(t.team_count, 1);
    assert_eq!(t.waitlist_count, 0);
}

#[test]
fn registration_in_draft_goes_to_waitlist() {
    let mut t = tournament(None);
    let team = register(&mut t, "Skip", &["u1"]);
    assert_eq!(team.status, TeamStatus::Waitlist);
    assert_eq!(t.team_count, 0);
    assert_eq!(t.waitlist_count, 1);
}

#[test]
fn team_over_cap_is_waitlisted() {
    let mut t = open_tournament(Some(8));
    for i in 0..8 {
        let member = format!("u{i}");
        let team = register(&mut t, &format!("Team {i}"), &[member.as_str()]);
        assert_eq!(team.status, TeamStatus::Active);
    }
    let ninth = register(&mut t, "Team 8", &["u8"]);
    assert_eq!(ninth.status, TeamStatus::Waitlist);
    assert_eq!(t.team_count, 8);
    assert_eq!(t.waitlist_count, 1);
    assert_counters_match(&t);
}

#[test]
fn member_count_must_be_one_or_two() {
    let mut t = open_tournament(None);
    assert_eq!(
        register_team(&mut t, vec![], "Empty", "u1"),
        Err(TournamentError::InvalidMemberCount(0))
    );
    let three = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let err = register_team(&mut t, three, "Crowd", "a").unwrap_err();
    assert_eq!(err, TournamentError::InvalidMemberCount(3));
    assert_eq!(err.kind(), ErrorKind::InvalidMemberCount);

    // Duplicates collapse before the count is checked.
    let team = register(&mut t, "Solo", &["u1", "u1"]);
    assert_eq!(team.member_ids, vec!["u1"]);
    assert_eq!(t.teams.len(), 1);
}

#[test]
fn member_cannot_join_two_live_teams() {
    let mut t = open_tournament(None);
    register(&mut t, "Red", &["u1", "u2"]);
    let err = register_team(&mut t, vec!["u3".into(), "u2".into()], "Blue", "u3").unwrap_err();
    assert_eq!(err, TournamentError::DuplicateMember("u2".into()));
    assert_eq!(err.kind(), ErrorKind::DuplicateMember);
    assert_eq!(t.teams.len(), 1);
    assert_counters_match(&t);
}

#[test]
fn withdrawn_team_members_may_register_again() {
    let mut t = open_tournament(None);
    let red = register(&mut t, "Red", &["u1"]);
    withdraw_team(&mut t, red.id).unwrap();
    let blue = register(&mut t, "Blue", &["u1"]);
    assert_eq!(blue.status, TeamStatus::Active);
    assert_counters_match(&t);
}

#[test]
fn team_names_are_unique_ignoring_case() {
    let mut t = open_tournament(None);
    register(&mut t, "Draw Four", &["u1"]);
    let err = register_team(&mut t, vec!["u2".into()], "  draw four ", "u2").unwrap_err();
    assert_eq!(err, TournamentError::DuplicateName("draw four".into()));
    assert_eq!(err.kind(), ErrorKind::DuplicateName);
}

#[test]
fn registration_closes_at_lock() {
    let mut t = open_tournament(None);
    register(&mut t, "A", &["u1"]);
    register(&mut t, "B", &["u2"]);
    lock_and_seed(&mut t).unwrap();
    assert_eq!(
        register_team(&mut t, vec!["u3".into()], "C", "u3"),
        Err(TournamentError::RegistrationClosed(TournamentStatus::Locked))
    );
    assert_eq!(t.teams.len(), 2);
}

#[test]
fn promotion_respects_capacity() {
    let mut t = open_tournament(Some(2));
    let a = register(&mut t, "A", &["u1"]);
    register(&mut t, "B", &["u2"]);
    let c = register(&mut t, "C", &["u3"]);
    assert_eq!(c.status, TeamStatus::Waitlist);

    let err = promote_from_waitlist(&mut t, c.id).unwrap_err();
    assert_eq!(err, TournamentError::AtCapacity { max_teams: 2 });
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert_eq!((t.team_count, t.waitlist_count), (2, 1));

    withdraw_team(&mut t, a.id).unwrap();
    assert_eq!((t.team_count, t.waitlist_count), (1, 1));
    let promoted = promote_from_waitlist(&mut t, c.id).unwrap();
    assert_eq!(promoted.status, TeamStatus::Active);
    assert_eq!((t.team_count, t.waitlist_count), (2, 0));
    assert_counters_match(&t);
}

#[test]
fn promotion_in_draft_and_after_lock() {
    let mut t = tournament(None);
    let a = register(&mut t, "A", &["u1"]);
    let b = register(&mut t, "B", &["u2"]);
    let c = register(&mut t, "C", &["u3"]);
    promote_from_waitlist(&mut t, a.id).unwrap();
    promote_from_waitlist(&mut t, b.id).unwrap();
    // Promoting an already active team changes nothing.
    promote_from_waitlist(&mut t, b.id).unwrap();
    assert_eq!((t.team_count, t.waitlist_count), (2, 1));

    open_registration(&mut t).unwrap();
    lock_and_seed(&mut t).unwrap();
    let err = promote_from_waitlist(&mut t, c.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(t.team(c.id).unwrap().status, TeamStatus::Waitlist);
    assert_counters_match(&t);
}

#[test]
fn add_member_checks_size_and_uniqueness() {
    let mut t = open_tournament(None);
    let red = register(&mut t, "Red", &["u1"]);
    register(&mut t, "Blue", &["u3"]);

    assert_eq!(
        add_member(&mut t, red.id, "u3"),
        Err(TournamentError::DuplicateMember("u3".into()))
    );
    let red = add_member(&mut t, red.id, "u2").unwrap();
    assert_eq!(red.member_ids, vec!["u1", "u2"]);
    // Re-adding is a no-op.
    assert_eq!(add_member(&mut t, red.id, "u2").unwrap().member_ids.len(), 2);
    assert_eq!(
        add_member(&mut t, red.id, "u4"),
        Err(TournamentError::InvalidMemberCount(3))
    );
}

#[test]
fn removing_captain_and_last_member() {
    let mut t = open_tournament(None);
    let red = register(&mut t, "Red", &["u1", "u2"]);

    let red = remove_member(&mut t, red.id, "u1").unwrap();
    assert_eq!(red.member_ids, vec!["u2"]);
    assert_eq!(red.captain_id.as_deref(), Some("u2"));
    assert_eq!(red.status, TeamStatus::Active);

    let red = remove_member(&mut t, red.id, "u2").unwrap();
    assert!(red.member_ids.is_empty());
    assert_eq!(red.captain_id, None);
    assert_eq!(red.status, TeamStatus::Withdrawn);
    assert_eq!(t.team_count, 0);
    assert_counters_match(&t);
}

#[test]
fn disqualify_and_withdraw_adjust_counters_once() {
    let mut t = open_tournament(Some(2));
    let a = register(&mut t, "A", &["u1"]);
    register(&mut t, "B", &["u2"]);
    let c = register(&mut t, "C", &["u3"]);
    assert_eq!(c.status, TeamStatus::Waitlist);
    assert_eq!((t.team_count, t.waitlist_count), (2, 1));

    let a = disqualify_team(&mut t, a.id, Some("no show".into())).unwrap();
    assert_eq!(a.status, TeamStatus::Disqualified);
    assert_eq!(a.dq_reason.as_deref(), Some("no show"));
    assert!(a.dq_at.is_some());
    assert_eq!((t.team_count, t.waitlist_count), (1, 1));

    disqualify_team(&mut t, a.id, None).unwrap();
    withdraw_team(&mut t, a.id).unwrap();
    let a = t.team(a.id).unwrap();
    assert_eq!(a.status, TeamStatus::Disqualified);
    assert_eq!(a.dq_reason.as_deref(), Some("no show"));
    assert_eq!((t.team_count, t.waitlist_count), (1, 1));

    withdraw_team(&mut t, c.id).unwrap();
    assert_eq!(t.team(c.id).unwrap().status, TeamStatus::Withdrawn);
    assert_eq!((t.team_count, t.waitlist_count), (1, 0));
    withdraw_team(&mut t, c.id).unwrap();
    assert_eq!((t.team_count, t.waitlist_count), (1, 0));
    assert_counters_match(&t);
}

#[test]
fn withdrawn_team_cannot_be_disqualified() {
    let mut t = open_tournament(None);
    let a = register(&mut t, "A", &["u1"]);
    register(&mut t, "B", &["u2"]);
    withdraw_team(&mut t, a.id).unwrap();

    let a = disqualify_team(&mut t, a.id, Some("late".into())).unwrap();
    assert_eq!(a.status, TeamStatus::Withdrawn);
    assert_eq!(a.dq_reason, None);
    assert_eq!(a.dq_at, None);
    assert_eq!((t.team_count, t.waitlist_count), (1, 0));
    assert_counters_match(&t);
}

#[test]
fn blank_member_ids_are_rejected() {
    let mut t = open_tournament(None);
    let red = register(&mut t, "Red", &["u1"]);

    for blank in ["", "   "] {
        let err = add_member(&mut t, red.id, blank).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
    assert_eq!(t.team(red.id).unwrap().member_ids, vec!["u1"]);

    let red = add_member(&mut t, red.id, "  u2 ").unwrap();
    assert_eq!(red.member_ids, vec!["u1", "u2"]);
}

#[test]
fn rename_checks_other_teams_only() {
    let mut t = open_tournament(None);
    let red = register(&mut t, "Red", &["u1"]);
    register(&mut t, "Blue", &["u2"]);
    assert_eq!(rename_team(&mut t, red.id, "RED").unwrap().name, "RED");
    assert_eq!(
        rename_team(&mut t, red.id, "blue"),
        Err(TournamentError::DuplicateName("blue".into()))
    );
    assert_eq!(rename_team(&mut t, red.id, "  "), Err(TournamentError::EmptyName));
}

#[test]
fn team_names_compare_case_insensitively_beyond_ascii() {
    let mut t = open_tournament(None);
    let equipe = register(&mut t, "Équipe Rouge", &["u1"]);
    let err = register_team(&mut t, vec!["u2".into()], "équipe rouge", "u2").unwrap_err();
    assert_eq!(err, TournamentError::DuplicateName("équipe rouge".into()));

    let other = register(&mut t, "Straße", &["u3"]);
    assert_eq!(
        rename_team(&mut t, other.id, "STRASSE").unwrap().name,
        "STRASSE",
        "different letters are different names"
    );
    assert_eq!(
        rename_team(&mut t, other.id, "ÉQUIPE ROUGE"),
        Err(TournamentError::DuplicateName("ÉQUIPE ROUGE".into()))
    );
    assert_eq!(rename_team(&mut t, equipe.id, "ÉQUIPE ROUGE").unwrap().name, "ÉQUIPE ROUGE");
}

#[test]
fn manual_seed_must_be_free() {
    let mut t = open_tournament(None);
    let a = register(&mut t, "A", &["u1"]);
    let b = register(&mut t, "B", &["u2"]);
    set_manual_seed(&mut t, a.id, 1).unwrap();
    assert_eq!(set_manual_seed(&mut t, b.id, 1), Err(TournamentError::SeedTaken(1)));
    assert_eq!(set_manual_seed(&mut t, b.id, 0).unwrap_err().kind(), ErrorKind::InvalidState);
    assert_eq!(set_manual_seed(&mut t, b.id, 2).unwrap().seed, Some(2));
}

#[test]
fn csv_import_registers_all_rows() {
    let mut t = open_tournament(None);
    let csv = "team_name,owner_id,member_1,member_2\n\
               Red,u1,u1,u2\n\
               Blue,u3,u3,\n";
    let teams = import_teams_csv(&mut t, csv.as_bytes()).unwrap();
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].member_ids, vec!["u1", "u2"]);
    assert_eq!(teams[1].member_ids, vec!["u3"]);
    assert_eq!(t.team_count, 2);
}

#[test]
fn csv_import_is_all_or_nothing() {
    let mut t = open_tournament(None);
    let csv = "team_name,owner_id,member_1,member_2\n\
               Red,u1,u1,u2\n\
               Blue,u3,u3,u2\n";
    let err = import_teams_csv(&mut t, csv.as_bytes()).unwrap_err();
    assert_eq!(err, TournamentError::DuplicateMember("u2".into()));
    assert!(t.teams.is_empty());
    assert_eq!(t.team_count, 0);
}
