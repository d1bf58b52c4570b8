//! Result reporting, advancement and match queries.

use bracket_tournament_web::{
    build_bracket, champion, complete_tournament, list_matches, lock_and_seed, open_registration,
    register_team, schedule_match, start_match, start_tournament, submit_result, ErrorKind,
    GameMatch, MatchKey, MatchResult, MatchStatus, Outcome, Side, Slot, TeamId, Tournament,
    TournamentError, TournamentOptions,
};
use chrono::{TimeZone, Utc};

fn locked(n: usize) -> (Tournament, Vec<TeamId>) {
    let mut t = Tournament::new(TournamentOptions::named("Results Cup")).unwrap();
    open_registration(&mut t).unwrap();
    let ids = (0..n)
        .map(|i| {
            register_team(&mut t, vec![format!("p{i}")], &format!("Seed {}", i + 1), "admin")
                .unwrap()
                .id
        })
        .collect();
    lock_and_seed(&mut t).unwrap();
    (t, ids)
}

fn started(n: usize) -> (Tournament, Vec<TeamId>) {
    let (mut t, ids) = locked(n);
    start_tournament(&mut t).unwrap();
    (t, ids)
}

fn key(round: u32, match_number: u32) -> MatchKey {
    MatchKey::new(round, match_number)
}

fn get(t: &Tournament, k: MatchKey) -> &GameMatch {
    t.bracket.get(k).unwrap()
}

#[test]
fn disqualifying_a_advances_b_once() {
    let (mut t, ids) = started(4);
    let done = submit_result(&mut t, key(1, 1), Outcome::DqA, None, Some("late".into())).unwrap();
    assert_eq!(done.status, MatchStatus::Complete);
    assert_eq!(done.winner, Some(ids[1]));
    assert_eq!(done.loser, Some(ids[0]));
    assert_eq!(done.result, Some(MatchResult::DqA));
    assert_eq!(done.dq_reason.as_deref(), Some("late"));
    assert!(done.completed_at.is_some());
    assert_eq!(get(&t, key(2, 1)).team_a, Slot::Team(ids[1]));

    let snapshot = t.bracket.clone();
    let again = submit_result(&mut t, key(1, 1), Outcome::A, None, None).unwrap();
    assert_eq!(again, done);
    assert_eq!(t.bracket, snapshot);
}

#[test]
fn disqualifying_b_records_score_and_reason() {
    let (mut t, ids) = started(4);
    let done = submit_result(
        &mut t,
        key(1, 2),
        Outcome::DqB,
        Some("1-0".into()),
        Some("unsporting".into()),
    )
    .unwrap();
    assert_eq!(done.winner, Some(ids[2]));
    assert_eq!(done.loser, Some(ids[3]));
    assert_eq!(done.result, Some(MatchResult::DqB));
    assert_eq!(done.score.as_deref(), Some("1-0"));
    // Match 2 feeds slot B.
    assert_eq!(get(&t, key(2, 1)).team_b, Slot::Team(ids[2]));
}

#[test]
fn unknown_match_is_not_found() {
    let (mut t, _) = started(4);
    let err = submit_result(&mut t, key(5, 1), Outcome::A, None, None).unwrap_err();
    assert_eq!(err, TournamentError::MatchNotFound(key(5, 1)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn winner_slot_must_hold_a_team() {
    let (mut t, _) = started(5);
    let snapshot = t.bracket.clone();
    assert_eq!(
        submit_result(&mut t, key(2, 2), Outcome::B, None, None),
        Err(TournamentError::EmptySlot { key: key(2, 2), side: Side::B })
    );
    assert_eq!(
        submit_result(&mut t, key(2, 1), Outcome::Bye, None, None).unwrap_err().kind(),
        ErrorKind::InvalidState
    );
    assert_eq!(t.bracket, snapshot);
}

#[test]
fn bye_advances_the_lone_team() {
    let (mut t, ids) = started(5);
    let done = submit_result(&mut t, key(2, 2), Outcome::Bye, None, None).unwrap();
    assert_eq!(done.winner, Some(ids[4]));
    assert_eq!(done.loser, None);
    assert_eq!(done.result, Some(MatchResult::Bye));
    // Match 2 of round 2 feeds slot B of the final.
    let fin = get(&t, key(3, 1));
    assert_eq!((fin.team_a, fin.team_b), (Slot::Empty, Slot::Team(ids[4])));
}

#[test]
fn results_need_a_running_tournament() {
    let (mut t, _) = locked(4);
    build_bracket(&mut t).unwrap();
    let err = submit_result(&mut t, key(1, 1), Outcome::A, None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert!(!get(&t, key(1, 1)).is_complete());

    let (mut t, _) = started(4);
    complete_tournament(&mut t).unwrap();
    assert!(submit_result(&mut t, key(1, 1), Outcome::A, None, None).is_err());
}

#[test]
fn full_next_match_rejects_winner_without_changes() {
    let (mut t, ids) = locked(4);
    let blocker = GameMatch::new(key(2, 1), None)
        .with_teams(Slot::Team(ids[2]), Slot::Team(ids[3]));
    t.bracket.insert_if_absent(blocker);
    start_tournament(&mut t).unwrap();

    let snapshot = t.bracket.clone();
    assert_eq!(
        submit_result(&mut t, key(1, 1), Outcome::A, None, None),
        Err(TournamentError::NextSlotTaken(key(2, 1)))
    );
    assert_eq!(t.bracket, snapshot);
    assert!(!get(&t, key(1, 1)).is_complete());
}

#[test]
fn eight_teams_top_seed_wins_when_slot_a_always_wins() {
    let (mut t, ids) = started(8);
    for round in 1..=3 {
        let keys: Vec<MatchKey> = t.bracket.round(round).map(|m| m.key()).collect();
        for k in keys {
            submit_result(&mut t, k, Outcome::A, None, None).unwrap();
        }
    }
    assert_eq!(champion(&t), Some(ids[0]));
    let fin = get(&t, key(3, 1));
    assert_eq!((fin.team_a, fin.team_b), (Slot::Team(ids[0]), Slot::Team(ids[4])));
    assert_eq!(fin.loser, Some(ids[4]));
}

#[test]
fn starting_a_match() {
    let (mut t, _) = started(5);
    assert_eq!(
        start_match(&mut t, key(2, 1)),
        Err(TournamentError::EmptySlot { key: key(2, 1), side: Side::A })
    );

    let ongoing = start_match(&mut t, key(1, 1)).unwrap();
    assert_eq!(ongoing.status, MatchStatus::Ongoing);
    let started_at = ongoing.started_at;
    assert!(started_at.is_some());
    assert_eq!(start_match(&mut t, key(1, 1)).unwrap().started_at, started_at);

    submit_result(&mut t, key(1, 1), Outcome::B, None, None).unwrap();
    assert_eq!(
        start_match(&mut t, key(1, 1)).unwrap_err().kind(),
        ErrorKind::InvalidState
    );
}

#[test]
fn scheduling_a_match() {
    let (mut t, _) = started(4);
    let at = Utc.with_ymd_and_hms(2026, 11, 2, 18, 30, 0).unwrap();
    assert_eq!(schedule_match(&mut t, key(2, 1), at).unwrap().scheduled_at, Some(at));
    assert_eq!(
        schedule_match(&mut t, key(9, 9), at),
        Err(TournamentError::MatchNotFound(key(9, 9)))
    );

    submit_result(&mut t, key(1, 1), Outcome::A, None, None).unwrap();
    assert!(schedule_match(&mut t, key(1, 1), at).is_err());
}

#[test]
fn listing_filters_by_round_status_and_team() {
    let (mut t, ids) = started(8);
    assert_eq!(list_matches(&t, None, None, None).len(), 7);
    assert_eq!(list_matches(&t, Some(1), None, None).len(), 4);

    submit_result(&mut t, key(1, 1), Outcome::A, None, None).unwrap();
    let complete = list_matches(&t, None, Some(MatchStatus::Complete), None);
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].key(), key(1, 1));

    let top_seed: Vec<MatchKey> = list_matches(&t, None, None, Some(ids[0]))
        .iter()
        .map(|m| m.key())
        .collect();
    assert_eq!(top_seed, vec![key(1, 1), key(2, 1)]);
    assert_eq!(
        list_matches(&t, Some(2), Some(MatchStatus::Pending), Some(ids[1])).len(),
        0
    );
}
