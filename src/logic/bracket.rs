//! Bracket construction: Round 1 pairings, byes, and empty slots for every later round.

use crate::models::{
    GameMatch, MatchKey, Slot, TeamId, TeamStatus, Tournament, TournamentError, TournamentStatus,
};

pub fn next_round_for(round: u32) -> u32 {
    round + 1
}

pub fn next_match_number_for(match_number: u32) -> u32 {
    match_number.div_ceil(2)
}

/// Teams playing in Round 1 (the largest even number not above `team_count`).
pub fn play_in_count(team_count: u32) -> u32 {
    team_count - team_count % 2
}

/// Teams still alive after Round 1: one winner per Round 1 match plus the byes.
pub fn teams_after_round_one(team_count: u32) -> u32 {
    let play_in = play_in_count(team_count);
    play_in.div_ceil(2) + (team_count - play_in)
}

/// Rounds needed for `team_count` teams, final included.
pub fn rounds_required(team_count: u32) -> u32 {
    teams_after_round_one(team_count)
        .next_power_of_two()
        .trailing_zeros()
        + 1
}

/// Number of match records materialised for a round.
///
/// Round 2 gets one match per pair of survivors, rounded up. Later rounds only get
/// a match per full pair; an odd team out advances directly and its match is
/// created when it arrives.
pub fn matches_in_round(team_count: u32, round: u32) -> u32 {
    let rounds = rounds_required(team_count);
    let after_one = teams_after_round_one(team_count);
    match round {
        0 => 0,
        1 => play_in_count(team_count) / 2,
        r if r > rounds => 0,
        2 => after_one.div_ceil(2),
        r => after_one.div_ceil(1 << (r - 2)) / 2,
    }
}

/// ACTIVE teams ordered by seed (registration order breaks ties).
fn seeded_teams(tournament: &Tournament) -> Vec<TeamId> {
    let mut teams: Vec<_> = tournament
        .teams
        .iter()
        .filter(|t| t.status == TeamStatus::Active)
        .collect();
    teams.sort_by_key(|t| t.seed.unwrap_or(u32::MAX));
    teams.into_iter().map(|t| t.id).collect()
}

/// Build every match of the bracket from the seeded ACTIVE teams.
///
/// 1. Pair seeds (1v2), (3v4), ... in Round 1; with an odd count the last seed gets a bye.
/// 2. Create all of Round 2 empty and put bye teams in slot A of its last matches.
/// 3. Create the empty matches of Rounds 3..final.
///
/// Every match except the final points at `(round + 1, ceil(match_number / 2))`.
/// Existing matches are left untouched.
pub fn build_bracket(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Locked {
        return Err(TournamentError::InvalidState(
            "the bracket is built when a locked tournament starts",
        ));
    }
    let seeded = seeded_teams(tournament);
    let count = seeded.len() as u32;
    if count < 2 {
        return Err(TournamentError::NotEnoughTeams { active: count });
    }

    let rounds = rounds_required(count);
    let play_in = play_in_count(count) as usize;
    let next_for = |round: u32, match_number: u32| {
        (round < rounds).then(|| {
            MatchKey::new(next_round_for(round), next_match_number_for(match_number))
        })
    };

    let mut matches = Vec::new();

    for (i, pair) in seeded[..play_in].chunks_exact(2).enumerate() {
        let number = i as u32 + 1;
        matches.push(
            GameMatch::new(MatchKey::new(1, number), next_for(1, number))
                .with_teams(Slot::Team(pair[0]), Slot::Team(pair[1])),
        );
    }

    if rounds >= 2 {
        let byes = &seeded[play_in..];
        let round_two = matches_in_round(count, 2);
        let first_bye_match = round_two + 1 - byes.len() as u32;
        for number in 1..=round_two {
            let mut m = GameMatch::new(MatchKey::new(2, number), next_for(2, number));
            if number >= first_bye_match {
                m.team_a = Slot::Team(byes[(number - first_bye_match) as usize]);
            }
            matches.push(m);
        }
    }

    for round in 3..=rounds {
        for number in 1..=matches_in_round(count, round) {
            matches.push(GameMatch::new(
                MatchKey::new(round, number),
                next_for(round, number),
            ));
        }
    }

    let total = matches.len();
    let mut inserted = 0;
    for m in matches {
        if tournament.bracket.insert_if_absent(m) {
            inserted += 1;
        }
    }
    tournament.bracket.rounds = rounds;
    log::debug!(
        "Bracket for tournament {}: {} team(s), {} round(s), {} of {} match(es) created",
        tournament.id,
        count,
        rounds,
        inserted,
        total
    );
    Ok(())
}
