//! Match results and winner advancement through the bracket.

use crate::logic::bracket::{next_match_number_for, next_round_for};
use crate::models::{
    Bracket, GameMatch, MatchKey, MatchResult, MatchStatus, Outcome, Side, Slot, TeamId,
    Tournament, TournamentError, TournamentStatus,
};
use chrono::{DateTime, Utc};

/// Winner, loser and recorded result for an outcome. The winner's slot must hold a team.
fn decide(
    m: &GameMatch,
    outcome: Outcome,
) -> Result<(TeamId, Option<TeamId>, MatchResult), TournamentError> {
    let key = m.key();
    let required = |side: Side| {
        m.slot(side)
            .team()
            .ok_or(TournamentError::EmptySlot { key, side })
    };
    Ok(match outcome {
        Outcome::A => (required(Side::A)?, m.team_b.team(), MatchResult::TeamA),
        Outcome::B => (required(Side::B)?, m.team_a.team(), MatchResult::TeamB),
        Outcome::Bye => {
            let winner = m.team_a.team().or(m.team_b.team());
            let winner = winner.ok_or(TournamentError::EmptySlot { key, side: Side::A })?;
            (winner, None, MatchResult::Bye)
        }
        Outcome::DqA => (required(Side::B)?, m.team_a.team(), MatchResult::DqA),
        Outcome::DqB => (required(Side::A)?, m.team_b.team(), MatchResult::DqB),
    })
}

/// The next match as it will look once `winner` from `from` has been placed.
///
/// Odd match numbers feed slot A and even ones slot B. When that slot already holds
/// another team (a bye placed at build time) the winner takes the other slot.
fn place_winner(
    bracket: &Bracket,
    from: MatchKey,
    next: MatchKey,
    winner: TeamId,
) -> Result<GameMatch, TournamentError> {
    let side = from.feeds_side();
    let Some(existing) = bracket.get(next) else {
        log::warn!("Match {} missing, creating it for the winner of {}", next, from);
        let next_next = (next.round < bracket.rounds).then(|| {
            MatchKey::new(next_round_for(next.round), next_match_number_for(next.match_number))
        });
        let mut created = GameMatch::new(next, next_next);
        *created.slot_mut(side) = Slot::Team(winner);
        return Ok(created);
    };

    if existing.is_complete() {
        return Err(TournamentError::InvalidState("the next match is already complete"));
    }
    let side = match (existing.slot(side), existing.slot(side.other())) {
        (Slot::Empty, _) => side,
        (Slot::Team(id), _) if id == winner => side,
        (_, Slot::Empty) => {
            log::warn!(
                "Slot {:?} of {} is taken, placing winner of {} in the other slot",
                side,
                next,
                from
            );
            side.other()
        }
        (_, Slot::Team(id)) if id == winner => side.other(),
        _ => return Err(TournamentError::NextSlotTaken(next)),
    };
    let mut updated = existing.clone();
    *updated.slot_mut(side) = Slot::Team(winner);
    log::debug!("Winner {} of {} advances to {} slot {:?}", winner, from, next, side);
    Ok(updated)
}

/// Record a match result and move the winner into the next round.
///
/// A match that is already complete is returned as it is, so repeated reports never
/// advance a team twice. The result and the advancement are applied together or not
/// at all.
pub fn submit_result(
    tournament: &mut Tournament,
    key: MatchKey,
    outcome: Outcome,
    score: Option<String>,
    dq_reason: Option<String>,
) -> Result<GameMatch, TournamentError> {
    let m = tournament
        .bracket
        .get(key)
        .ok_or(TournamentError::MatchNotFound(key))?;
    if m.is_complete() {
        return Ok(m.clone());
    }
    if tournament.status != TournamentStatus::InProgress {
        return Err(TournamentError::InvalidState(
            "results can only be reported while the tournament is in progress",
        ));
    }

    let (winner, loser, result) = decide(m, outcome)?;
    let advanced = match m.next {
        Some(next) => Some(place_winner(&tournament.bracket, key, next, winner)?),
        None => None,
    };

    let mut completed = m.clone();
    completed.status = MatchStatus::Complete;
    completed.completed_at = Some(Utc::now());
    completed.winner = Some(winner);
    completed.loser = loser;
    completed.result = Some(result);
    if score.is_some() {
        completed.score = score;
    }
    if dq_reason.is_some() {
        completed.dq_reason = dq_reason;
    }

    tournament.bracket.put(completed.clone());
    if let Some(next) = advanced {
        tournament.bracket.put(next);
    }
    log::info!(
        "Match {} of tournament {} complete: {:?}, winner {}",
        key,
        tournament.id,
        result,
        winner
    );
    Ok(completed)
}

/// Set when a match is due to be played.
pub fn schedule_match(
    tournament: &mut Tournament,
    key: MatchKey,
    at: DateTime<Utc>,
) -> Result<GameMatch, TournamentError> {
    let m = tournament
        .bracket
        .get_mut(key)
        .ok_or(TournamentError::MatchNotFound(key))?;
    if m.is_complete() {
        return Err(TournamentError::InvalidState("match is already complete"));
    }
    m.scheduled_at = Some(at);
    Ok(m.clone())
}

/// Mark a match as being played (Pending → Ongoing). Both slots must be filled.
pub fn start_match(
    tournament: &mut Tournament,
    key: MatchKey,
) -> Result<GameMatch, TournamentError> {
    if tournament.status != TournamentStatus::InProgress {
        return Err(TournamentError::InvalidState(
            "matches can only start while the tournament is in progress",
        ));
    }
    let m = tournament
        .bracket
        .get_mut(key)
        .ok_or(TournamentError::MatchNotFound(key))?;
    match m.status {
        MatchStatus::Ongoing => return Ok(m.clone()),
        MatchStatus::Complete => {
            return Err(TournamentError::InvalidState("match is already complete"))
        }
        MatchStatus::Pending => {}
    }
    for side in [Side::A, Side::B] {
        if m.slot(side).is_empty() {
            return Err(TournamentError::EmptySlot { key, side });
        }
    }
    m.status = MatchStatus::Ongoing;
    m.started_at = Some(Utc::now());
    Ok(m.clone())
}

/// Matches in bracket order, optionally narrowed to a round, a status and/or a team.
pub fn list_matches(
    tournament: &Tournament,
    round: Option<u32>,
    status: Option<MatchStatus>,
    team: Option<TeamId>,
) -> Vec<&GameMatch> {
    tournament
        .bracket
        .iter()
        .filter(|m| round.map_or(true, |r| m.round == r))
        .filter(|m| status.map_or(true, |s| m.status == s))
        .filter(|m| team.map_or(true, |t| m.involves(t)))
        .collect()
}

/// Winner of the final, once it has been played.
pub fn champion(tournament: &Tournament) -> Option<TeamId> {
    let rounds = tournament.bracket.rounds;
    if rounds == 0 {
        return None;
    }
    tournament
        .bracket
        .get(MatchKey::new(rounds, 1))
        .filter(|m| m.is_complete())
        .and_then(|m| m.winner)
}
