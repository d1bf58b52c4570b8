//! Tournament lifecycle: DRAFT → REG_OPEN → LOCKED → IN_PROGRESS → COMPLETED,
//! with CANCELLED reachable from anything short of COMPLETED.

use crate::logic::bracket::build_bracket;
use crate::models::{SeedingMethod, TeamStatus, Tournament, TournamentError, TournamentStatus};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

fn transition_error(tournament: &Tournament, to: TournamentStatus) -> TournamentError {
    TournamentError::InvalidTransition {
        from: tournament.status,
        to,
    }
}

/// Open registration (Draft → RegOpen). Already-open tournaments are left as they are.
pub fn open_registration(tournament: &mut Tournament) -> Result<(), TournamentError> {
    match tournament.status {
        TournamentStatus::RegOpen => Ok(()),
        TournamentStatus::Draft => {
            tournament.status = TournamentStatus::RegOpen;
            tournament.registration_opens_at.get_or_insert_with(Utc::now);
            log::info!("Tournament {} open for registration", tournament.id);
            Ok(())
        }
        _ => Err(transition_error(tournament, TournamentStatus::RegOpen)),
    }
}

/// Switch seeding method (only before lock).
pub fn set_seeding_method(
    tournament: &mut Tournament,
    method: SeedingMethod,
) -> Result<(), TournamentError> {
    if !tournament.status.accepts_registration() {
        return Err(TournamentError::InvalidState("seeding can only change before lock"));
    }
    tournament.seeding_method = method;
    Ok(())
}

/// Lock registration and seed ACTIVE teams using the thread RNG for RANDOM seeding.
pub fn lock_and_seed(tournament: &mut Tournament) -> Result<(), TournamentError> {
    lock_and_seed_with_rng(tournament, &mut rand::thread_rng())
}

/// Lock registration and give every unseeded ACTIVE team a seed.
///
/// 1. FIRST_COME: registration order.
/// 2. RANDOM: uniform shuffle.
/// 3. MANUAL: already-seeded teams by seed, then the rest in registration order.
///
/// Teams are numbered by position from 1, skipping numbers already held, so seeds
/// stay unique. Existing seeds are never changed.
pub fn lock_and_seed_with_rng<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::RegOpen {
        return Err(transition_error(tournament, TournamentStatus::Locked));
    }

    let mut ordering: Vec<usize> = tournament
        .teams
        .iter()
        .enumerate()
        .filter(|(_, t)| t.status == TeamStatus::Active)
        .map(|(i, _)| i)
        .collect();
    if ordering.len() < 2 {
        return Err(TournamentError::NotEnoughTeams {
            active: ordering.len() as u32,
        });
    }

    match tournament.seeding_method {
        SeedingMethod::FirstCome => {}
        SeedingMethod::Random => ordering.shuffle(rng),
        SeedingMethod::Manual => {
            let teams = &tournament.teams;
            // Stable: unseeded teams keep registration order after the seeded ones.
            ordering.sort_by_key(|&i| teams[i].seed.unwrap_or(u32::MAX));
        }
    }

    let mut taken: HashSet<u32> = ordering
        .iter()
        .filter_map(|&i| tournament.teams[i].seed)
        .collect();
    for (pos, &i) in ordering.iter().enumerate() {
        if tournament.teams[i].seed.is_some() {
            continue;
        }
        let mut seed = pos as u32 + 1;
        while taken.contains(&seed) {
            seed += 1;
        }
        taken.insert(seed);
        tournament.teams[i].seed = Some(seed);
    }

    tournament.status = TournamentStatus::Locked;
    tournament.registration_closes_at = Some(Utc::now());
    log::info!(
        "Tournament {} locked with {} seeded team(s) ({:?})",
        tournament.id,
        ordering.len(),
        tournament.seeding_method
    );
    Ok(())
}

/// Start the tournament (Locked → InProgress): materialise every round of the bracket.
pub fn start_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Locked {
        return Err(transition_error(tournament, TournamentStatus::InProgress));
    }
    build_bracket(tournament)?;
    if tournament.bracket_size.is_none() {
        tournament.bracket_size = Some(tournament.team_count.max(2).next_power_of_two());
    }
    tournament.status = TournamentStatus::InProgress;
    tournament.started_at = Some(Utc::now());
    log::info!(
        "Tournament {} started: {} match(es) over {} round(s)",
        tournament.id,
        tournament.bracket.len(),
        tournament.bracket.rounds
    );
    Ok(())
}

/// Admin closes a running tournament (InProgress → Completed).
pub fn complete_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::InProgress {
        return Err(transition_error(tournament, TournamentStatus::Completed));
    }
    tournament.status = TournamentStatus::Completed;
    tournament.completed_at = Some(Utc::now());
    log::info!("Tournament {} completed", tournament.id);
    Ok(())
}

/// Cancel from any state before Completed. Cancelled is terminal.
pub fn cancel_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.status.is_terminal() {
        return Err(transition_error(tournament, TournamentStatus::Cancelled));
    }
    let from = tournament.status;
    tournament.status = TournamentStatus::Cancelled;
    tournament.cancelled_at = Some(Utc::now());
    log::info!("Tournament {} cancelled (was {})", tournament.id, from);
    Ok(())
}
