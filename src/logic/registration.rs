//! Team registry: registration, membership, waitlist promotion and terminal status changes.
//!
//! Every function checks all of its guards before touching the tournament, so a
//! failed call leaves teams and counters exactly as they were.

use crate::models::{
    Team, TeamId, TeamStatus, Tournament, TournamentError, TournamentStatus, UserId, MAX_MEMBERS,
};
use chrono::Utc;
use serde::Deserialize;

/// Register a team. Lands on the waitlist while the tournament is still Draft or
/// when the ACTIVE cap is already met; otherwise ACTIVE.
pub fn register_team(
    tournament: &mut Tournament,
    member_ids: Vec<UserId>,
    team_name: &str,
    owner_id: &str,
) -> Result<Team, TournamentError> {
    if !tournament.status.accepts_registration() {
        return Err(TournamentError::RegistrationClosed(tournament.status));
    }
    let name = team_name.trim();
    if name.is_empty() {
        return Err(TournamentError::EmptyName);
    }

    let mut members: Vec<UserId> = Vec::with_capacity(member_ids.len());
    for id in member_ids {
        let id = id.trim().to_string();
        if !id.is_empty() && !members.contains(&id) {
            members.push(id);
        }
    }
    if members.is_empty() || members.len() > MAX_MEMBERS {
        return Err(TournamentError::InvalidMemberCount(members.len()));
    }
    if let Some(taken) = members
        .iter()
        .find(|m| tournament.live_team_of(m, None).is_some())
    {
        return Err(TournamentError::DuplicateMember(taken.clone()));
    }
    if tournament.name_taken(name, None) {
        return Err(TournamentError::DuplicateName(name.to_string()));
    }

    let status = if tournament.status == TournamentStatus::Draft || tournament.is_at_capacity() {
        TeamStatus::Waitlist
    } else {
        TeamStatus::Active
    };
    let team = Team::new(tournament.id, name, owner_id.trim(), members, status);
    let idx = tournament.push_team(team);
    let team = &tournament.teams[idx];
    log::info!(
        "Registered team {:?} ({}) in tournament {} as {:?}",
        team.name,
        team.id,
        tournament.id,
        team.status
    );
    Ok(team.clone())
}

/// Add a participant to a live team. Adding an existing member is a no-op.
pub fn add_member(
    tournament: &mut Tournament,
    team_id: TeamId,
    user_id: &str,
) -> Result<Team, TournamentError> {
    let idx = tournament.team_index(team_id)?;
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(TournamentError::InvalidState("participant id must not be empty"));
    }
    let team = &tournament.teams[idx];
    if !team.is_live() {
        return Err(TournamentError::TeamNotLive(team_id));
    }
    if team.has_member(user_id) {
        return Ok(team.clone());
    }
    if team.is_full() {
        return Err(TournamentError::InvalidMemberCount(team.member_ids.len() + 1));
    }
    if tournament.live_team_of(user_id, Some(team_id)).is_some() {
        return Err(TournamentError::DuplicateMember(user_id.to_string()));
    }

    let team = &mut tournament.teams[idx];
    team.member_ids.push(user_id.to_string());
    if team.captain_id.is_none() {
        team.captain_id = Some(user_id.to_string());
    }
    log::debug!("Added {} to team {}", user_id, team_id);
    Ok(team.clone())
}

/// Remove a participant. The captaincy passes to a remaining member; a team left
/// without members is withdrawn.
pub fn remove_member(
    tournament: &mut Tournament,
    team_id: TeamId,
    user_id: &str,
) -> Result<Team, TournamentError> {
    let idx = tournament.team_index(team_id)?;
    if !tournament.teams[idx].has_member(user_id) {
        return Ok(tournament.teams[idx].clone());
    }

    let team = &mut tournament.teams[idx];
    team.member_ids.retain(|m| m != user_id);
    if team.captain_id.as_deref() == Some(user_id) {
        team.captain_id = team.member_ids.first().cloned();
    }
    let now_empty = team.member_ids.is_empty();
    if now_empty && team.is_live() {
        tournament.set_team_status(idx, TeamStatus::Withdrawn);
        log::info!("Team {} withdrawn: last member left", team_id);
    }
    Ok(tournament.teams[idx].clone())
}

/// Rename a team; names are unique per tournament (case-insensitive).
pub fn rename_team(
    tournament: &mut Tournament,
    team_id: TeamId,
    team_name: &str,
) -> Result<Team, TournamentError> {
    let idx = tournament.team_index(team_id)?;
    let name = team_name.trim();
    if name.is_empty() {
        return Err(TournamentError::EmptyName);
    }
    if tournament.name_taken(name, Some(team_id)) {
        return Err(TournamentError::DuplicateName(name.to_string()));
    }
    tournament.teams[idx].name = name.to_string();
    Ok(tournament.teams[idx].clone())
}

/// Move a waitlisted team to ACTIVE. Only before lock, and only under the cap.
pub fn promote_from_waitlist(
    tournament: &mut Tournament,
    team_id: TeamId,
) -> Result<Team, TournamentError> {
    if !tournament.status.accepts_registration() {
        return Err(TournamentError::InvalidState("teams can only be promoted before lock"));
    }
    let idx = tournament.team_index(team_id)?;
    match tournament.teams[idx].status {
        TeamStatus::Active => return Ok(tournament.teams[idx].clone()),
        TeamStatus::Disqualified | TeamStatus::Withdrawn => {
            return Err(TournamentError::TeamNotLive(team_id))
        }
        TeamStatus::Waitlist => {}
    }
    if let Some(max_teams) = tournament.max_teams.filter(|_| tournament.is_at_capacity()) {
        return Err(TournamentError::AtCapacity { max_teams });
    }

    tournament.set_team_status(idx, TeamStatus::Active);
    log::info!("Promoted team {} from waitlist", team_id);
    Ok(tournament.teams[idx].clone())
}

/// Disqualify a live team. Teams that already left are returned unchanged.
pub fn disqualify_team(
    tournament: &mut Tournament,
    team_id: TeamId,
    reason: Option<String>,
) -> Result<Team, TournamentError> {
    let idx = tournament.team_index(team_id)?;
    if !tournament.teams[idx].is_live() {
        return Ok(tournament.teams[idx].clone());
    }
    tournament.set_team_status(idx, TeamStatus::Disqualified);
    let team = &mut tournament.teams[idx];
    team.dq_reason = reason;
    team.dq_at = Some(Utc::now());
    log::info!("Disqualified team {} ({:?})", team_id, team.dq_reason);
    Ok(team.clone())
}

/// Withdraw a team. No-op for teams that already left (withdrawn or disqualified).
pub fn withdraw_team(tournament: &mut Tournament, team_id: TeamId) -> Result<Team, TournamentError> {
    let idx = tournament.team_index(team_id)?;
    if !tournament.teams[idx].is_live() {
        return Ok(tournament.teams[idx].clone());
    }
    tournament.set_team_status(idx, TeamStatus::Withdrawn);
    log::info!("Team {} withdrew", team_id);
    Ok(tournament.teams[idx].clone())
}

/// Pin a seed ahead of lock, for MANUAL seeding.
pub fn set_manual_seed(
    tournament: &mut Tournament,
    team_id: TeamId,
    seed: u32,
) -> Result<Team, TournamentError> {
    if !tournament.status.accepts_registration() {
        return Err(TournamentError::InvalidState("seeds can only be set before lock"));
    }
    let idx = tournament.team_index(team_id)?;
    if !tournament.teams[idx].is_live() {
        return Err(TournamentError::TeamNotLive(team_id));
    }
    if seed == 0 {
        return Err(TournamentError::InvalidState("seeds start at 1"));
    }
    let taken = tournament
        .teams
        .iter()
        .any(|t| t.id != team_id && t.is_live() && t.seed == Some(seed));
    if taken {
        return Err(TournamentError::SeedTaken(seed));
    }
    tournament.teams[idx].seed = Some(seed);
    Ok(tournament.teams[idx].clone())
}

#[derive(Deserialize)]
struct TeamRow {
    team_name: String,
    owner_id: String,
    member_1: String,
    #[serde(default)]
    member_2: Option<String>,
}

/// Register every row of a `team_name,owner_id,member_1,member_2` CSV.
/// All rows register or none do.
pub fn import_teams_csv<R: std::io::Read>(
    tournament: &mut Tournament,
    reader: R,
) -> Result<Vec<Team>, TournamentError> {
    let mut staged = tournament.clone();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut registered = Vec::new();
    for row in rdr.deserialize::<TeamRow>() {
        let row = row.map_err(|e| TournamentError::Csv(e.to_string()))?;
        let mut members = vec![row.member_1];
        members.extend(row.member_2.filter(|m| !m.is_empty()));
        registered.push(register_team(&mut staged, members, &row.team_name, &row.owner_id)?);
    }

    *tournament = staged;
    log::info!(
        "Imported {} team(s) into tournament {}",
        registered.len(),
        tournament.id
    );
    Ok(registered)
}
