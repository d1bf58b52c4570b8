//! Team invitations: a member of a one-person team invites a partner.

use crate::logic::registration::add_member;
use crate::models::{
    Invite, InviteId, InviteStatus, TeamId, Tournament, TournamentError, TournamentStatus,
};
use chrono::{DateTime, Duration, Utc};

/// Invite `invitee_id` onto the inviter's team. Re-sending a pending invite returns it.
pub fn send_invite(
    tournament: &mut Tournament,
    team_id: TeamId,
    inviter_id: &str,
    invitee_id: &str,
    ttl: Option<Duration>,
) -> Result<Invite, TournamentError> {
    if tournament.status != TournamentStatus::RegOpen {
        return Err(TournamentError::RegistrationClosed(tournament.status));
    }
    if inviter_id == invitee_id {
        return Err(TournamentError::InvalidState("you can't invite yourself"));
    }
    let team = &tournament.teams[tournament.team_index(team_id)?];
    if !team.is_live() {
        return Err(TournamentError::TeamNotLive(team_id));
    }
    if !team.has_member(inviter_id) {
        return Err(TournamentError::InvalidState("only team members can send invites"));
    }
    if team.is_full() {
        return Err(TournamentError::InvalidMemberCount(team.member_ids.len() + 1));
    }
    if tournament.live_team_of(invitee_id, None).is_some() {
        return Err(TournamentError::DuplicateMember(invitee_id.to_string()));
    }
    if let Some(pending) = tournament
        .invites
        .iter()
        .find(|i| i.is_pending() && i.inviter_id == inviter_id && i.invitee_id == invitee_id)
    {
        return Ok(pending.clone());
    }

    let expires_at = ttl.map(|ttl| Utc::now() + ttl);
    let invite = Invite::new(tournament.id, team_id, inviter_id, invitee_id, expires_at);
    log::info!(
        "{} invited {} to team {} (invite {})",
        inviter_id,
        invitee_id,
        team_id,
        invite.id
    );
    tournament.invites.push(invite.clone());
    Ok(invite)
}

fn answerable(tournament: &Tournament, idx: usize, user_id: &str) -> Result<(), TournamentError> {
    let invite = &tournament.invites[idx];
    if invite.invitee_id != user_id {
        return Err(TournamentError::InvalidState("only the invitee can answer an invite"));
    }
    if !invite.is_pending() {
        return Err(TournamentError::InvalidState("invite is no longer pending"));
    }
    Ok(())
}

/// Accept an invite. Returns the invite with its final status:
/// EXPIRED when registration closed, the invite lapsed or the team can no longer take
/// a member; DENIED when the invitee joined another team meanwhile; else ACCEPTED.
pub fn accept_invite(
    tournament: &mut Tournament,
    invite_id: InviteId,
    user_id: &str,
) -> Result<Invite, TournamentError> {
    let idx = tournament.invite_index(invite_id)?;
    answerable(tournament, idx, user_id)?;

    let team_id = tournament.invites[idx].team_id;
    let lapsed = tournament.invites[idx].is_past_expiry(Utc::now());
    let team_open = tournament
        .team(team_id)
        .is_some_and(|t| t.is_live() && !t.is_full());
    let status = if tournament.status != TournamentStatus::RegOpen || lapsed || !team_open {
        InviteStatus::Expired
    } else if tournament.live_team_of(user_id, None).is_some() {
        InviteStatus::Denied
    } else {
        add_member(tournament, team_id, user_id)?;
        InviteStatus::Accepted
    };

    let invite = &mut tournament.invites[idx];
    invite.status = status;
    log::info!("Invite {} answered by {}: {:?}", invite_id, user_id, status);
    Ok(invite.clone())
}

pub fn deny_invite(
    tournament: &mut Tournament,
    invite_id: InviteId,
    user_id: &str,
) -> Result<Invite, TournamentError> {
    let idx = tournament.invite_index(invite_id)?;
    answerable(tournament, idx, user_id)?;
    let invite = &mut tournament.invites[idx];
    invite.status = InviteStatus::Denied;
    Ok(invite.clone())
}

/// Expire every pending invite whose deadline has passed. Returns how many expired.
pub fn expire_stale_invites(tournament: &mut Tournament, now: DateTime<Utc>) -> usize {
    let mut expired = 0;
    for invite in tournament
        .invites
        .iter_mut()
        .filter(|i| i.is_pending() && i.is_past_expiry(now))
    {
        invite.status = InviteStatus::Expired;
        expired += 1;
    }
    expired
}
