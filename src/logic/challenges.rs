//! Challenge coordinator: creating, answering and readying team challenges.

use crate::error::{MatchmakingError, Result};
use crate::models::{ChallengeId, ChallengeRequest, ChallengeStatus, Lobby, MatchId, TeamId};
use chrono::{DateTime, Utc};

/// The active challenge `team_id` is part of, if any.
pub fn active_challenge_for(
    lobby: &Lobby,
    team_id: TeamId,
    now: DateTime<Utc>,
) -> Option<&ChallengeRequest> {
    lobby
        .challenges
        .iter()
        .find(|c| c.involves(team_id) && c.is_active(now))
}

/// Challenge another team. Fails if either team already has an active challenge
/// with anyone. The challenge expires after the lobby's challenge TTL.
pub fn create_challenge(
    lobby: &mut Lobby,
    challenger: TeamId,
    challenged: TeamId,
    message: Option<String>,
    now: DateTime<Utc>,
) -> Result<ChallengeId> {
    if challenger == challenged {
        return Err(MatchmakingError::SelfChallenge);
    }
    for team_id in [challenger, challenged] {
        if lobby.team(team_id)?.is_in_match() {
            return Err(MatchmakingError::TeamInMatch);
        }
        if active_challenge_for(lobby, team_id, now).is_some() {
            return Err(MatchmakingError::ActiveChallengeExists);
        }
    }
    let message = message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    let challenge = ChallengeRequest::new(challenger, challenged, message, now, lobby.challenge_ttl);
    let id = challenge.id;
    log::info!(
        "Challenge {} created: {} vs {}, expires {}",
        id,
        challenger,
        challenged,
        challenge.expires_at
    );
    lobby.challenges.push(challenge);
    Ok(id)
}

/// Fail if either side of the challenge is already playing a match.
pub(crate) fn ensure_teams_free(lobby: &Lobby, challenge: &ChallengeRequest) -> Result<()> {
    for team_id in [challenge.challenger_team_id, challenge.challenged_team_id] {
        if lobby.team(team_id)?.is_in_match() {
            return Err(MatchmakingError::TeamInMatch);
        }
    }
    Ok(())
}

pub fn accept_challenge(lobby: &mut Lobby, id: ChallengeId, now: DateTime<Utc>) -> Result<()> {
    ensure_teams_free(lobby, lobby.challenge(id)?)?;
    lobby.challenge_mut(id)?.accept(now)?;
    log::info!("Challenge {} accepted", id);
    Ok(())
}

pub fn decline_challenge(lobby: &mut Lobby, id: ChallengeId, now: DateTime<Utc>) -> Result<()> {
    lobby.challenge_mut(id)?.decline(now)?;
    log::info!("Challenge {} declined", id);
    Ok(())
}

/// Flag `team_id` as ready. Returns false when the team is not party to the challenge.
pub fn mark_team_ready(lobby: &mut Lobby, id: ChallengeId, team_id: TeamId) -> Result<bool> {
    let challenge = lobby.challenge_mut(id)?;
    let marked = challenge.mark_team_ready(team_id);
    if marked {
        log::debug!("Team {} ready for challenge {}", team_id, id);
    }
    Ok(marked)
}

/// Move a ready challenge to started and link it to its match.
pub fn start_challenge_match(lobby: &mut Lobby, id: ChallengeId, match_id: MatchId) -> Result<()> {
    lobby.challenge_mut(id)?.start_match(match_id)
}

/// Settle a challenge from its match outcome: expired if the match was
/// cancelled, completed if it finished. ELO is left to the caller.
pub fn mark_match_completed(lobby: &mut Lobby, id: ChallengeId) -> Result<ChallengeStatus> {
    let match_id = lobby.challenge(id)?.match_id.ok_or(MatchmakingError::NoMatch)?;
    let game = lobby.game_match(match_id)?;
    let status = if game.is_cancelled {
        ChallengeStatus::Expired
    } else if game.is_finished {
        ChallengeStatus::Completed
    } else {
        return Err(MatchmakingError::MatchInProgress);
    };
    lobby.challenge_mut(id)?.status = status;
    log::info!("Challenge {} is now {}", id, status);
    Ok(status)
}

/// Lazy expiry sweep: pending/accepted challenges past `expires_at` become expired.
/// Returns how many changed.
pub fn expire_stale_challenges(lobby: &mut Lobby, now: DateTime<Utc>) -> usize {
    let expired = lobby
        .challenges
        .iter_mut()
        .map(|c| c.expire_if_stale(now))
        .filter(|&changed| changed)
        .count();
    if expired > 0 {
        log::info!("Expired {} stale challenge(s)", expired);
    }
    expired
}

/// Close every pending or accepted challenge involving `team_id` (the team is
/// going away). Returns how many were closed.
pub(crate) fn expire_challenges_of(lobby: &mut Lobby, team_id: TeamId) -> usize {
    let mut closed = 0;
    for c in lobby
        .challenges
        .iter_mut()
        .filter(|c| c.status.is_open() && c.status != ChallengeStatus::Started)
    {
        if let Some(opponent) = c.opponent_of(team_id) {
            c.status = ChallengeStatus::Expired;
            closed += 1;
            log::info!("Challenge {} against {} closed: team {} disbanded", c.id, opponent, team_id);
        }
    }
    closed
}
