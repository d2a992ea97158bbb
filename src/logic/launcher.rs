//! Match launcher: turns a ready challenge into a hosted match and settles it afterwards.
//!
//! Calls to the hosting API happen between a `prepare_*` step (read-only) and a
//! `commit_*` step (mutating), so callers never hold the lobby across an HTTP call.

use crate::api::{CreateMatchRequest, MatchTeam};
use crate::error::{MatchmakingError, Result};
use crate::logic::challenges::{ensure_teams_free, mark_match_completed, start_challenge_match};
use crate::logic::elo::apply_match_elo;
use crate::logic::servers::find_available_server;
use crate::models::{ChallengeId, GameMatch, Lobby, MatchId, ServerId, Side, Team, TeamId, TeamStatus};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

const CONNECT_PASSWORD_LEN: usize = 12;

/// Everything needed to ask the hosting API for a match, decided up front.
#[derive(Clone, Debug)]
pub struct LaunchPlan {
    pub challenge_id: ChallengeId,
    pub server_id: ServerId,
    pub team_1: TeamId,
    pub team_2: TeamId,
    pub request: CreateMatchRequest,
}

fn match_team(lobby: &Lobby, team: &Team) -> Result<MatchTeam> {
    let players = team
        .members
        .iter()
        .map(|&pid| lobby.player(pid).map(|p| p.steam_id.clone()))
        .collect::<Result<Vec<_>>>()?;
    Ok(MatchTeam {
        name: team.name.clone(),
        players,
    })
}

fn connect_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CONNECT_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// The challenge is unexpired, accepted with both sides ready, and neither team
/// is already playing.
fn ensure_launchable(lobby: &Lobby, challenge_id: ChallengeId, now: DateTime<Utc>) -> Result<()> {
    let challenge = lobby.challenge(challenge_id)?;
    if challenge.is_expired(now) {
        return Err(MatchmakingError::ChallengeExpired);
    }
    if !challenge.is_ready_to_start() {
        return Err(MatchmakingError::NotReady);
    }
    ensure_teams_free(lobby, challenge)
}

/// Check the challenge can start and pick a server for it.
pub fn prepare_launch(lobby: &Lobby, challenge_id: ChallengeId, now: DateTime<Utc>) -> Result<LaunchPlan> {
    ensure_launchable(lobby, challenge_id, now)?;
    let challenge = lobby.challenge(challenge_id)?;
    let team_1 = lobby.team(challenge.challenger_team_id)?;
    let team_2 = lobby.team(challenge.challenged_team_id)?;
    let server = find_available_server(lobby).ok_or(MatchmakingError::NoServerAvailable)?;

    Ok(LaunchPlan {
        challenge_id,
        server_id: server.id,
        team_1: team_1.id,
        team_2: team_2.id,
        request: CreateMatchRequest {
            server_address: server.address.clone(),
            server_port: server.port,
            connect_password: connect_password(),
            team_1: match_team(lobby, team_1)?,
            team_2: match_team(lobby, team_2)?,
        },
    })
}

/// Record a match the hosting API created for `plan`: occupy the server, start
/// the challenge and put both teams in the match.
///
/// Everything is re-checked before anything is written, since the lobby may
/// have moved while the API call was in flight. On failure the lobby is left
/// as it was (apart from a lazily expired challenge).
pub fn commit_launch(
    lobby: &mut Lobby,
    plan: &LaunchPlan,
    external_id: &str,
    now: DateTime<Utc>,
) -> Result<MatchId> {
    let expired = lobby.challenge_mut(plan.challenge_id)?.expire_if_stale(now);
    let checked = if expired {
        Err(MatchmakingError::ChallengeExpired)
    } else {
        ensure_launchable(lobby, plan.challenge_id, now).and_then(|_| {
            if lobby.server(plan.server_id)?.is_available() {
                Ok(())
            } else {
                Err(MatchmakingError::ServerUnavailable)
            }
        })
    };
    if let Err(e) = checked {
        log::warn!(
            "Challenge {} changed during launch ({}); hosted match {} is orphaned",
            plan.challenge_id,
            e,
            external_id
        );
        return Err(e);
    }

    let game = GameMatch::new(
        external_id,
        Some(plan.challenge_id),
        plan.server_id,
        plan.team_1,
        plan.team_2,
        now,
    );
    let match_id = game.id;
    lobby.server_mut(plan.server_id)?.start_match(match_id)?;
    start_challenge_match(lobby, plan.challenge_id, match_id)?;
    for team_id in [plan.team_1, plan.team_2] {
        lobby.team_mut(team_id)?.status = TeamStatus::InMatch;
    }
    lobby.matches.push(game);
    log::info!(
        "Match {} (hosted as {}) started for challenge {}",
        match_id,
        external_id,
        plan.challenge_id
    );
    Ok(match_id)
}

/// External id of a running match; errors if it already ended.
pub fn running_external_id(lobby: &Lobby, match_id: MatchId) -> Result<String> {
    let game = lobby.game_match(match_id)?;
    if !game.is_running() {
        return Err(MatchmakingError::MatchFinished);
    }
    Ok(game.external_id.clone())
}

/// Shared teardown for cancelled and finished matches.
fn release(lobby: &mut Lobby, match_id: MatchId, team_status: TeamStatus) -> Result<()> {
    let (server_id, teams, challenge_id) = {
        let game = lobby.game_match(match_id)?;
        (game.server_id, [game.team_1, game.team_2], game.challenge_id)
    };
    if let Ok(server) = lobby.server_mut(server_id) {
        server.end_match();
    }
    for team_id in teams {
        // Teams can be gone if the match outlived them; nothing to update then.
        if let Ok(team) = lobby.team_mut(team_id) {
            team.status = team_status;
        }
    }
    if let Some(challenge_id) = challenge_id {
        mark_match_completed(lobby, challenge_id)?;
    }
    Ok(())
}

/// Mark a match cancelled after the hosting API confirmed it. No ELO changes.
pub fn commit_cancel(lobby: &mut Lobby, match_id: MatchId, now: DateTime<Utc>) -> Result<()> {
    lobby.game_match_mut(match_id)?.cancel(now)?;
    release(lobby, match_id, TeamStatus::Waiting)?;
    log::info!("Match {} cancelled", match_id);
    Ok(())
}

/// Record the final score, free the server, apply ELO and settle the challenge.
/// Returns the winning team, or None for a draw.
pub fn finish_match(
    lobby: &mut Lobby,
    match_id: MatchId,
    team_1_score: u32,
    team_2_score: u32,
    now: DateTime<Utc>,
) -> Result<Option<TeamId>> {
    let game = lobby.game_match_mut(match_id)?;
    game.finish(team_1_score, team_2_score, now)?;
    let winner = game.winner().map(|side| {
        let loser = match side {
            Side::One => Side::Two,
            Side::Two => Side::One,
        };
        (game.team(side), game.team(loser))
    });

    release(lobby, match_id, TeamStatus::Completed)?;
    if let Some((winner, loser)) = winner {
        apply_match_elo(lobby, winner, loser)?;
    }
    log::info!(
        "Match {} finished {}-{}",
        match_id,
        team_1_score,
        team_2_score
    );
    Ok(winner.map(|(w, _)| w))
}
