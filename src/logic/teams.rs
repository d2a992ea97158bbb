//! Team registry: players, team membership, capacity and leadership.

use crate::error::{MatchmakingError, Result};
use crate::logic::challenges::expire_challenges_of;
use crate::models::{Lobby, Player, PlayerId, Team, TeamId};
use chrono::{DateTime, Utc};

/// What happened to the team when a member left.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LeaveOutcome {
    Left,
    /// The leader left; the longest-standing member took over.
    LeadershipTransferred(PlayerId),
    /// The last member left and the team was deleted.
    Disbanded,
}

/// Register a player by Steam id. Steam ids are unique.
pub fn register_player(
    lobby: &mut Lobby,
    steam_id: &str,
    name: &str,
    now: DateTime<Utc>,
) -> Result<PlayerId> {
    let steam_id = steam_id.trim();
    if lobby.players.iter().any(|p| p.steam_id == steam_id) {
        return Err(MatchmakingError::DuplicateSteamId);
    }
    let name = match name.trim() {
        "" => steam_id,
        n => n,
    };
    let player = Player::new(steam_id, name, now);
    let id = player.id;
    lobby.players.push(player);
    log::info!("Registered player {} ({})", name, steam_id);
    Ok(id)
}

/// Fail unless `player_id` leads `team_id`.
pub fn ensure_leader(lobby: &Lobby, team_id: TeamId, player_id: PlayerId) -> Result<()> {
    if lobby.team(team_id)?.is_leader(player_id) {
        Ok(())
    } else {
        Err(MatchmakingError::NotLeader)
    }
}

/// Create a team led by `leader`. Names are unique (case-insensitive).
pub fn create_team(
    lobby: &mut Lobby,
    leader: PlayerId,
    name: &str,
    max_players: usize,
    is_private: bool,
    now: DateTime<Utc>,
) -> Result<TeamId> {
    lobby.player(leader)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(MatchmakingError::EmptyTeamName);
    }
    if max_players == 0 {
        return Err(MatchmakingError::InvalidTeamSize);
    }
    if lobby.team_of(leader).is_some() {
        return Err(MatchmakingError::AlreadyOnTeam);
    }
    if lobby.teams.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
        return Err(MatchmakingError::DuplicateTeamName);
    }
    let team = Team::new(name, leader, max_players, is_private, now);
    let id = team.id;
    lobby.teams.push(team);
    log::info!("Team {} created", name);
    Ok(id)
}

fn add_to_team(lobby: &mut Lobby, team_id: TeamId, player_id: PlayerId) -> Result<()> {
    lobby.player(player_id)?;
    if lobby.team_of(player_id).is_some() {
        return Err(MatchmakingError::AlreadyOnTeam);
    }
    let team = lobby.team_mut(team_id)?;
    if team.is_in_match() {
        return Err(MatchmakingError::TeamInMatch);
    }
    if team.is_full() {
        return Err(MatchmakingError::TeamFull {
            max_players: team.max_players,
        });
    }
    team.members.push(player_id);
    Ok(())
}

/// A player joins a public team on their own.
pub fn join_team(lobby: &mut Lobby, team_id: TeamId, player_id: PlayerId) -> Result<()> {
    if lobby.team(team_id)?.is_private {
        return Err(MatchmakingError::TeamPrivate);
    }
    add_to_team(lobby, team_id, player_id)
}

/// The leader adds a player directly; works for private teams too.
pub fn add_member(
    lobby: &mut Lobby,
    team_id: TeamId,
    by_leader: PlayerId,
    player_id: PlayerId,
) -> Result<()> {
    ensure_leader(lobby, team_id, by_leader)?;
    add_to_team(lobby, team_id, player_id)
}

/// Remove `player_id` from the team, handing over leadership or deleting the
/// team as needed.
pub fn leave_team(lobby: &mut Lobby, team_id: TeamId, player_id: PlayerId) -> Result<LeaveOutcome> {
    let team = lobby.team_mut(team_id)?;
    if !team.is_member(player_id) {
        return Err(MatchmakingError::NotAMember);
    }
    if team.is_in_match() {
        return Err(MatchmakingError::TeamInMatch);
    }
    team.members.retain(|&m| m != player_id);

    let outcome = match team.members.first().copied() {
        None => LeaveOutcome::Disbanded,
        Some(next) if team.leader == player_id => {
            team.leader = next;
            LeaveOutcome::LeadershipTransferred(next)
        }
        Some(_) => LeaveOutcome::Left,
    };
    if outcome == LeaveOutcome::Disbanded {
        let name = team.name.clone();
        lobby.teams.retain(|t| t.id != team_id);
        expire_challenges_of(lobby, team_id);
        log::info!("Team {} disbanded (no members left)", name);
    }
    Ok(outcome)
}

/// Leader removes another member.
pub fn kick_member(
    lobby: &mut Lobby,
    team_id: TeamId,
    by_leader: PlayerId,
    player_id: PlayerId,
) -> Result<()> {
    ensure_leader(lobby, team_id, by_leader)?;
    if by_leader == player_id {
        return Err(MatchmakingError::CannotKickLeader);
    }
    leave_team(lobby, team_id, player_id).map(|_| ())
}

pub fn transfer_leadership(
    lobby: &mut Lobby,
    team_id: TeamId,
    by_leader: PlayerId,
    new_leader: PlayerId,
) -> Result<()> {
    ensure_leader(lobby, team_id, by_leader)?;
    let team = lobby.team_mut(team_id)?;
    if !team.is_member(new_leader) {
        return Err(MatchmakingError::NotAMember);
    }
    team.leader = new_leader;
    Ok(())
}

pub fn set_privacy(
    lobby: &mut Lobby,
    team_id: TeamId,
    by_leader: PlayerId,
    is_private: bool,
) -> Result<()> {
    ensure_leader(lobby, team_id, by_leader)?;
    lobby.team_mut(team_id)?.is_private = is_private;
    Ok(())
}

/// Teams visible in the public listing.
pub fn public_teams(lobby: &Lobby) -> Vec<&Team> {
    lobby.teams.iter().filter(|t| !t.is_private).collect()
}
