//! Flat ELO adjustment applied to every member of both teams.

use crate::error::Result;
use crate::models::{Lobby, TeamId};

/// Points each member gains on a win and loses on a loss.
pub const ELO_STEP: u32 = 25;

/// +ELO_STEP for every winner, -ELO_STEP (floored at 0) for every loser.
pub fn apply_match_elo(lobby: &mut Lobby, winner: TeamId, loser: TeamId) -> Result<()> {
    let winners = lobby.team(winner)?.members.clone();
    let losers = lobby.team(loser)?.members.clone();
    for pid in winners {
        lobby.player_mut(pid)?.add_win(ELO_STEP);
    }
    for pid in losers {
        lobby.player_mut(pid)?.add_loss(ELO_STEP);
    }
    Ok(())
}
