//! ChallengeRequest and its status machine.
//!
//! pending -> accepted -> started -> completed, with declined and expired as
//! the other terminal states. Expiry is checked lazily against `expires_at`
//! whenever the challenge is read or acted upon.

use crate::error::{MatchmakingError, Result};
use crate::models::game::MatchId;
use crate::models::team::TeamId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a challenge request.
pub type ChallengeId = Uuid;

/// How long a new challenge stays open unless configured otherwise.
pub const DEFAULT_CHALLENGE_TTL_HOURS: i64 = 24;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Expired,
    Started,
    Completed,
}

impl ChallengeStatus {
    /// Statuses that block either team from entering another challenge.
    pub fn is_open(self) -> bool {
        matches!(
            self,
            ChallengeStatus::Pending | ChallengeStatus::Accepted | ChallengeStatus::Started
        )
    }
}

impl fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChallengeStatus::Pending => "pending",
            ChallengeStatus::Accepted => "accepted",
            ChallengeStatus::Declined => "declined",
            ChallengeStatus::Expired => "expired",
            ChallengeStatus::Started => "started",
            ChallengeStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A proposed match between two teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChallengeRequest {
    pub id: ChallengeId,
    pub challenger_team_id: TeamId,
    pub challenged_team_id: TeamId,
    pub status: ChallengeStatus,
    pub message: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub challenger_ready: bool,
    pub challenged_ready: bool,
    /// Set once the match has been launched.
    pub match_id: Option<MatchId>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl ChallengeRequest {
    pub fn new(
        challenger_team_id: TeamId,
        challenged_team_id: TeamId,
        message: Option<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            challenger_team_id,
            challenged_team_id,
            status: ChallengeStatus::Pending,
            message,
            expires_at: now + ttl,
            challenger_ready: false,
            challenged_ready: false,
            match_id: None,
            created_at: now,
            responded_at: None,
        }
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.challenger_team_id == team_id || self.challenged_team_id == team_id
    }

    /// The other side of the challenge, if `team_id` is one of the two teams.
    pub fn opponent_of(&self, team_id: TeamId) -> Option<TeamId> {
        if self.challenger_team_id == team_id {
            Some(self.challenged_team_id)
        } else if self.challenged_team_id == team_id {
            Some(self.challenger_team_id)
        } else {
            None
        }
    }

    /// Expired if marked so, or if `now` is past `expires_at`, whatever the stored status.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ChallengeStatus::Expired || now > self.expires_at
    }

    /// Whether this challenge still holds both teams.
    ///
    /// A started challenge stays active until its match ends, even past `expires_at`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            ChallengeStatus::Started => true,
            ChallengeStatus::Pending | ChallengeStatus::Accepted => !self.is_expired(now),
            _ => false,
        }
    }

    pub fn is_ready_to_start(&self) -> bool {
        self.challenger_ready && self.challenged_ready && self.status == ChallengeStatus::Accepted
    }

    /// Move a pending/accepted challenge past its expiry to `Expired`. Returns true if it changed.
    pub fn expire_if_stale(&mut self, now: DateTime<Utc>) -> bool {
        let stale = matches!(self.status, ChallengeStatus::Pending | ChallengeStatus::Accepted)
            && now > self.expires_at;
        if stale {
            self.status = ChallengeStatus::Expired;
        }
        stale
    }

    fn ensure_pending(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.expire_if_stale(now) {
            return Err(MatchmakingError::ChallengeExpired);
        }
        if self.status != ChallengeStatus::Pending {
            return Err(MatchmakingError::ChallengeNotPending(self.status));
        }
        Ok(())
    }

    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure_pending(now)?;
        self.status = ChallengeStatus::Accepted;
        self.responded_at = Some(now);
        Ok(())
    }

    pub fn decline(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure_pending(now)?;
        self.status = ChallengeStatus::Declined;
        self.responded_at = Some(now);
        Ok(())
    }

    /// Set the readiness flag for `team_id`. Returns false (and changes nothing)
    /// when the team is not party to this challenge.
    pub fn mark_team_ready(&mut self, team_id: TeamId) -> bool {
        if self.challenger_team_id == team_id {
            self.challenger_ready = true;
            true
        } else if self.challenged_team_id == team_id {
            self.challenged_ready = true;
            true
        } else {
            false
        }
    }

    pub fn start_match(&mut self, match_id: MatchId) -> Result<()> {
        if !self.is_ready_to_start() {
            return Err(MatchmakingError::NotReady);
        }
        self.status = ChallengeStatus::Started;
        self.match_id = Some(match_id);
        Ok(())
    }
}
