//! Shared types for SCORECAST.
//!
//! These types form the data model used across all modules. The engine
//! only reads them; the store is the sole owner and the only place they
//! are mutated.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type MatchId = u64;
pub type TeamId = u64;
pub type LeagueId = u64;

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// A complete (home, away) score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScorePair {
    pub home: u32,
    pub away: u32,
}

impl ScorePair {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// The same score seen from the other side of the pitch.
    pub fn swapped(&self) -> Self {
        Self {
            home: self.away,
            away: self.home,
        }
    }

    /// Widened so that no pair of recorded scores can overflow.
    pub fn total_goals(&self) -> u64 {
        u64::from(self.home) + u64::from(self.away)
    }
}

impl fmt::Display for ScorePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.home, self.away)
    }
}

/// A score as recorded: either component may still be missing.
///
/// Edits arrive one component at a time, so a line can be half-filled.
/// Only a complete line takes part in classification and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreLine {
    #[serde(default)]
    pub home: Option<u32>,
    #[serde(default)]
    pub away: Option<u32>,
}

impl ScoreLine {
    pub fn new(home: u32, away: u32) -> Self {
        Self {
            home: Some(home),
            away: Some(away),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The complete pair, or `None` if either side is missing.
    pub fn complete(&self) -> Option<ScorePair> {
        match (self.home, self.away) {
            (Some(home), Some(away)) => Some(ScorePair { home, away }),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.home.is_none() && self.away.is_none()
    }

    /// Overlay `patch` on top of this line. Absent components keep their
    /// current value.
    pub fn merged(&self, patch: &ScoreLine) -> ScoreLine {
        ScoreLine {
            home: patch.home.or(self.home),
            away: patch.away.or(self.away),
        }
    }
}

impl From<ScorePair> for ScoreLine {
    fn from(pair: ScorePair) -> Self {
        ScoreLine::new(pair.home, pair.away)
    }
}

impl fmt::Display for ScoreLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |v: Option<u32>| v.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string());
        write!(f, "{} - {}", side(self.home), side(self.away))
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Match lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Finished,
}

impl MatchStatus {
    fn rank(&self) -> u8 {
        match self {
            MatchStatus::Scheduled => 0,
            MatchStatus::InProgress => 1,
            MatchStatus::Finished => 2,
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    pub fn can_advance_to(&self, next: MatchStatus) -> bool {
        next.rank() >= self.rank()
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "SCHEDULED"),
            MatchStatus::InProgress => write!(f, "IN_PROGRESS"),
            MatchStatus::Finished => write!(f, "FINISHED"),
        }
    }
}

impl std::str::FromStr for MatchStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SCHEDULED" => Ok(MatchStatus::Scheduled),
            "IN_PROGRESS" | "INPROGRESS" | "LIVE" => Ok(MatchStatus::InProgress),
            "FINISHED" | "FT" => Ok(MatchStatus::Finished),
            _ => Err(anyhow::anyhow!("Unknown match status: {s}")),
        }
    }
}

/// Who made a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Predictor {
    /// The third-party forecasting service.
    Predictz,
    User,
}

impl Predictor {
    pub const ALL: &'static [Predictor] = &[Predictor::Predictz, Predictor::User];
}

impl fmt::Display for Predictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predictor::Predictz => write!(f, "predictz"),
            Predictor::User => write!(f, "user"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub leagues: Vec<LeagueId>,
}

/// A fixture with the three score lines tracked against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub league_id: LeagueId,
    /// Scheduled kickoff, timezone-naive.
    pub kickoff: NaiveDateTime,
    pub status: MatchStatus,
    /// Service prediction, fixed when the match is acquired.
    #[serde(default)]
    pub predictz: ScoreLine,
    #[serde(default)]
    pub user: ScoreLine,
    #[serde(default)]
    pub actual: ScoreLine,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} vs {} @ {} [{}] actual={} predictz={} user={}",
            self.id,
            self.home_team_id,
            self.away_team_id,
            self.kickoff.format("%Y-%m-%d %H:%M"),
            self.status,
            self.actual,
            self.predictz,
            self.user,
        )
    }
}

impl Match {
    /// A scheduled match with no scores recorded yet.
    pub fn new(
        id: MatchId,
        home_team_id: TeamId,
        away_team_id: TeamId,
        league_id: LeagueId,
        kickoff: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            home_team_id,
            away_team_id,
            league_id,
            kickoff,
            status: MatchStatus::Scheduled,
            predictz: ScoreLine::empty(),
            user: ScoreLine::empty(),
            actual: ScoreLine::empty(),
        }
    }

    pub fn with_predictz(mut self, home: u32, away: u32) -> Self {
        self.predictz = ScoreLine::new(home, away);
        self
    }

    pub fn with_user(mut self, home: u32, away: u32) -> Self {
        self.user = ScoreLine::new(home, away);
        self
    }

    /// Record a final score and mark the match finished.
    pub fn with_result(mut self, home: u32, away: u32) -> Self {
        self.actual = ScoreLine::new(home, away);
        self.status = MatchStatus::Finished;
        self
    }

    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }

    /// The score line recorded for `predictor`.
    pub fn prediction(&self, predictor: Predictor) -> &ScoreLine {
        match predictor {
            Predictor::Predictz => &self.predictz,
            Predictor::User => &self.user,
        }
    }

    /// The final score, if fully recorded.
    pub fn result(&self) -> Option<ScorePair> {
        self.actual.complete()
    }

    /// A complete actual score makes a match evaluable whatever its status.
    pub fn is_evaluable(&self) -> bool {
        self.actual.is_complete()
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    /// Calendar date of kickoff.
    pub fn match_date(&self) -> NaiveDate {
        self.kickoff.date()
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a longer listing, plus the size of the whole listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Cut `items[offset..offset + limit]` out of an already ordered list.
    pub fn slice(items: Vec<T>, limit: usize, offset: usize) -> Self {
        let count = items.len();
        let results = items.into_iter().skip(offset).take(limit).collect();
        Self { count, results }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SCORECAST.
///
/// Missing scores are never errors; they surface as `None` in evaluations.
#[derive(Debug, thiserror::Error)]
pub enum ScorecastError {
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("Status regression on match {match_id}: {from} -> {to}")]
    StatusRegression {
        match_id: MatchId,
        from: MatchStatus,
        to: MatchStatus,
    },

    #[error("Result of finished match {0} is locked")]
    ResultLocked(MatchId),

    #[error("Match {0} cannot finish without a complete result")]
    IncompleteResult(MatchId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
