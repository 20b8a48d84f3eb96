//! Persistence layer.
//!
//! The match record store sits behind the `MatchStore` trait. `MatchBook`
//! keeps the records in memory and is saved to / loaded from a single JSON
//! file between runs.

pub mod book;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::types::{
    League, LeagueId, Match, MatchId, MatchStatus, ScoreLine, ScorecastError, Team, TeamId,
};

pub use book::MatchBook;

/// Default data file path.
const DEFAULT_DATA_FILE: &str = "scorecast_data.json";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Selection of matches. All bounds are optional and inclusive; dates
/// compare the calendar date of kickoff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchQuery {
    #[serde(default)]
    pub league_id: Option<LeagueId>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Only matches kicking off on this date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Only matches this team plays in.
    #[serde(default)]
    pub team_id: Option<TeamId>,
    /// `true` keeps matches where the user entered at least one score,
    /// `false` keeps those with no user entry.
    #[serde(default)]
    pub has_user_prediction: Option<bool>,
}

impl MatchQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_team(team_id: TeamId) -> Self {
        Self {
            team_id: Some(team_id),
            ..Self::default()
        }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn user_predicted() -> Self {
        Self {
            has_user_prediction: Some(true),
            ..Self::default()
        }
    }

    pub fn accepts(&self, m: &Match) -> bool {
        let day = m.match_date();
        self.league_id.map_or(true, |id| m.league_id == id)
            && self.start_date.map_or(true, |start| day >= start)
            && self.end_date.map_or(true, |end| day <= end)
            && self.date.map_or(true, |d| day == d)
            && self.team_id.map_or(true, |t| m.involves(t))
            && self
                .has_user_prediction
                .map_or(true, |want| m.user.is_empty() != want)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamQuery {
    #[serde(default)]
    pub league_id: Option<LeagueId>,
    /// Case-insensitive substring of the team name.
    #[serde(default)]
    pub name: Option<String>,
}

impl TeamQuery {
    pub fn accepts(&self, team: &Team) -> bool {
        let in_league = self.league_id.map_or(true, |id| team.leagues.contains(&id));
        let named = match self.name.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => team
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        };
        in_league && named
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Read access to match records plus the two edit paths.
///
/// Implementations enforce the record invariants: status never moves
/// backwards, a finished match has a complete result, and that result
/// cannot change afterwards.
#[cfg_attr(test, mockall::automock)]
pub trait MatchStore: Send + Sync {
    fn leagues(&self) -> Vec<League>;

    fn teams(&self, query: &TeamQuery) -> Vec<Team>;

    fn team(&self, id: TeamId) -> Result<Team, ScorecastError>;

    /// Matches accepted by `query`, newest kickoff first.
    fn matches(&self, query: &MatchQuery) -> Vec<Match>;

    fn get_match(&self, id: MatchId) -> Result<Match, ScorecastError>;

    /// Merge `patch` into the user's prediction. Allowed at any time.
    fn update_user_prediction(
        &mut self,
        id: MatchId,
        patch: ScoreLine,
    ) -> Result<Match, ScorecastError>;

    /// Merge `patch` into the actual score. Completing it finishes the match.
    fn record_result(&mut self, id: MatchId, patch: ScoreLine) -> Result<Match, ScorecastError>;

    fn advance_status(&mut self, id: MatchId, status: MatchStatus)
        -> Result<Match, ScorecastError>;

    /// Snapshot of every record, for persistence.
    fn dataset(&self) -> Dataset;
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Everything the store holds, in its on-disk shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub leagues: Vec<League>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

/// Save a dataset to a JSON file.
pub fn save_dataset(dataset: &Dataset, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_DATA_FILE);
    let json = serde_json::to_string_pretty(dataset).context("Failed to serialise dataset")?;

    std::fs::write(path, &json).context(format!("Failed to write dataset to {path}"))?;

    debug!(path, matches = dataset.matches.len(), "Dataset saved");
    Ok(())
}

/// Load a dataset from a JSON file.
/// Returns None if the file doesn't exist (fresh start).
pub fn load_dataset(path: Option<&str>) -> Result<Option<Dataset>> {
    let path = path.unwrap_or(DEFAULT_DATA_FILE);

    if !Path::new(path).exists() {
        info!(path, "No data file found, starting empty");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read dataset from {path}"))?;

    let dataset: Dataset =
        serde_json::from_str(&json).context(format!("Failed to parse dataset from {path}"))?;

    info!(
        path,
        leagues = dataset.leagues.len(),
        teams = dataset.teams.len(),
        matches = dataset.matches.len(),
        "Dataset loaded from disk"
    );

    Ok(Some(dataset))
}

/// Delete the data file (for testing or reset).
pub fn delete_dataset(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_DATA_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path).context(format!("Failed to delete data file {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
