//! In-memory match store.

use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::storage::{Dataset, MatchQuery, MatchStore, TeamQuery};
use crate::types::{
    League, LeagueId, Match, MatchId, MatchStatus, ScoreLine, ScorecastError, Team, TeamId,
};

/// Match records indexed by id.
#[derive(Debug, Clone, Default)]
pub struct MatchBook {
    leagues: BTreeMap<LeagueId, League>,
    teams: BTreeMap<TeamId, Team>,
    matches: BTreeMap<MatchId, Match>,
}

impl MatchBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from a dataset, rejecting records that break the
    /// store invariants.
    pub fn from_dataset(dataset: Dataset) -> Result<Self, ScorecastError> {
        let mut book = Self::new();
        for league in dataset.leagues {
            book.leagues.insert(league.id, league);
        }
        for team in dataset.teams {
            book.teams.insert(team.id, team);
        }
        for m in dataset.matches {
            book.insert_match(m)?;
        }
        Ok(book)
    }

    /// Add a match as delivered by the acquisition side.
    pub fn insert_match(&mut self, m: Match) -> Result<(), ScorecastError> {
        if self.matches.contains_key(&m.id) {
            return Err(ScorecastError::Storage(format!("Duplicate match id {}", m.id)));
        }
        if m.status == MatchStatus::Finished && !m.actual.is_complete() {
            return Err(ScorecastError::IncompleteResult(m.id));
        }
        if m.home_team_id == m.away_team_id {
            return Err(ScorecastError::Storage(format!(
                "Match {} has the same team on both sides",
                m.id
            )));
        }
        self.matches.insert(m.id, m);
        Ok(())
    }

    pub fn insert_team(&mut self, team: Team) {
        self.teams.insert(team.id, team);
    }

    pub fn insert_league(&mut self, league: League) {
        self.leagues.insert(league.id, league);
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    fn match_mut(&mut self, id: MatchId) -> Result<&mut Match, ScorecastError> {
        self.matches.get_mut(&id).ok_or(ScorecastError::MatchNotFound(id))
    }
}

impl MatchStore for MatchBook {
    fn leagues(&self) -> Vec<League> {
        self.leagues.values().cloned().collect()
    }

    fn teams(&self, query: &TeamQuery) -> Vec<Team> {
        let mut teams: Vec<Team> = self
            .teams
            .values()
            .filter(|t| query.accepts(t))
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        teams
    }

    fn team(&self, id: TeamId) -> Result<Team, ScorecastError> {
        self.teams.get(&id).cloned().ok_or(ScorecastError::TeamNotFound(id))
    }

    fn matches(&self, query: &MatchQuery) -> Vec<Match> {
        let mut matches: Vec<Match> = self
            .matches
            .values()
            .filter(|m| query.accepts(m))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.kickoff.cmp(&a.kickoff).then_with(|| b.id.cmp(&a.id)));
        matches
    }

    fn get_match(&self, id: MatchId) -> Result<Match, ScorecastError> {
        self.matches.get(&id).cloned().ok_or(ScorecastError::MatchNotFound(id))
    }

    fn update_user_prediction(
        &mut self,
        id: MatchId,
        patch: ScoreLine,
    ) -> Result<Match, ScorecastError> {
        let m = self.match_mut(id)?;
        m.user = m.user.merged(&patch);
        info!(match_id = id, user = %m.user, "User prediction updated");
        Ok(m.clone())
    }

    fn record_result(&mut self, id: MatchId, patch: ScoreLine) -> Result<Match, ScorecastError> {
        let m = self.match_mut(id)?;
        let merged = m.actual.merged(&patch);

        if m.status == MatchStatus::Finished && merged != m.actual {
            warn!(
                match_id = id,
                current = %m.actual,
                attempted = %merged,
                "Rejected result change"
            );
            return Err(ScorecastError::ResultLocked(id));
        }

        m.actual = merged;
        if merged.is_complete() && m.status != MatchStatus::Finished {
            m.status = MatchStatus::Finished;
        }
        info!(match_id = id, actual = %m.actual, status = %m.status, "Result recorded");
        Ok(m.clone())
    }

    fn advance_status(
        &mut self,
        id: MatchId,
        status: MatchStatus,
    ) -> Result<Match, ScorecastError> {
        let m = self.match_mut(id)?;

        if !m.status.can_advance_to(status) {
            return Err(ScorecastError::StatusRegression {
                match_id: id,
                from: m.status,
                to: status,
            });
        }
        if status == MatchStatus::Finished && !m.actual.is_complete() {
            return Err(ScorecastError::IncompleteResult(id));
        }

        m.status = status;
        info!(match_id = id, status = %status, "Status advanced");
        Ok(m.clone())
    }

    fn dataset(&self) -> Dataset {
        Dataset {
            leagues: self.leagues.values().cloned().collect(),
            teams: self.teams.values().cloned().collect(),
            matches: self.matches.values().cloned().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
