//! Statistics engine: pure views over a snapshot of match records.
//!
//! Every function here takes the corpus by reference and returns owned
//! results. Nothing is cached between calls.

pub mod outcome;
pub mod evaluator;
pub mod streaks;
pub mod aggregate;
pub mod team_form;
pub mod discrepancy;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use aggregate::{aggregate, trend, AggregateStats, Comparison, StatsFilter, Winner};
pub use discrepancy::{rank_discrepancies, DiscrepancyEntry};
pub use evaluator::{evaluate, Evaluation, MatchEvaluation};
pub use outcome::Outcome;
pub use streaks::{build_streaks, predictor_streaks, Streak, StreakKind, StreakSummary};
pub use team_form::{team_form, team_summaries, TeamFormStats, TeamSummary};

use crate::types::{LeagueId, Match, MatchId, MatchStatus, Page, Predictor, ScoreLine, TeamId};

// ---------------------------------------------------------------------------
// Ordering helpers
// ---------------------------------------------------------------------------

/// Oldest first; same kickoff falls back to id.
pub(crate) fn chronological<'a>(matches: impl IntoIterator<Item = &'a Match>) -> Vec<&'a Match> {
    let mut ordered: Vec<&Match> = matches.into_iter().collect();
    ordered.sort_by(|a, b| a.kickoff.cmp(&b.kickoff).then_with(|| a.id.cmp(&b.id)));
    ordered
}

/// Newest first; same kickoff falls back to the higher id.
pub(crate) fn most_recent_first<'a>(
    matches: impl IntoIterator<Item = &'a Match>,
) -> Vec<&'a Match> {
    let mut ordered = chronological(matches);
    ordered.reverse();
    ordered
}

/// Status to show for a match on `today`.
///
/// Display only: a kickoff dated today reads as in progress even if the
/// record still says scheduled. Evaluation never looks at this.
pub fn display_status(m: &Match, today: NaiveDate) -> MatchStatus {
    if m.status == MatchStatus::Finished || m.is_evaluable() {
        MatchStatus::Finished
    } else if m.match_date() == today || m.status == MatchStatus::InProgress {
        MatchStatus::InProgress
    } else {
        MatchStatus::Scheduled
    }
}

// ---------------------------------------------------------------------------
// Facade
// ---------------------------------------------------------------------------

/// Window sizes used by the combined reports. Overridden by `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Matches in the trend window.
    pub trend_window: usize,
    /// Rows in the discrepancy table.
    pub discrepancy_top_k: usize,
    /// Completed matches listed in a team's recent form.
    pub recent_form_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_window: 10,
            discrepancy_top_k: 10,
            recent_form_len: team_form::DEFAULT_RECENT_LEN,
        }
    }
}

/// Everything the advanced statistics view shows, in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedStats {
    pub user_vs_predictz: Comparison,
    pub trend: Comparison,
    pub user_streak: Vec<Streak>,
    pub predictz_streak: Vec<Streak>,
    pub user_streak_summary: StreakSummary,
    pub predictz_streak_summary: StreakSummary,
    pub max_discrepancy_matches: Vec<DiscrepancyEntry>,
    pub avg_score_diff_user: Decimal,
    pub avg_score_diff_predictz: Decimal,
}

/// One evaluated match in the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResultRow {
    pub match_id: MatchId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub league_id: LeagueId,
    pub kickoff: NaiveDateTime,
    pub actual_score: ScoreLine,
    pub predictz_score: ScoreLine,
    pub user_score: ScoreLine,
    pub predictz_outcome_correct: Option<bool>,
    pub predictz_score_correct: Option<bool>,
    pub user_outcome_correct: Option<bool>,
    pub user_score_correct: Option<bool>,
}

impl MatchResultRow {
    pub fn from_match(m: &Match) -> Self {
        let eval = evaluate(m);
        Self {
            match_id: m.id,
            home_team_id: m.home_team_id,
            away_team_id: m.away_team_id,
            league_id: m.league_id,
            kickoff: m.kickoff,
            actual_score: m.actual,
            predictz_score: m.predictz,
            user_score: m.user,
            predictz_outcome_correct: eval.predictz.outcome_correct,
            predictz_score_correct: eval.predictz.score_correct,
            user_outcome_correct: eval.user.outcome_correct,
            user_score_correct: eval.user.score_correct,
        }
    }
}

/// Engine entry point bundling the configured windows.
#[derive(Debug, Clone, Default)]
pub struct StatsEngine {
    config: EngineConfig,
}

impl StatsEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Headline totals over the filtered corpus.
    pub fn summary(&self, matches: &[Match], filter: Option<&StatsFilter>) -> AggregateStats {
        aggregate(matches, filter, None)
    }

    pub fn advanced(&self, matches: &[Match], filter: Option<&StatsFilter>) -> AdvancedStats {
        let filtered: Vec<Match> = match filter {
            Some(filter) => filter.apply(matches).into_iter().cloned().collect(),
            None => matches.to_vec(),
        };

        let overall = aggregate(&filtered, None, None);
        let recent = trend(&filtered, None, self.config.trend_window);
        let user_streak = predictor_streaks(&filtered, Predictor::User);
        let predictz_streak = predictor_streaks(&filtered, Predictor::Predictz);

        debug!(
            matches = filtered.len(),
            trend_window = self.config.trend_window,
            top_k = self.config.discrepancy_top_k,
            "Advanced stats computed"
        );

        AdvancedStats {
            user_vs_predictz: overall.comparison,
            trend: recent.comparison,
            user_streak_summary: streaks::summarize(&user_streak),
            predictz_streak_summary: streaks::summarize(&predictz_streak),
            user_streak,
            predictz_streak,
            max_discrepancy_matches: rank_discrepancies(
                &filtered,
                self.config.discrepancy_top_k,
            ),
            avg_score_diff_user: overall.avg_score_diff_user,
            avg_score_diff_predictz: overall.avg_score_diff_predictz,
        }
    }

    /// Evaluated matches, newest first, one page at a time.
    pub fn results(
        &self,
        matches: &[Match],
        filter: Option<&StatsFilter>,
        limit: usize,
        offset: usize,
    ) -> Page<MatchResultRow> {
        let candidates = matches
            .iter()
            .filter(|m| m.is_evaluable())
            .filter(|m| filter.map_or(true, |f| f.accepts(m)));
        let ordered: Vec<MatchResultRow> = most_recent_first(candidates)
            .into_iter()
            .map(MatchResultRow::from_match)
            .collect();
        Page::slice(ordered, limit, offset)
    }

    pub fn team_form(&self, team_id: TeamId, matches: &[Match]) -> TeamFormStats {
        team_form::team_form_with(team_id, matches, self.config.recent_form_len)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
