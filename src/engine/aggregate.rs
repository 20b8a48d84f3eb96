//! Aggregate accuracy statistics.
//!
//! Folds per-match evaluations into totals, percentages and averages,
//! optionally restricted by a league/date filter and a trailing window.
//! An empty corpus is normal: every ratio resolves to 0.00.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::discrepancy::discrepancy;
use crate::engine::evaluator::{evaluate_for, Evaluation};
use crate::engine::most_recent_first;
use crate::types::{LeagueId, Match, Predictor, ScoreLine};

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Corpus restriction. Date bounds are inclusive and compare calendar
/// dates of kickoff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsFilter {
    #[serde(default)]
    pub league_id: Option<LeagueId>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl StatsFilter {
    pub fn league(league_id: LeagueId) -> Self {
        Self {
            league_id: Some(league_id),
            ..Self::default()
        }
    }

    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.league_id.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    pub fn accepts(&self, m: &Match) -> bool {
        let date = m.match_date();
        self.league_id.map_or(true, |id| m.league_id == id)
            && self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }

    pub fn apply<'a>(&self, matches: &'a [Match]) -> Vec<&'a Match> {
        matches.iter().filter(|m| self.accepts(m)).collect()
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Hit counts for one predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PredictorTally {
    /// Matches where this predictor could be evaluated.
    pub total_evaluable: u32,
    pub outcome_hits: u32,
    pub score_hits: u32,
    pub outcome_pct: Decimal,
    pub score_pct: Decimal,
}

impl PredictorTally {
    fn record(&mut self, eval: Evaluation) {
        if !eval.is_determined() {
            return;
        }
        self.total_evaluable += 1;
        if eval.outcome_hit() {
            self.outcome_hits += 1;
        }
        if eval.score_hit() {
            self.score_hits += 1;
        }
    }

    fn finish(mut self) -> Self {
        self.outcome_pct = percentage(self.outcome_hits, self.total_evaluable);
        self.score_pct = percentage(self.score_hits, self.total_evaluable);
        self
    }
}

/// Mean goals per side for each recorded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoalAverages {
    pub predictz: Decimal,
    pub user: Decimal,
    pub actual: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    User,
    Predictz,
    Tie,
}

/// User against the service, decided on outcome-hit counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub user_hits: u32,
    pub user_total: u32,
    pub predictz_hits: u32,
    pub predictz_total: u32,
    pub winner: Winner,
}

impl Comparison {
    pub fn between(user: &PredictorTally, predictz: &PredictorTally) -> Self {
        let winner = match user.outcome_hits.cmp(&predictz.outcome_hits) {
            std::cmp::Ordering::Greater => Winner::User,
            std::cmp::Ordering::Less => Winner::Predictz,
            std::cmp::Ordering::Equal => Winner::Tie,
        };
        Self {
            user_hits: user.outcome_hits,
            user_total: user.total_evaluable,
            predictz_hits: predictz.outcome_hits,
            predictz_total: predictz.total_evaluable,
            winner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Matches left after filtering and windowing.
    pub matches_considered: u32,
    /// Of those, matches with a complete actual score.
    pub evaluable: u32,
    pub predictz: PredictorTally,
    pub user: PredictorTally,
    pub goal_averages: GoalAverages,
    /// Mean discrepancy between prediction and result.
    pub avg_score_diff_predictz: Decimal,
    pub avg_score_diff_user: Decimal,
    pub comparison: Comparison,
}

impl AggregateStats {
    pub fn tally(&self, predictor: Predictor) -> &PredictorTally {
        match predictor {
            Predictor::Predictz => &self.predictz,
            Predictor::User => &self.user,
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

fn two_places(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// `hits / total * 100` to two places. Zero total gives 0.00.
pub fn percentage(hits: u32, total: u32) -> Decimal {
    if total == 0 {
        return two_places(Decimal::ZERO);
    }
    two_places(Decimal::from(hits) * Decimal::ONE_HUNDRED / Decimal::from(total))
}

/// `sum / count` to two places. Zero count gives 0.00.
pub fn mean(sum: u64, count: u64) -> Decimal {
    if count == 0 {
        return two_places(Decimal::ZERO);
    }
    two_places(Decimal::from(sum) / Decimal::from(count))
}

/// Average goals per side over lines that are complete.
fn goal_average<'a>(lines: impl Iterator<Item = &'a ScoreLine>) -> Decimal {
    let (sum, count) = lines
        .filter_map(ScoreLine::complete)
        .fold((0u64, 0u64), |(sum, count), pair| {
            (sum.saturating_add(pair.total_goals()), count + 1)
        });
    mean(sum, count * 2)
}

fn average_discrepancy(matches: &[&Match], predictor: Predictor) -> Decimal {
    let (sum, count) = matches
        .iter()
        .filter_map(|m| discrepancy(m.prediction(predictor), &m.actual))
        .fold((0u64, 0u64), |(sum, count), diff| {
            (sum.saturating_add(diff), count + 1)
        });
    mean(sum, count)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// The `n` most recent evaluable matches, newest first.
pub fn trailing_window<'a>(matches: &[&'a Match], n: usize) -> Vec<&'a Match> {
    let evaluable: Vec<&Match> = matches.iter().copied().filter(|m| m.is_evaluable()).collect();
    let mut ordered = most_recent_first(evaluable);
    ordered.truncate(n);
    ordered
}

/// Aggregate statistics over `matches`, after `filter` and then `window`.
pub fn aggregate(
    matches: &[Match],
    filter: Option<&StatsFilter>,
    window: Option<usize>,
) -> AggregateStats {
    let filtered: Vec<&Match> = match filter {
        Some(filter) => filter.apply(matches),
        None => matches.iter().collect(),
    };
    let corpus = match window {
        Some(n) => trailing_window(&filtered, n),
        None => filtered,
    };

    let stats = aggregate_refs(&corpus);
    debug!(
        input = matches.len(),
        considered = stats.matches_considered,
        evaluable = stats.evaluable,
        window = ?window,
        "Aggregate computed"
    );
    stats
}

/// Aggregate over the most recent `n` evaluable matches.
pub fn trend(matches: &[Match], filter: Option<&StatsFilter>, n: usize) -> AggregateStats {
    aggregate(matches, filter, Some(n))
}

fn aggregate_refs(corpus: &[&Match]) -> AggregateStats {
    let mut predictz = PredictorTally::default();
    let mut user = PredictorTally::default();

    for m in corpus {
        predictz.record(evaluate_for(m, Predictor::Predictz));
        user.record(evaluate_for(m, Predictor::User));
    }
    let predictz = predictz.finish();
    let user = user.finish();

    let goal_averages = GoalAverages {
        predictz: goal_average(corpus.iter().map(|m| &m.predictz)),
        user: goal_average(corpus.iter().map(|m| &m.user)),
        actual: goal_average(corpus.iter().map(|m| &m.actual)),
    };

    AggregateStats {
        matches_considered: corpus.len() as u32,
        evaluable: corpus.iter().filter(|m| m.is_evaluable()).count() as u32,
        comparison: Comparison::between(&user, &predictz),
        predictz,
        user,
        goal_averages,
        avg_score_diff_predictz: average_discrepancy(corpus, Predictor::Predictz),
        avg_score_diff_user: average_discrepancy(corpus, Predictor::User),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
