//! Discrepancy ranking.
//!
//! Surfaces matches where a prediction was furthest from the real score.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{Match, MatchId, Predictor, ScoreLine, TeamId};

/// `|Δhome| + |Δaway|` between a prediction and the result.
pub fn discrepancy(predicted: &ScoreLine, actual: &ScoreLine) -> Option<u64> {
    let predicted = predicted.complete()?;
    let actual = actual.complete()?;
    Some(
        u64::from(predicted.home.abs_diff(actual.home))
            + u64::from(predicted.away.abs_diff(actual.away)),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscrepancyEntry {
    pub match_id: MatchId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub kickoff: NaiveDateTime,
    pub predictz_diff: Option<u64>,
    pub user_diff: Option<u64>,
    /// Largest of the available per-predictor differences.
    pub max_diff: u64,
}

impl DiscrepancyEntry {
    fn from_match(m: &Match) -> Option<Self> {
        let predictz_diff = discrepancy(m.prediction(Predictor::Predictz), &m.actual);
        let user_diff = discrepancy(m.prediction(Predictor::User), &m.actual);
        let max_diff = predictz_diff.into_iter().chain(user_diff).max()?;

        Some(Self {
            match_id: m.id,
            home_team_id: m.home_team_id,
            away_team_id: m.away_team_id,
            kickoff: m.kickoff,
            predictz_diff,
            user_diff,
            max_diff,
        })
    }

    pub fn diff_for(&self, predictor: Predictor) -> Option<u64> {
        match predictor {
            Predictor::Predictz => self.predictz_diff,
            Predictor::User => self.user_diff,
        }
    }
}

/// The `top_k` matches with the largest discrepancy, largest first.
///
/// Ties fall back to kickoff (newest first), then match id.
pub fn rank_discrepancies(matches: &[Match], top_k: usize) -> Vec<DiscrepancyEntry> {
    if top_k == 0 {
        return Vec::new();
    }

    let mut entries: Vec<DiscrepancyEntry> =
        matches.iter().filter_map(DiscrepancyEntry::from_match).collect();

    entries.sort_by(|a, b| {
        b.max_diff
            .cmp(&a.max_diff)
            .then_with(|| b.kickoff.cmp(&a.kickoff))
            .then_with(|| b.match_id.cmp(&a.match_id))
    });
    entries.truncate(top_k);
    entries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
