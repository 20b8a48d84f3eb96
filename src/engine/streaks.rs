//! Hit/miss streaks.
//!
//! Reduces a chronological sequence of outcome hits into maximal runs.
//! Matches without an evaluation are dropped first: no prediction is not
//! a miss.

use serde::{Deserialize, Serialize};

use crate::engine::chronological;
use crate::engine::evaluator::evaluate_for;
use crate::types::{Match, Predictor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Hit,
    Miss,
}

impl From<bool> for StreakKind {
    fn from(hit: bool) -> Self {
        if hit {
            StreakKind::Hit
        } else {
            StreakKind::Miss
        }
    }
}

/// A maximal run of identical results. `length` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    #[serde(rename = "type")]
    pub kind: StreakKind,
    pub length: u32,
}

/// Headline numbers derived from a streak sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakSummary {
    pub longest_hit: u32,
    pub longest_miss: u32,
    /// The run still open at the end of the sequence.
    pub current: Option<Streak>,
}

/// Build streaks from results in chronological order.
///
/// Output is in the same order as the input. Empty input gives no streaks.
pub fn build_streaks(results: &[bool]) -> Vec<Streak> {
    let mut streaks: Vec<Streak> = Vec::new();

    for &hit in results {
        let kind = StreakKind::from(hit);
        match streaks.last_mut() {
            Some(open) if open.kind == kind => open.length += 1,
            _ => streaks.push(Streak { kind, length: 1 }),
        }
    }

    streaks
}

/// Outcome-hit streaks for one predictor over an unordered corpus.
pub fn predictor_streaks(matches: &[Match], predictor: Predictor) -> Vec<Streak> {
    let results: Vec<bool> = chronological(matches)
        .into_iter()
        .filter_map(|m| evaluate_for(m, predictor).outcome_correct)
        .collect();
    build_streaks(&results)
}

pub fn summarize(streaks: &[Streak]) -> StreakSummary {
    let longest = |kind: StreakKind| {
        streaks
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.length)
            .max()
            .unwrap_or(0)
    };

    StreakSummary {
        longest_hit: longest(StreakKind::Hit),
        longest_miss: longest(StreakKind::Miss),
        current: streaks.last().copied(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
