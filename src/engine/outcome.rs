//! Outcome classification.
//!
//! Maps a score to its categorical result. An incomplete score line has
//! no outcome; callers treat that as "not comparable" rather than a miss.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ScoreLine, ScorePair};

/// Categorical result of a match, independent of the exact score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    /// Classify a complete score.
    pub fn classify(score: &ScorePair) -> Self {
        if score.home > score.away {
            Outcome::HomeWin
        } else if score.home < score.away {
            Outcome::AwayWin
        } else {
            Outcome::Draw
        }
    }

    /// Classify a recorded line. `None` when either side is missing.
    pub fn of_line(line: &ScoreLine) -> Option<Self> {
        line.complete().as_ref().map(Outcome::classify)
    }

    /// The outcome with home and away roles swapped.
    pub fn mirrored(&self) -> Self {
        match self {
            Outcome::HomeWin => Outcome::AwayWin,
            Outcome::Draw => Outcome::Draw,
            Outcome::AwayWin => Outcome::HomeWin,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::HomeWin => write!(f, "HOME_WIN"),
            Outcome::Draw => write!(f, "DRAW"),
            Outcome::AwayWin => write!(f, "AWAY_WIN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
