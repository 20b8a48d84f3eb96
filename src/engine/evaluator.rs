//! Accuracy evaluation.
//!
//! Decides, per match and per predictor, whether the prediction got the
//! outcome right and whether it got the exact score right.

use serde::{Deserialize, Serialize};

use crate::engine::outcome::Outcome;
use crate::types::{Match, Predictor, ScoreLine};

/// Accuracy of one prediction against the actual score.
///
/// Both fields are `None` when either line is incomplete. An exact score
/// hit always implies an outcome hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    pub outcome_correct: Option<bool>,
    pub score_correct: Option<bool>,
}

impl Evaluation {
    pub fn undetermined() -> Self {
        Self::default()
    }

    pub fn is_determined(&self) -> bool {
        self.outcome_correct.is_some()
    }

    pub fn outcome_hit(&self) -> bool {
        self.outcome_correct == Some(true)
    }

    pub fn score_hit(&self) -> bool {
        self.score_correct == Some(true)
    }
}

/// Both predictors' evaluations for one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvaluation {
    pub predictz: Evaluation,
    pub user: Evaluation,
}

impl MatchEvaluation {
    pub fn get(&self, predictor: Predictor) -> Evaluation {
        match predictor {
            Predictor::Predictz => self.predictz,
            Predictor::User => self.user,
        }
    }
}

/// Compare one predicted line with the actual line.
pub fn evaluate_prediction(predicted: &ScoreLine, actual: &ScoreLine) -> Evaluation {
    let (Some(predicted), Some(actual)) = (predicted.complete(), actual.complete()) else {
        return Evaluation::undetermined();
    };

    Evaluation {
        outcome_correct: Some(Outcome::classify(&predicted) == Outcome::classify(&actual)),
        score_correct: Some(predicted == actual),
    }
}

/// Evaluate a match for a single predictor.
pub fn evaluate_for(m: &Match, predictor: Predictor) -> Evaluation {
    evaluate_prediction(m.prediction(predictor), &m.actual)
}

/// Evaluate both predictors independently.
pub fn evaluate(m: &Match) -> MatchEvaluation {
    MatchEvaluation {
        predictz: evaluate_for(m, Predictor::Predictz),
        user: evaluate_for(m, Predictor::User),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
