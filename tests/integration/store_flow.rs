//! Editing flow: store edits feed straight into the statistics.

use rust_decimal_macros::dec;

use scorecast::engine::{EngineConfig, StatsEngine, StatsFilter};
use scorecast::storage::{MatchBook, MatchQuery, MatchStore, TeamQuery};
use scorecast::types::{MatchStatus, ScoreLine, ScorecastError};

use crate::fixtures::season;

fn book() -> MatchBook {
    MatchBook::from_dataset(season()).unwrap()
}

#[test]
fn test_recording_result_makes_match_evaluable() {
    let mut book = book();
    let engine = StatsEngine::default();
    let before = engine.summary(&book.matches(&MatchQuery::all()), None);
    assert_eq!(before.evaluable, 4);

    book.advance_status(5, MatchStatus::InProgress).unwrap();
    let home_only = ScoreLine {
        home: Some(1),
        away: None,
    };
    book.record_result(5, home_only).unwrap();
    let mid = engine.summary(&book.matches(&MatchQuery::all()), None);
    assert_eq!(mid.evaluable, 4);

    let away_only = ScoreLine {
        home: None,
        away: Some(0),
    };
    let m = book.record_result(5, away_only).unwrap();
    assert_eq!(m.status, MatchStatus::Finished);

    let after = engine.summary(&book.matches(&MatchQuery::all()), None);
    assert_eq!(after.evaluable, 5);
    // predictz had 1-0
    assert_eq!(after.predictz.score_hits, 2);
    assert_eq!(after.predictz.score_pct, dec!(40.00));
}

#[test]
fn test_user_prediction_counts_once_result_exists() {
    let mut book = book();
    let engine = StatsEngine::default();

    book.update_user_prediction(6, ScoreLine::new(0, 1)).unwrap();
    let stats = engine.summary(&book.matches(&MatchQuery::all()), None);
    assert_eq!(stats.user.total_evaluable, 4);

    book.record_result(6, ScoreLine::new(0, 1)).unwrap();
    let stats = engine.summary(&book.matches(&MatchQuery::all()), None);
    assert_eq!(stats.user.total_evaluable, 5);
    assert_eq!(stats.user.score_hits, 2);
}

#[test]
fn test_finished_results_are_locked() {
    let mut book = book();
    let err = book.record_result(1, ScoreLine::new(0, 0)).unwrap_err();
    assert!(matches!(err, ScorecastError::ResultLocked(1)));
    let err = book.advance_status(1, MatchStatus::InProgress).unwrap_err();
    assert!(matches!(err, ScorecastError::StatusRegression { .. }));
}

#[test]
fn test_results_page_and_team_views() {
    let book = book();
    let engine = StatsEngine::new(EngineConfig {
        trend_window: 3,
        discrepancy_top_k: 2,
        recent_form_len: 2,
    });
    let matches = book.matches(&MatchQuery::all());

    let page = engine.results(&matches, Some(&StatsFilter::league(1)), 2, 0);
    assert_eq!(page.count, 3);
    let ids: Vec<u64> = page.results.iter().map(|r| r.match_id).collect();
    assert_eq!(ids, vec![3, 2]);

    let adv = engine.advanced(&matches, None);
    assert_eq!(adv.max_discrepancy_matches.len(), 2);
    assert_eq!(adv.trend.predictz_total, 3);

    let team = book.team(1).unwrap();
    let form = engine.team_form(team.id, &book.matches(&MatchQuery::for_team(team.id)));
    assert_eq!(form.recent.len(), 2);
    assert_eq!(form.played, 3);

    let cup_teams = book.teams(&TeamQuery {
        league_id: Some(2),
        name: None,
    });
    assert_eq!(cup_teams.len(), 2);
}
