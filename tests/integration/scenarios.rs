//! Accuracy scenarios run through the public engine API.

use rust_decimal_macros::dec;

use scorecast::engine::{
    aggregate, build_streaks, evaluate, rank_discrepancies, team_form, trend, Outcome,
    StatsEngine, StatsFilter, Streak, StreakKind, Winner,
};
use scorecast::types::{Match, ScorePair};

use crate::fixtures::{kickoff, season};

fn single(predicted: (u32, u32), actual: (u32, u32)) -> Match {
    Match::new(1, 1, 2, 1, kickoff(8, 1))
        .with_predictz(predicted.0, predicted.1)
        .with_result(actual.0, actual.1)
}

#[test]
fn test_exact_score_hit() {
    let eval = evaluate(&single((2, 1), (2, 1))).predictz;
    assert_eq!(eval.outcome_correct, Some(true));
    assert_eq!(eval.score_correct, Some(true));
}

#[test]
fn test_outcome_hit_wrong_score() {
    let eval = evaluate(&single((2, 1), (3, 0))).predictz;
    assert_eq!(eval.outcome_correct, Some(true));
    assert_eq!(eval.score_correct, Some(false));
}

#[test]
fn test_outcome_miss() {
    let eval = evaluate(&single((1, 1), (0, 2))).predictz;
    assert_eq!(eval.outcome_correct, Some(false));
    assert_eq!(eval.score_correct, Some(false));
}

#[test]
fn test_missing_user_prediction_is_undetermined() {
    let eval = evaluate(&single((1, 1), (0, 2))).user;
    assert_eq!(eval.outcome_correct, None);
    assert_eq!(eval.score_correct, None);
}

#[test]
fn test_swap_inverts_outcome() {
    for h in 0..5 {
        for a in 0..5 {
            let pair = ScorePair::new(h, a);
            assert_eq!(Outcome::classify(&pair.swapped()), Outcome::classify(&pair).mirrored());
        }
    }
}

#[test]
fn test_hit_hit_miss_hit_streaks() {
    assert_eq!(
        build_streaks(&[true, true, false, true]),
        vec![
            Streak {
                kind: StreakKind::Hit,
                length: 2,
            },
            Streak {
                kind: StreakKind::Miss,
                length: 1,
            },
            Streak {
                kind: StreakKind::Hit,
                length: 1,
            },
        ]
    );
}

#[test]
fn test_season_aggregate() {
    let matches = season().matches;
    let stats = aggregate(&matches, None, None);

    assert_eq!(stats.matches_considered, 6);
    assert_eq!(stats.evaluable, 4);
    assert_eq!(stats.predictz.total_evaluable, 4);
    assert_eq!(stats.predictz.outcome_hits, 2);
    assert_eq!(stats.predictz.score_hits, 1);
    assert_eq!(stats.predictz.outcome_pct, dec!(50.00));
    assert_eq!(stats.predictz.score_pct, dec!(25.00));
    assert_eq!(stats.user.outcome_hits, 2);
    assert_eq!(stats.user.score_hits, 1);
    assert_eq!(stats.comparison.winner, Winner::Tie);

    assert_eq!(stats.goal_averages.actual, dec!(1.25));
    assert_eq!(stats.goal_averages.predictz, dec!(0.92));
    assert_eq!(stats.goal_averages.user, dec!(1.13));
    assert_eq!(stats.avg_score_diff_predictz, dec!(1.50));
    assert_eq!(stats.avg_score_diff_user, dec!(2.25));
}

#[test]
fn test_season_filtered_by_league_and_dates() {
    let matches = season().matches;

    let premier = aggregate(&matches, Some(&StatsFilter::league(1)), None);
    assert_eq!(premier.evaluable, 3);
    assert_eq!(premier.predictz.outcome_pct, dec!(66.67));
    assert_eq!(premier.user.outcome_pct, dec!(33.33));

    let window = StatsFilter::between(kickoff(8, 9).date(), kickoff(8, 23).date());
    let mid = aggregate(&matches, Some(&window), None);
    assert_eq!(mid.matches_considered, 3);
    assert_eq!(mid.predictz.outcome_hits, 1);
}

#[test]
fn test_trend_uses_latest_results() {
    let matches = season().matches;
    let recent = trend(&matches, None, 2);
    assert_eq!(recent.evaluable, 2);
    assert_eq!(recent.predictz.outcome_hits, 0);
    assert_eq!(recent.user.outcome_hits, 1);
    assert_eq!(recent.comparison.winner, Winner::User);
}

#[test]
fn test_empty_corpus_zero_guard() {
    let stats = aggregate(&[], None, None);
    assert_eq!(stats.evaluable, 0);
    assert_eq!(stats.predictz.outcome_pct.to_string(), "0.00");
    assert_eq!(stats.user.score_pct.to_string(), "0.00");
    assert_eq!(stats.goal_averages.actual.to_string(), "0.00");
    assert!(rank_discrepancies(&[], 5).is_empty());
}

#[test]
fn test_discrepancy_ranking() {
    let matches = season().matches;
    let ranked = rank_discrepancies(&matches, 3);
    let ids: Vec<u64> = ranked.iter().map(|e| e.match_id).collect();
    assert_eq!(ids, vec![3, 2, 4]);
    assert_eq!(ranked[0].max_diff, 4);
    assert_eq!(ranked[2].predictz_diff, Some(2));
    assert_eq!(ranked[2].user_diff, Some(0));
    assert!(rank_discrepancies(&matches, 0).is_empty());
}

#[test]
fn test_team_form_from_either_side() {
    let matches = season().matches;
    let form = team_form(1, &matches);
    assert_eq!(form.played, 3);
    assert_eq!(form.wins, 2);
    assert_eq!(form.draws, 1);
    assert_eq!(form.losses, 0);
    assert_eq!(form.goals_for, 6);
    assert_eq!(form.goals_against, 2);
    assert_eq!(form.win_pct, dec!(66.67));
    let upcoming: Vec<u64> = form.upcoming.iter().map(|e| e.match_id).collect();
    assert_eq!(upcoming, vec![5, 6]);
}

#[test]
fn test_advanced_streaks() {
    let matches = season().matches;
    let adv = StatsEngine::default().advanced(&matches, None);
    assert_eq!(
        adv.predictz_streak,
        vec![
            Streak {
                kind: StreakKind::Hit,
                length: 2,
            },
            Streak {
                kind: StreakKind::Miss,
                length: 2,
            },
        ]
    );
    assert_eq!(adv.user_streak.len(), 3);
    assert_eq!(adv.user_streak_summary.longest_miss, 2);
    assert_eq!(
        adv.user_streak_summary.current,
        Some(Streak { kind: StreakKind::Hit, length: 1 })
    );
    let total: u32 = adv.user_streak.iter().map(|s| s.length).sum();
    assert_eq!(total, 4);
}
