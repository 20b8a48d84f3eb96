//! Dataset persistence round trips through a JSON file.

use scorecast::storage::{self, MatchBook, MatchQuery, MatchStore};
use scorecast::types::ScoreLine;

use crate::fixtures::season;

fn temp_path() -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("scorecast_it_{}.json", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

#[test]
fn test_edits_survive_restart() {
    let path = temp_path();
    let mut book = MatchBook::from_dataset(season()).unwrap();
    book.update_user_prediction(5, ScoreLine::new(2, 2)).unwrap();
    storage::save_dataset(&book.dataset(), Some(&path)).unwrap();

    let restored = storage::load_dataset(Some(&path)).unwrap().unwrap();
    let book = MatchBook::from_dataset(restored).unwrap();
    assert_eq!(book.get_match(5).unwrap().user, ScoreLine::new(2, 2));
    assert_eq!(book.matches(&MatchQuery::all()).len(), 6);
    assert_eq!(book.leagues().len(), 2);

    storage::delete_dataset(Some(&path)).unwrap();
}

#[test]
fn test_missing_file_is_fresh_start() {
    let path = temp_path();
    assert!(storage::load_dataset(Some(&path)).unwrap().is_none());
}

#[test]
fn test_negative_score_rejected_on_load() {
    let path = temp_path();
    std::fs::write(
        &path,
        r#"{"matches": [{"id": 1, "home_team_id": 1, "away_team_id": 2, "league_id": 1,
            "kickoff": "2025-08-01T20:00:00", "status": "SCHEDULED",
            "predictz": {"home": -1, "away": 0}}]}"#,
    )
    .unwrap();
    assert!(storage::load_dataset(Some(&path)).is_err());
    storage::delete_dataset(Some(&path)).unwrap();
}
