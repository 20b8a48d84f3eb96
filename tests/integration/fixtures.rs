//! Shared season fixture.

use chrono::{NaiveDate, NaiveDateTime};

use scorecast::storage::Dataset;
use scorecast::types::{League, Match, Team};

pub fn kickoff(month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, month, day)
        .unwrap()
        .and_hms_opt(20, 0, 0)
        .unwrap()
}

/// Two leagues, four teams, six matches: four finished, two still to play.
pub fn season() -> Dataset {
    Dataset {
        leagues: vec![
            League {
                id: 1,
                name: "Premier".into(),
            },
            League {
                id: 2,
                name: "Cup".into(),
            },
        ],
        teams: vec![
            Team {
                id: 1,
                name: "Harbour City".into(),
                leagues: vec![1, 2],
            },
            Team {
                id: 2,
                name: "Lakeside".into(),
                leagues: vec![1],
            },
            Team {
                id: 3,
                name: "Old Mill".into(),
                leagues: vec![1],
            },
            Team {
                id: 4,
                name: "Summit Rovers".into(),
                leagues: vec![2],
            },
        ],
        matches: vec![
            // predictz score hit, user outcome hit
            Match::new(1, 1, 2, 1, kickoff(8, 2))
                .with_predictz(2, 1)
                .with_user(3, 0)
                .with_result(2, 1),
            // predictz outcome hit, user miss
            Match::new(2, 3, 1, 1, kickoff(8, 9))
                .with_predictz(0, 1)
                .with_user(1, 1)
                .with_result(0, 3),
            // both miss
            Match::new(3, 2, 3, 1, kickoff(8, 16))
                .with_predictz(1, 1)
                .with_user(2, 0)
                .with_result(0, 2),
            // cup draw, user score hit, predictz miss
            Match::new(4, 4, 1, 2, kickoff(8, 23))
                .with_predictz(2, 0)
                .with_user(1, 1)
                .with_result(1, 1),
            Match::new(5, 1, 3, 1, kickoff(8, 30)).with_predictz(1, 0),
            Match::new(6, 2, 1, 1, kickoff(9, 6)).with_predictz(0, 2),
        ],
    }
}
