//! Team form.
//!
//! Win/draw/loss and goal tallies for one team, seen from that team's side
//! of each fixture.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::aggregate::percentage;
use crate::engine::outcome::Outcome;
use crate::engine::{chronological, most_recent_first};
use crate::types::{LeagueId, Match, MatchId, MatchStatus, ScoreLine, Team, TeamId};

/// Completed matches listed in `TeamFormStats::recent` by default.
pub const DEFAULT_RECENT_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    /// Orient a match outcome to the team playing at `venue`.
    pub fn from_outcome(outcome: Outcome, venue: Venue) -> Self {
        let oriented = match venue {
            Venue::Home => outcome,
            Venue::Away => outcome.mirrored(),
        };
        match oriented {
            Outcome::HomeWin => FormResult::Win,
            Outcome::Draw => FormResult::Draw,
            Outcome::AwayWin => FormResult::Loss,
        }
    }
}

/// One fixture from the team's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormEntry {
    pub match_id: MatchId,
    pub opponent_id: TeamId,
    pub venue: Venue,
    pub kickoff: NaiveDateTime,
    pub status: MatchStatus,
    pub goals_for: Option<u32>,
    pub goals_against: Option<u32>,
    /// `None` until the result is complete.
    pub result: Option<FormResult>,
}

impl FormEntry {
    /// `None` if the team did not play in `m`.
    pub fn for_team(team_id: TeamId, m: &Match) -> Option<Self> {
        let (venue, opponent_id) = if m.home_team_id == team_id {
            (Venue::Home, m.away_team_id)
        } else if m.away_team_id == team_id {
            (Venue::Away, m.home_team_id)
        } else {
            return None;
        };

        let oriented = match venue {
            Venue::Home => m.actual,
            Venue::Away => ScoreLine {
                home: m.actual.away,
                away: m.actual.home,
            },
        };
        let result = Outcome::of_line(&m.actual).map(|o| FormResult::from_outcome(o, venue));
        let complete = result.is_some();

        Some(Self {
            match_id: m.id,
            opponent_id,
            venue,
            kickoff: m.kickoff,
            status: m.status,
            goals_for: oriented.home.filter(|_| complete),
            goals_against: oriented.away.filter(|_| complete),
            result,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamFormStats {
    pub team_id: TeamId,
    /// Matches with a complete result.
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u64,
    pub goals_against: u64,
    pub goal_difference: i64,
    pub win_pct: Decimal,
    /// Unplayed fixtures, soonest first.
    pub upcoming: Vec<FormEntry>,
    /// Latest completed fixtures, newest first.
    pub recent: Vec<FormEntry>,
}

/// Form for `team_id` over any corpus; matches not involving the team are
/// ignored.
pub fn team_form(team_id: TeamId, matches: &[Match]) -> TeamFormStats {
    team_form_with(team_id, matches, DEFAULT_RECENT_LEN)
}

pub fn team_form_with(team_id: TeamId, matches: &[Match], recent_len: usize) -> TeamFormStats {
    let mut stats = TeamFormStats {
        team_id,
        played: 0,
        wins: 0,
        draws: 0,
        losses: 0,
        goals_for: 0,
        goals_against: 0,
        goal_difference: 0,
        win_pct: percentage(0, 0),
        upcoming: Vec::new(),
        recent: Vec::new(),
    };

    let involved: Vec<&Match> = matches.iter().filter(|m| m.involves(team_id)).collect();

    for m in &involved {
        let Some(entry) = FormEntry::for_team(team_id, m) else {
            continue;
        };
        let Some(result) = entry.result else {
            continue;
        };
        stats.played += 1;
        match result {
            FormResult::Win => stats.wins += 1,
            FormResult::Draw => stats.draws += 1,
            FormResult::Loss => stats.losses += 1,
        }
        stats.goals_for = stats
            .goals_for
            .saturating_add(u64::from(entry.goals_for.unwrap_or(0)));
        stats.goals_against = stats
            .goals_against
            .saturating_add(u64::from(entry.goals_against.unwrap_or(0)));
    }

    stats.goal_difference = i64::try_from(stats.goals_for)
        .unwrap_or(i64::MAX)
        .saturating_sub(i64::try_from(stats.goals_against).unwrap_or(i64::MAX));
    stats.win_pct = percentage(stats.wins, stats.played);

    let pending = involved
        .iter()
        .copied()
        .filter(|m| !m.is_evaluable())
        .filter(|m| matches!(m.status, MatchStatus::Scheduled | MatchStatus::InProgress));
    stats.upcoming = chronological(pending)
        .into_iter()
        .filter_map(|m| FormEntry::for_team(team_id, m))
        .collect();

    let completed: Vec<&Match> = involved.into_iter().filter(|m| m.is_evaluable()).collect();
    stats.recent = most_recent_first(completed)
        .into_iter()
        .take(recent_len)
        .filter_map(|m| FormEntry::for_team(team_id, m))
        .collect();

    debug!(
        team_id,
        played = stats.played,
        wins = stats.wins,
        draws = stats.draws,
        losses = stats.losses,
        "Team form computed"
    );
    stats
}

// ---------------------------------------------------------------------------
// Team list
// ---------------------------------------------------------------------------

/// Row of the team list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub id: TeamId,
    pub name: String,
    pub leagues: Vec<LeagueId>,
    pub num_matches: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub win_pct: Decimal,
}

pub fn team_summaries(teams: &[Team], matches: &[Match]) -> Vec<TeamSummary> {
    teams
        .iter()
        .map(|team| {
            let form = team_form_with(team.id, matches, 0);
            TeamSummary {
                id: team.id,
                name: team.name.clone(),
                leagues: team.leagues.clone(),
                num_matches: form.played,
                wins: form.wins,
                draws: form.draws,
                losses: form.losses,
                win_pct: form.win_pct,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
