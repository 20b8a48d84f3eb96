//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`;
//! handlers copy what they need out of the store under a read lock and
//! compute after releasing it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::RwLock;
use tracing::{error, warn};

use crate::engine::{
    display_status, evaluate, team_summaries, AdvancedStats, AggregateStats, MatchEvaluation,
    MatchResultRow, StatsEngine, StatsFilter, TeamFormStats, TeamSummary,
};
use crate::storage::{self, MatchQuery, MatchStore, TeamQuery};
use crate::types::{
    League, LeagueId, Match, MatchId, MatchStatus, Page, ScoreLine, ScorecastError, Team, TeamId,
};

/// Page size when the request gives none.
pub const DEFAULT_PAGE_LIMIT: usize = 50;
/// Largest page a request may ask for.
pub const MAX_PAGE_LIMIT: usize = 500;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub store: RwLock<Box<dyn MatchStore>>,
    pub engine: StatsEngine,
    /// Where edits are persisted. `None` keeps them in memory only.
    pub data_path: Option<String>,
    /// Bumped under the store write lock for every edit.
    revision: AtomicU64,
    /// Last revision written to disk. Held while writing, so saves are serial.
    saved_revision: Arc<StdMutex<u64>>,
}

impl DashboardState {
    pub fn new(store: Box<dyn MatchStore>, engine: StatsEngine) -> Self {
        Self {
            store: RwLock::new(store),
            engine,
            data_path: None,
            revision: AtomicU64::new(0),
            saved_revision: Arc::new(StdMutex::new(0)),
        }
    }

    pub fn with_data_path(mut self, path: impl Into<String>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    async fn all_matches(&self) -> Vec<Match> {
        self.store.read().await.matches(&MatchQuery::all())
    }

    /// Apply one edit under the write lock, then persist a snapshot of the
    /// result with the lock released.
    ///
    /// The edit is authoritative once applied. A failed save is logged and
    /// the next successful one (or the shutdown save) catches the file up.
    async fn edit<F>(&self, apply: F) -> Result<Match, ApiError>
    where
        F: FnOnce(&mut Box<dyn MatchStore>) -> Result<Match, ScorecastError>,
    {
        let (updated, pending) = {
            let mut store = self.store.write().await;
            let updated = apply(&mut *store)?;
            let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
            let pending = self
                .data_path
                .clone()
                .map(|path| (path, revision, store.dataset()));
            (updated, pending)
        };

        if let Some((path, revision, dataset)) = pending {
            let saved = Arc::clone(&self.saved_revision);
            let outcome = tokio::task::spawn_blocking(move || {
                let mut last = saved.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                if *last >= revision {
                    // A newer snapshot already reached the disk.
                    return Ok(());
                }
                storage::save_dataset(&dataset, Some(&path))?;
                *last = revision;
                Ok::<(), anyhow::Error>(())
            })
            .await;

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(error = %format!("{e:#}"), revision, "Failed to persist dataset")
                }
                Err(e) => error!(error = %e, revision, "Persistence task aborted"),
            }
        }

        Ok(updated)
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error returned by a handler, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ScorecastError> for ApiError {
    fn from(err: ScorecastError) -> Self {
        let status = match &err {
            ScorecastError::MatchNotFound(_) | ScorecastError::TeamNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ScorecastError::StatusRegression { .. }
            | ScorecastError::ResultLocked(_)
            | ScorecastError::IncompleteResult(_) => StatusCode::CONFLICT,
            ScorecastError::Config(_) | ScorecastError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "Request failed");
        } else {
            warn!(status = %self.status, error = %self.message, "Request rejected");
        }
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageParams {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT)
    }

    fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamListParams {
    pub league_id: Option<LeagueId>,
    pub name: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateParams {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultsParams {
    pub league_id: Option<LeagueId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: MatchStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamDetail {
    pub team: Team,
    pub form: TeamFormStats,
}

/// A match as the dashboard shows it.
#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub record: Match,
    /// Status with the same-day "in progress" rule applied.
    pub display_status: MatchStatus,
    pub evaluation: MatchEvaluation,
}

impl MatchView {
    pub fn new(record: Match, today: NaiveDate) -> Self {
        Self {
            display_status: display_status(&record, today),
            evaluation: evaluate(&record),
            record,
        }
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn stats_filter(filter: StatsFilter) -> Option<StatsFilter> {
    (!filter.is_empty()).then_some(filter)
}

fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ApiError> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(ApiError::bad_request(format!(
            "start_date {s} is after end_date {e}"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/leagues
pub async fn get_leagues(State(state): State<AppState>) -> Json<Vec<League>> {
    Json(state.store.read().await.leagues())
}

/// GET /api/teams
pub async fn get_teams(
    State(state): State<AppState>,
    Query(params): Query<TeamListParams>,
) -> Json<Page<TeamSummary>> {
    let query = TeamQuery {
        league_id: params.league_id,
        name: params.name.clone(),
    };
    let (teams, matches) = {
        let store = state.store.read().await;
        (store.teams(&query), store.matches(&MatchQuery::all()))
    };
    let paging = PageParams {
        limit: params.limit,
        offset: params.offset,
    };
    Json(Page::slice(
        team_summaries(&teams, &matches),
        paging.limit(),
        paging.offset(),
    ))
}

/// GET /api/teams/:id
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<TeamId>,
) -> ApiResult<TeamDetail> {
    let (team, matches) = {
        let store = state.store.read().await;
        (store.team(id)?, store.matches(&MatchQuery::for_team(id)))
    };
    let form = state.engine.team_form(team.id, &matches);
    Ok(Json(TeamDetail { team, form }))
}

/// GET /api/teams/:id/matches
pub async fn get_team_matches(
    State(state): State<AppState>,
    Path(id): Path<TeamId>,
    Query(paging): Query<PageParams>,
) -> ApiResult<Page<MatchView>> {
    let matches = {
        let store = state.store.read().await;
        store.team(id)?;
        store.matches(&MatchQuery::for_team(id))
    };
    let today = today();
    Ok(Json(
        Page::slice(matches, paging.limit(), paging.offset()).map(|m| MatchView::new(m, today)),
    ))
}

/// GET /api/my-predictions
///
/// Matches the user has entered a score for, newest kickoff first.
pub async fn get_my_predictions(
    State(state): State<AppState>,
    Query(paging): Query<PageParams>,
) -> Json<Page<MatchView>> {
    let matches = state
        .store
        .read()
        .await
        .matches(&MatchQuery::user_predicted());
    let today = today();
    Json(Page::slice(matches, paging.limit(), paging.offset()).map(|m| MatchView::new(m, today)))
}

/// GET /api/matches?date=YYYY-MM-DD (defaults to today)
pub async fn get_matches(
    State(state): State<AppState>,
    Query(params): Query<DateParams>,
) -> Json<Vec<MatchView>> {
    let today = today();
    let date = params.date.unwrap_or(today);
    let mut matches = state.store.read().await.matches(&MatchQuery::on(date));
    // Day view reads in kickoff order.
    matches.reverse();
    Json(matches.into_iter().map(|m| MatchView::new(m, today)).collect())
}

/// GET /api/matches/:id
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<MatchView> {
    let m = state.store.read().await.get_match(id)?;
    Ok(Json(MatchView::new(m, today())))
}

/// PATCH /api/matches/:id/result
pub async fn patch_result(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
    Json(patch): Json<ScoreLine>,
) -> ApiResult<MatchView> {
    let updated = state.edit(|store| store.record_result(id, patch)).await?;
    Ok(Json(MatchView::new(updated, today())))
}

/// PATCH /api/matches/:id/prediction
pub async fn patch_prediction(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
    Json(patch): Json<ScoreLine>,
) -> ApiResult<MatchView> {
    let updated = state.edit(|store| store.update_user_prediction(id, patch)).await?;
    Ok(Json(MatchView::new(updated, today())))
}

/// PATCH /api/matches/:id/status
pub async fn patch_status(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<MatchView> {
    let updated = state.edit(|store| store.advance_status(id, update.status)).await?;
    Ok(Json(MatchView::new(updated, today())))
}

/// GET /api/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Query(filter): Query<StatsFilter>,
) -> ApiResult<AggregateStats> {
    check_range(filter.start_date, filter.end_date)?;
    let matches = state.all_matches().await;
    Ok(Json(
        state.engine.summary(&matches, stats_filter(filter).as_ref()),
    ))
}

/// GET /api/stats/advanced
pub async fn get_advanced_stats(
    State(state): State<AppState>,
    Query(filter): Query<StatsFilter>,
) -> ApiResult<AdvancedStats> {
    check_range(filter.start_date, filter.end_date)?;
    let matches = state.all_matches().await;
    Ok(Json(
        state.engine.advanced(&matches, stats_filter(filter).as_ref()),
    ))
}

/// GET /api/stats/results
pub async fn get_results(
    State(state): State<AppState>,
    Query(params): Query<ResultsParams>,
) -> ApiResult<Page<MatchResultRow>> {
    check_range(params.start_date, params.end_date)?;
    let filter = StatsFilter {
        league_id: params.league_id,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let paging = PageParams {
        limit: params.limit,
        offset: params.offset,
    };
    let matches = state.all_matches().await;
    Ok(Json(state.engine.results(
        &matches,
        stats_filter(filter).as_ref(),
        paging.limit(),
        paging.offset(),
    )))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MatchBook, MockMatchStore};
    use chrono::NaiveDateTime;
    use mockall::predicate::eq;

    fn kickoff(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, d)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap()
    }

    fn book_state() -> AppState {
        let mut book = MatchBook::new();
        book.insert_league(League {
            id: 1,
            name: "Premier".into(),
        });
        book.insert_team(Team {
            id: 1,
            name: "Ashford".into(),
            leagues: vec![1],
        });
        book.insert_team(Team {
            id: 2,
            name: "Brookvale".into(),
            leagues: vec![1],
        });
        book.insert_match(
            Match::new(1, 1, 2, 1, kickoff(1))
                .with_predictz(2, 1)
                .with_user(1, 0)
                .with_result(1, 0),
        )
        .unwrap();
        book.insert_match(Match::new(2, 2, 1, 1, kickoff(8)).with_predictz(1, 1))
            .unwrap();
        Arc::new(DashboardState::new(Box::new(book), StatsEngine::default()))
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(ApiError::from(ScorecastError::MatchNotFound(1)).status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(ScorecastError::TeamNotFound(1)).status, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(ScorecastError::ResultLocked(1)).status, StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(ScorecastError::IncompleteResult(1)).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(ScorecastError::StatusRegression {
                match_id: 1,
                from: MatchStatus::Finished,
                to: MatchStatus::Scheduled,
            })
            .status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(ScorecastError::Storage("disk".into())).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_page_params_clamped() {
        let p = PageParams {
            limit: Some(10_000),
            offset: None,
        };
        assert_eq!(p.limit(), MAX_PAGE_LIMIT);
        assert_eq!(p.offset(), 0);
        assert_eq!(PageParams::default().limit(), DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn test_match_view_serializes_flat() {
        let view = MatchView::new(
            Match::new(3, 1, 2, 1, kickoff(3)).with_result(2, 2),
            NaiveDate::from_ymd_opt(2025, 9, 3).unwrap(),
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["display_status"], "FINISHED");
        assert_eq!(json["actual"]["home"], 2);
        assert!(json["evaluation"]["user"]["outcome_correct"].is_null());
    }

    #[test]
    fn test_get_leagues_handler() {
        let Json(leagues) = tokio_test::block_on(get_leagues(State(book_state())));
        let premier = League {
            id: 1,
            name: "Premier".into(),
        };
        assert_eq!(leagues, vec![premier]);
    }

    #[tokio::test]
    async fn test_get_team_detail() {
        let Json(detail) = get_team(State(book_state()), Path(1)).await.unwrap();
        assert_eq!(detail.team.name, "Ashford");
        assert_eq!(detail.form.played, 1);
        assert_eq!(detail.form.wins, 1);
        assert_eq!(detail.form.upcoming.len(), 1);
    }

    #[tokio::test]
    async fn test_get_team_unknown() {
        let err = get_team(State(book_state()), Path(42)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_teams_filtered() {
        let params = TeamListParams {
            name: Some("brook".into()),
            ..TeamListParams::default()
        };
        let Json(page) = get_teams(State(book_state()), Query(params)).await;
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].id, 2);
        assert_eq!(page.results[0].losses, 1);
    }

    #[tokio::test]
    async fn test_get_results_pages() {
        let Json(page) = get_results(State(book_state()), Query(ResultsParams::default()))
            .await
            .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].match_id, 1);
        assert_eq!(page.results[0].user_score_correct, Some(true));
        assert_eq!(page.results[0].predictz_outcome_correct, Some(true));
    }

    #[tokio::test]
    async fn test_stats_rejects_inverted_range() {
        let filter = StatsFilter::between(
            NaiveDate::from_ymd_opt(2025, 9, 10).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        );
        let err = get_stats(State(book_state()), Query(filter)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_result_finishes_match() {
        let state = book_state();
        let Json(view) = patch_result(
            State(state.clone()),
            Path(2),
            Json(ScoreLine::new(0, 3)),
        )
        .await
        .unwrap();
        assert_eq!(view.record.status, MatchStatus::Finished);
        assert_eq!(view.evaluation.predictz.outcome_correct, Some(false));

        let err = patch_result(State(state), Path(2), Json(ScoreLine::new(1, 3)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_patch_prediction_uses_store() {
        let mut store = MockMatchStore::new();
        store
            .expect_update_user_prediction()
            .with(eq(9), eq(ScoreLine::new(2, 0)))
            .times(1)
            .returning(|id, patch| {
                let mut m = Match::new(id, 1, 2, 1, kickoff(9));
                m.user = patch;
                Ok(m)
            });
        let state = Arc::new(DashboardState::new(Box::new(store), StatsEngine::default()));

        let Json(view) = patch_prediction(State(state), Path(9), Json(ScoreLine::new(2, 0)))
            .await
            .unwrap();
        assert_eq!(view.record.user, ScoreLine::new(2, 0));
    }

    #[tokio::test]
    async fn test_patch_status_regression_is_conflict() {
        let mut store = MockMatchStore::new();
        store.expect_advance_status().returning(|id, to| {
            Err(ScorecastError::StatusRegression {
                match_id: id,
                from: MatchStatus::Finished,
                to,
            })
        });
        let state = Arc::new(DashboardState::new(Box::new(store), StatsEngine::default()));

        let err = patch_status(
            State(state),
            Path(4),
            Json(StatusUpdate {
                status: MatchStatus::Scheduled,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert!(err.message.contains("regression"));
    }

    #[tokio::test]
    async fn test_edits_persisted_when_path_set() {
        let mut p = std::env::temp_dir();
        p.push(format!("scorecast_routes_{}.json", uuid::Uuid::new_v4()));
        let path = p.to_string_lossy().to_string();

        let book = MatchBook::from_dataset(book_state().store.read().await.dataset()).unwrap();
        let state = Arc::new(
            DashboardState::new(Box::new(book), StatsEngine::default()).with_data_path(&path),
        );
        patch_prediction(State(state), Path(2), Json(ScoreLine::new(0, 0)))
            .await
            .unwrap();

        let saved = storage::load_dataset(Some(&path)).unwrap().unwrap();
        let m = saved.matches.iter().find(|m| m.id == 2).unwrap();
        assert_eq!(m.user, ScoreLine::new(0, 0));
        storage::delete_dataset(Some(&path)).unwrap();
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edit() {
        let mut p = std::env::temp_dir();
        p.push(format!("scorecast_missing_{}", uuid::Uuid::new_v4()));
        p.push("data.json");
        let path = p.to_string_lossy().to_string();

        let book = MatchBook::from_dataset(book_state().store.read().await.dataset()).unwrap();
        let state = Arc::new(
            DashboardState::new(Box::new(book), StatsEngine::default()).with_data_path(&path),
        );
        let Json(view) = patch_prediction(State(state.clone()), Path(2), Json(ScoreLine::new(4, 4)))
            .await
            .unwrap();
        assert_eq!(view.record.user, ScoreLine::new(4, 4));

        let held = state.store.read().await.get_match(2).unwrap();
        assert_eq!(held.user, ScoreLine::new(4, 4));
        assert!(!p.exists());
    }

    #[tokio::test]
    async fn test_successive_edits_all_reach_disk() {
        let mut p = std::env::temp_dir();
        p.push(format!("scorecast_routes_{}.json", uuid::Uuid::new_v4()));
        let path = p.to_string_lossy().to_string();

        let book = MatchBook::from_dataset(book_state().store.read().await.dataset()).unwrap();
        let state = Arc::new(
            DashboardState::new(Box::new(book), StatsEngine::default()).with_data_path(&path),
        );
        patch_prediction(State(state.clone()), Path(2), Json(ScoreLine::new(1, 0)))
            .await
            .unwrap();
        patch_prediction(State(state.clone()), Path(2), Json(ScoreLine::new(3, 1)))
            .await
            .unwrap();

        let saved = storage::load_dataset(Some(&path)).unwrap().unwrap();
        let m = saved.matches.iter().find(|m| m.id == 2).unwrap();
        assert_eq!(m.user, ScoreLine::new(3, 1));
        storage::delete_dataset(Some(&path)).unwrap();
    }
}
