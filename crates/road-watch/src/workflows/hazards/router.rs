use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ReportDraft, ReportId, VoteType};
use super::repository::ReportRepository;
use super::service::{HazardService, HazardServiceError};
use crate::geo::GeoPoint;
use crate::store::RepositoryError;
use crate::workflows::reputation::domain::UserId;
use crate::workflows::reputation::repository::UserRepository;

type SharedService<U, R> = Arc<HazardService<U, R>>;

/// Router builder exposing report, vote, and reputation endpoints.
pub fn hazard_router<U, R>(service: SharedService<U, R>) -> Router
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    Router::new()
        .route("/api/v1/users", post(ensure_user_handler::<U, R>))
        .route("/api/v1/users/current", get(current_user_handler::<U, R>))
        .route("/api/v1/users/:user_id/stats", get(stats_handler::<U, R>))
        .route("/api/v1/reports", post(submit_handler::<U, R>))
        .route("/api/v1/reports/near", get(near_handler::<U, R>))
        .route("/api/v1/reports/:report_id", get(report_handler::<U, R>))
        .route(
            "/api/v1/reports/:report_id/votes",
            post(vote_handler::<U, R>),
        )
        .route(
            "/api/v1/reports/:report_id/resolve",
            post(resolve_handler::<U, R>),
        )
        .route("/api/v1/leaderboard", get(leaderboard_handler::<U, R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EnsureUserRequest {
    #[serde(default)]
    pub(crate) username: Option<String>,
}

/// Report payload; the reporter defaults to the session's current member.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitReportRequest {
    #[serde(default)]
    pub(crate) reporter_id: Option<UserId>,
    #[serde(flatten)]
    pub(crate) draft: ReportDraft,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoteRequest {
    #[serde(default)]
    pub(crate) voter_id: Option<UserId>,
    pub(crate) vote_type: VoteType,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NearQuery {
    pub(crate) lat: f64,
    pub(crate) lng: f64,
    #[serde(default)]
    pub(crate) radius_km: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LeaderboardQuery {
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

pub(crate) fn error_response(error: HazardServiceError) -> Response {
    let status = match &error {
        HazardServiceError::NotInitialized => StatusCode::PRECONDITION_FAILED,
        HazardServiceError::ReportNotFound(_) | HazardServiceError::UnknownUser(_) => {
            StatusCode::NOT_FOUND
        }
        HazardServiceError::SelfVote | HazardServiceError::ReportResolved(_) => {
            StatusCode::CONFLICT
        }
        HazardServiceError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        HazardServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        HazardServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

fn resolve_actor<U, R>(
    service: &HazardService<U, R>,
    explicit: Option<UserId>,
) -> Result<UserId, HazardServiceError>
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    match explicit {
        Some(id) => Ok(id),
        None => service.current_user().map(|user| user.id),
    }
}

pub(crate) async fn ensure_user_handler<U, R>(
    State(service): State<SharedService<U, R>>,
    body: Option<Json<EnsureUserRequest>>,
) -> Response
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    let request = body.map(|Json(request)| request).unwrap_or_default();
    match service.ensure_user(request.username) {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn current_user_handler<U, R>(
    State(service): State<SharedService<U, R>>,
) -> Response
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    match service.current_user() {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stats_handler<U, R>(
    State(service): State<SharedService<U, R>>,
    Path(user_id): Path<String>,
) -> Response
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    match service.stats(&UserId(user_id)) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<U, R>(
    State(service): State<SharedService<U, R>>,
    Json(request): Json<SubmitReportRequest>,
) -> Response
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    let outcome = resolve_actor(&service, request.reporter_id)
        .and_then(|reporter| service.submit_report(&reporter, request.draft));
    match outcome {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn near_handler<U, R>(
    State(service): State<SharedService<U, R>>,
    Query(query): Query<NearQuery>,
) -> Response
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    match service.reports_near(GeoPoint::new(query.lat, query.lng), query.radius_km) {
        Ok(reports) => (StatusCode::OK, Json(reports)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<U, R>(
    State(service): State<SharedService<U, R>>,
    Path(report_id): Path<String>,
) -> Response
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    match service.report(&ReportId(report_id)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn vote_handler<U, R>(
    State(service): State<SharedService<U, R>>,
    Path(report_id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Response
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    let report_id = ReportId(report_id);
    let outcome = resolve_actor(&service, request.voter_id)
        .and_then(|voter| service.cast_vote(&report_id, &voter, request.vote_type));
    match outcome {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resolve_handler<U, R>(
    State(service): State<SharedService<U, R>>,
    Path(report_id): Path<String>,
) -> Response
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    match service.resolve_report(&ReportId(report_id)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn leaderboard_handler<U, R>(
    State(service): State<SharedService<U, R>>,
    Query(query): Query<LeaderboardQuery>,
) -> Response
where
    U: UserRepository + 'static,
    R: ReportRepository + 'static,
{
    match service.leaderboard(query.limit) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}
