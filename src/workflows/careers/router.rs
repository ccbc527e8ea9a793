use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::JobId;
use super::filter::{FilterCriteria, FilterQuery};
use super::selection::SelectionError;
use super::service::{CareersService, CareersServiceError, DraftUpdate};
use super::session::{SessionError, SessionId};

#[derive(Debug, Deserialize)]
pub(crate) struct SelectJobRequest {
    pub(crate) job_id: JobId,
}

/// Router builder exposing the job board and the per-session application flow.
pub fn careers_router(service: Arc<CareersService>) -> Router {
    Router::new()
        .route("/api/v1/careers/jobs", get(list_jobs_handler))
        .route("/api/v1/careers/jobs/:job_id", get(job_handler))
        .route("/api/v1/careers/facets", get(facets_handler))
        .route("/api/v1/careers/sessions", post(open_session_handler))
        .route(
            "/api/v1/careers/sessions/:session_id",
            get(session_handler).delete(close_session_handler),
        )
        .route(
            "/api/v1/careers/sessions/:session_id/criteria",
            put(criteria_handler),
        )
        .route(
            "/api/v1/careers/sessions/:session_id/select",
            post(select_handler),
        )
        .route(
            "/api/v1/careers/sessions/:session_id/apply",
            post(apply_handler),
        )
        .route(
            "/api/v1/careers/sessions/:session_id/cancel",
            post(cancel_handler),
        )
        .route(
            "/api/v1/careers/sessions/:session_id/draft",
            put(draft_handler),
        )
        .route(
            "/api/v1/careers/sessions/:session_id/submit",
            post(submit_handler),
        )
        .route(
            "/api/v1/careers/sessions/:session_id/reset",
            post(reset_handler),
        )
        .with_state(service)
}

pub(crate) async fn list_jobs_handler(
    State(service): State<Arc<CareersService>>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let criteria = FilterCriteria::from(query);
    let jobs = service.list_jobs(&criteria);
    (StatusCode::OK, Json(json!({ "total": jobs.len(), "jobs": jobs }))).into_response()
}

pub(crate) async fn job_handler(
    State(service): State<Arc<CareersService>>,
    Path(job_id): Path<String>,
) -> Response {
    match service.job(&JobId(job_id)) {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn facets_handler(State(service): State<Arc<CareersService>>) -> Response {
    (StatusCode::OK, Json(service.facets())).into_response()
}

pub(crate) async fn open_session_handler(State(service): State<Arc<CareersService>>) -> Response {
    (StatusCode::CREATED, Json(service.open_session())).into_response()
}

pub(crate) async fn session_handler(
    State(service): State<Arc<CareersService>>,
    Path(session_id): Path<String>,
) -> Response {
    respond(service.session(&SessionId(session_id)))
}

pub(crate) async fn close_session_handler(
    State(service): State<Arc<CareersService>>,
    Path(session_id): Path<String>,
) -> Response {
    match service.close_session(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn criteria_handler(
    State(service): State<Arc<CareersService>>,
    Path(session_id): Path<String>,
    Json(criteria): Json<FilterCriteria>,
) -> Response {
    respond(service.set_criteria(&SessionId(session_id), criteria))
}

pub(crate) async fn select_handler(
    State(service): State<Arc<CareersService>>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectJobRequest>,
) -> Response {
    respond(service.select_job(&SessionId(session_id), &request.job_id))
}

pub(crate) async fn apply_handler(
    State(service): State<Arc<CareersService>>,
    Path(session_id): Path<String>,
) -> Response {
    respond(service.begin_apply(&SessionId(session_id)))
}

pub(crate) async fn cancel_handler(
    State(service): State<Arc<CareersService>>,
    Path(session_id): Path<String>,
) -> Response {
    respond(service.cancel_apply(&SessionId(session_id)))
}

pub(crate) async fn draft_handler(
    State(service): State<Arc<CareersService>>,
    Path(session_id): Path<String>,
    Json(update): Json<DraftUpdate>,
) -> Response {
    respond(service.update_draft(&SessionId(session_id), update))
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<CareersService>>,
    Path(session_id): Path<String>,
) -> Response {
    respond(service.submit(&SessionId(session_id)).await)
}

pub(crate) async fn reset_handler(
    State(service): State<Arc<CareersService>>,
    Path(session_id): Path<String>,
) -> Response {
    respond(service.reset(&SessionId(session_id)))
}

fn respond<T: serde::Serialize>(result: Result<T, CareersServiceError>) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn error_response(error: CareersServiceError) -> Response {
    match error {
        CareersServiceError::Session(SessionError::NotFound(_))
        | CareersServiceError::Selection(SelectionError::UnknownJob(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        CareersServiceError::Selection(SelectionError::Validation(errors)) => {
            let violations: Vec<_> = errors
                .violations
                .iter()
                .map(|violation| {
                    json!({
                        "field": violation.field,
                        "reason": violation.reason,
                        "message": violation.message(),
                    })
                })
                .collect();
            let payload = json!({
                "error": errors.to_string(),
                "violations": violations,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        CareersServiceError::Selection(
            SelectionError::InvalidStateTransition { .. }
            | SelectionError::SubmissionInFlight
            | SelectionError::StaleSubmission,
        )
        | CareersServiceError::Cancelled => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        CareersServiceError::Transport(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
    }
}
