use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::forms::FormSubmission;
use super::navigation::NavigationEvent;
use super::recommendation::RecommendationError;
use super::repository::{RepositoryError, SessionRepository};
use super::service::{QuestionnaireService, QuestionnaireServiceError};
use super::session::SessionId;
use super::tools::{self, CalculatorInput, ComparisonError};

/// Router exposing the questionnaire flow, catalog lookups and tools.
pub fn questionnaire_router<R>(service: Arc<QuestionnaireService<R>>) -> Router
where
    R: SessionRepository + 'static,
{
    Router::new()
        .route("/api/v1/sessions", post(start_handler::<R>))
        .route("/api/v1/sessions/:session_id", get(session_handler::<R>))
        .route(
            "/api/v1/sessions/:session_id/events",
            post(event_handler::<R>),
        )
        .route("/api/v1/sessions/:session_id/forms", post(form_handler::<R>))
        .route(
            "/api/v1/sessions/:session_id/recommendation",
            get(recommendation_handler::<R>),
        )
        .route("/api/v1/plans/compare", post(compare_handler::<R>))
        .route("/api/v1/plans/:tier", get(plans_handler::<R>))
        .route("/api/v1/calculator", post(calculator_handler::<R>))
        .route("/api/v1/faq", get(faq_handler))
        .route("/api/v1/education", get(education_handler))
        .with_state(service)
}

pub(crate) async fn start_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.start() {
        Ok(session) => (StatusCode::CREATED, axum::Json(session.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn session_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.get(&SessionId(session_id)) {
        Ok(session) => (StatusCode::OK, axum::Json(session.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn event_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
    Path(session_id): Path<String>,
    axum::Json(event): axum::Json<NavigationEvent>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.navigate(&SessionId(session_id), &event) {
        Ok(session) => (StatusCode::OK, axum::Json(session.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn form_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
    Path(session_id): Path<String>,
    axum::Json(form): axum::Json<FormSubmission>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.submit(&SessionId(session_id), &form) {
        Ok(session) => (StatusCode::OK, axum::Json(session.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recommendation_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.recommendation(&SessionId(session_id)) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn plans_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
    Path(tier): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.plans_for_tier(&tier) {
        Ok(plans) => {
            let payload = json!({
                "tier": tier,
                "plans": plans,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompareRequest {
    plans: Vec<String>,
}

pub(crate) async fn compare_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
    axum::Json(request): axum::Json<CompareRequest>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.compare(&request.plans) {
        Ok(comparison) => (StatusCode::OK, axum::Json(comparison)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn calculator_handler<R>(
    State(service): State<Arc<QuestionnaireService<R>>>,
    axum::Json(input): axum::Json<CalculatorInput>,
) -> Response
where
    R: SessionRepository + 'static,
{
    match service.calculate(&input) {
        Ok(breakdown) => (StatusCode::OK, axum::Json(breakdown)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn faq_handler() -> Response {
    let payload = json!({
        "entries": tools::faq(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn education_handler() -> Response {
    let payload = json!({
        "sections": tools::education(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

/// HTTP status for a service failure. Unknown tiers and plans are 404 on
/// direct lookups, but a classified tier missing from the catalog is a server
/// fault.
pub(crate) fn status_for(error: &QuestionnaireServiceError) -> StatusCode {
    match error {
        QuestionnaireServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        QuestionnaireServiceError::Navigation(_) => StatusCode::CONFLICT,
        QuestionnaireServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        QuestionnaireServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        QuestionnaireServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        QuestionnaireServiceError::Catalog(catalog) if catalog.is_not_found() => {
            StatusCode::NOT_FOUND
        }
        QuestionnaireServiceError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        QuestionnaireServiceError::Comparison(ComparisonError::Catalog(catalog))
            if catalog.is_not_found() =>
        {
            StatusCode::NOT_FOUND
        }
        QuestionnaireServiceError::Comparison(ComparisonError::Catalog(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        QuestionnaireServiceError::Comparison(_) => StatusCode::UNPROCESSABLE_ENTITY,
        QuestionnaireServiceError::Recommendation(RecommendationError::Validation(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        QuestionnaireServiceError::Recommendation(
            RecommendationError::NotReady(_) | RecommendationError::MissingAnswers(_),
        ) => StatusCode::CONFLICT,
        QuestionnaireServiceError::Recommendation(RecommendationError::Catalog(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: QuestionnaireServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), axum::Json(payload)).into_response()
}
