use std::sync::Arc;

use tracing::{debug, info, warn};

use super::catalog::{CatalogError, PlanCatalog};
use super::domain::ValidationError;
use super::forms::FormSubmission;
use super::navigation::{BackNavigation, NavigationError, NavigationEvent};
use super::recommendation::{
    PlanOffer, RecommendationEngine, RecommendationError, RecommendationOutcome,
};
use super::repository::{RepositoryError, SessionRepository};
use super::session::{next_session_id, Session, SessionId, SubmissionError};
use super::tools::{self, CalculatorInput, ComparisonError, CostBreakdown, PlanComparison};

/// Service composing the session store, navigation rules and the
/// recommendation engine.
pub struct QuestionnaireService<R> {
    repository: Arc<R>,
    engine: Arc<RecommendationEngine>,
    back_navigation: BackNavigation,
}

impl<R> QuestionnaireService<R>
where
    R: SessionRepository + 'static,
{
    pub fn new(repository: Arc<R>, catalog: Arc<PlanCatalog>) -> Self {
        Self::with_back_navigation(repository, catalog, BackNavigation::default())
    }

    pub fn with_back_navigation(
        repository: Arc<R>,
        catalog: Arc<PlanCatalog>,
        back_navigation: BackNavigation,
    ) -> Self {
        Self {
            repository,
            engine: Arc::new(RecommendationEngine::new(catalog)),
            back_navigation,
        }
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Open a new session on the home step.
    pub fn start(&self) -> Result<Session, QuestionnaireServiceError> {
        let session = Session::new(next_session_id(), self.back_navigation);
        let stored = self.repository.insert(session)?;
        info!(
            session_id = %stored.id,
            back_navigation = ?stored.back_navigation,
            "session started"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &SessionId) -> Result<Session, QuestionnaireServiceError> {
        let session = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(session)
    }

    pub fn navigate(
        &self,
        id: &SessionId,
        event: &NavigationEvent,
    ) -> Result<Session, QuestionnaireServiceError> {
        let mut session = self.get(id)?;
        let from = session.step;
        let to = session.apply(event)?;
        self.repository.update(session.clone())?;

        debug!(session_id = %id, %from, %to, event = event.name(), "session navigated");
        Ok(session)
    }

    /// Validate and merge a form, moving the session to its recommendation step.
    pub fn submit(
        &self,
        id: &SessionId,
        form: &FormSubmission,
    ) -> Result<Session, QuestionnaireServiceError> {
        let mut session = self.get(id)?;
        let to = session.submit(form)?;
        self.repository.update(session.clone())?;

        debug!(session_id = %id, form = form.kind(), %to, "form accepted");
        Ok(session)
    }

    /// Recompute the recommendation for the session's current step.
    pub fn recommendation(
        &self,
        id: &SessionId,
    ) -> Result<RecommendationOutcome, QuestionnaireServiceError> {
        let session = self.get(id)?;
        let outcome = self
            .engine
            .outcome_for(session.step, &session.profile)
            .map_err(|err| {
                if let RecommendationError::Catalog(catalog) = &err {
                    warn!(session_id = %id, error = %catalog, "catalog missing a classified tier");
                }
                err
            })?;

        if let RecommendationOutcome::Standard(recommendation) = &outcome {
            info!(
                session_id = %id,
                tier = recommendation.tier.key(),
                point_estimate = recommendation.cost_estimate.point,
                "recommendation issued"
            );
        }
        Ok(outcome)
    }

    pub fn plans_for_tier(&self, tier: &str) -> Result<Vec<PlanOffer>, QuestionnaireServiceError> {
        let plans = self.engine.catalog().plans_for_tier(tier)?;
        Ok(plans.iter().map(PlanOffer::from).collect())
    }

    pub fn compare(&self, names: &[String]) -> Result<PlanComparison, QuestionnaireServiceError> {
        Ok(tools::compare_plans(self.engine.catalog(), names)?)
    }

    pub fn calculate(
        &self,
        input: &CalculatorInput,
    ) -> Result<CostBreakdown, QuestionnaireServiceError> {
        Ok(tools::calculate(input)?)
    }
}

/// Error raised by the questionnaire service.
#[derive(Debug, thiserror::Error)]
pub enum QuestionnaireServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),
}

impl From<SubmissionError> for QuestionnaireServiceError {
    fn from(error: SubmissionError) -> Self {
        match error {
            SubmissionError::Navigation(error) => QuestionnaireServiceError::Navigation(error),
            SubmissionError::Validation(error) => QuestionnaireServiceError::Validation(error),
        }
    }
}
