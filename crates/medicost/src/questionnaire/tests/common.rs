use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::questionnaire::domain::FeatureVector;
use crate::questionnaire::forms::{FormSubmission, MeasurementForm, SwitchForm, UserForm};
use crate::questionnaire::navigation::{BackNavigation, NavigationEvent};
use crate::questionnaire::repository::{RepositoryError, SessionRepository};
use crate::questionnaire::session::{Session, SessionId};
use crate::questionnaire::{
    questionnaire_router, ExperienceLevel, Intent, PlanCatalog, QuestionnaireService,
};

pub(super) fn catalog() -> Arc<PlanCatalog> {
    Arc::new(PlanCatalog::standard().expect("bundled catalog parses"))
}

pub(super) fn features(
    age: u8,
    bmi: f64,
    smoker: u8,
    children: u8,
    income_level: u8,
) -> FeatureVector {
    FeatureVector {
        age,
        bmi,
        smoker,
        children,
        region_code: 0,
        income_level,
    }
}

pub(super) fn user_form() -> UserForm {
    UserForm {
        age: 45,
        sex: "Male".to_string(),
        smoking_status: "Current Smoker".to_string(),
        state: "Illinois".to_string(),
        measurement: MeasurementForm::Imperial {
            feet: 5.0,
            inches: 10.0,
            pounds: 220.0,
        },
        children: 1,
        marital_status: "Married".to_string(),
        conditions: vec!["High Blood Pressure".to_string()],
        income: "$75,000-100,000".to_string(),
        max_monthly_budget: 450,
    }
}

pub(super) fn user_submission() -> FormSubmission {
    FormSubmission::User(user_form())
}

pub(super) fn switch_submission(monthly_premium: u32) -> FormSubmission {
    FormSubmission::Switch(SwitchForm {
        provider: "Legacy Mutual".to_string(),
        monthly_premium,
        deductible: 2_500,
        satisfaction: "Unsatisfied".to_string(),
        switch_reasons: vec!["Too Expensive".to_string()],
        priorities: vec!["Lower Costs".to_string()],
    })
}

pub(super) fn explore(level: ExperienceLevel) -> [NavigationEvent; 2] {
    [
        NavigationEvent::ChooseIntent {
            intent: Intent::Explore,
        },
        NavigationEvent::ChooseExperience { level },
    ]
}

pub(super) fn build_service() -> (QuestionnaireService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = QuestionnaireService::new(repository.clone(), catalog());
    (service, repository)
}

pub(super) fn build_history_service() -> QuestionnaireService<MemoryRepository> {
    QuestionnaireService::with_back_navigation(
        Arc::new(MemoryRepository::default()),
        catalog(),
        BackNavigation::History,
    )
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl SessionRepository for MemoryRepository {
    fn insert(&self, session: Session) -> Result<Session, RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn update(&self, session: Session) -> Result<(), RepositoryError> {
        let mut guard = self.sessions.lock().expect("repository mutex poisoned");
        guard.insert(session.id.clone(), session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let guard = self.sessions.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct ConflictRepository;

impl SessionRepository for ConflictRepository {
    fn insert(&self, _session: Session) -> Result<Session, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _session: Session) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        Ok(None)
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn insert(&self, _session: Session) -> Result<Session, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn update(&self, _session: Session) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: QuestionnaireService<MemoryRepository>) -> axum::Router {
    questionnaire_router(Arc::new(service))
}
