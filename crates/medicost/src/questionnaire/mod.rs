//! Guided insurance questionnaire: navigation, profile normalization, tier
//! classification, cost estimation and plan lookup.

pub mod catalog;
pub mod domain;
pub mod forms;
pub mod navigation;
pub mod normalizer;
pub mod recommendation;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;
pub mod tools;
pub mod units;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, PlanCatalog, PlanRecord};
pub use domain::{
    BodyMeasurement, CoverageTier, ExperienceLevel, FeatureVector, HealthCondition,
    IncomeBracket, Intent, MaritalStatus, Region, Sex, SmokingStatus, UsState, UserProfile,
    ValidationError,
};
pub use forms::FormSubmission;
pub use navigation::{BackNavigation, NavigationError, NavigationEvent, Step, Tool};
pub use normalizer::ProfileNormalizer;
pub use recommendation::{
    CostEstimate, CostEstimator, Recommendation, RecommendationEngine, RecommendationError,
    RecommendationOutcome, TierAssignment, TierClassifier, TierRule,
};
pub use repository::{RepositoryError, SessionRepository};
pub use router::questionnaire_router;
pub use service::{QuestionnaireService, QuestionnaireServiceError};
pub use session::{Session, SessionId, SessionView};
pub use units::{BmiCategory, UnitSystem};
