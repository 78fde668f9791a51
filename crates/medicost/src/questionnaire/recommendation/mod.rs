mod classifier;
mod estimator;
mod offers;

pub use classifier::{TierAssignment, TierClassifier, TierRule};
pub use estimator::{
    CostEstimate, CostEstimator, CostScenarios, AVERAGE_USAGE_MULTIPLIER, HIGH_USAGE_MULTIPLIER,
    LOW_USAGE_MULTIPLIER, MAX_ANNUAL_COST, MIN_ANNUAL_COST,
};
pub use offers::{
    FamilyOffer, FamilyRecommendation, PlanOffer, SwitchOffer, SwitchRecommendation,
    MAX_SWITCH_OFFERS,
};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::{CatalogError, PlanCatalog};
use super::domain::{CoverageTier, FeatureVector, UserProfile, ValidationError};
use super::navigation::Step;
use super::normalizer::ProfileNormalizer;

/// Tier, cost outlook and plans for a completed profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tier: CoverageTier,
    pub rule: TierRule,
    pub rationale: String,
    pub confidence: BTreeMap<CoverageTier, f64>,
    pub features: FeatureVector,
    pub cost_estimate: CostEstimate,
    pub plans: Vec<PlanOffer>,
}

/// What a recommendation step shows, by path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Standard(Recommendation),
    Family(FamilyRecommendation),
    Switch(SwitchRecommendation),
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("step '{0}' does not show recommendations")]
    NotReady(Step),
    #[error("the {0} form has not been submitted")]
    MissingAnswers(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Profile -> features -> tier and cost -> catalog plans.
pub struct RecommendationEngine {
    catalog: Arc<PlanCatalog>,
    normalizer: ProfileNormalizer,
    classifier: TierClassifier,
    estimator: CostEstimator,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<PlanCatalog>) -> Self {
        Self {
            catalog,
            normalizer: ProfileNormalizer::new(),
            classifier: TierClassifier::new(),
            estimator: CostEstimator::new(),
        }
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn recommend(&self, profile: &UserProfile) -> Result<Recommendation, RecommendationError> {
        let features = self.normalizer.normalize(profile)?;
        Ok(self.recommend_features(features)?)
    }

    /// Recommendation for an already normalized feature vector.
    pub fn recommend_features(
        &self,
        features: FeatureVector,
    ) -> Result<Recommendation, CatalogError> {
        let assignment = self.classifier.classify(&features);
        let cost_estimate = self.estimator.estimate(&features);
        let plans = self
            .catalog
            .plans(assignment.tier)?
            .iter()
            .map(PlanOffer::from)
            .collect();

        Ok(Recommendation {
            tier: assignment.tier,
            rule: assignment.rule,
            rationale: assignment.rule.summary(),
            confidence: assignment.confidence,
            features,
            cost_estimate,
            plans,
        })
    }

    /// Dispatch on the recommendation step the session has reached.
    pub fn outcome_for(
        &self,
        step: Step,
        profile: &UserProfile,
    ) -> Result<RecommendationOutcome, RecommendationError> {
        if !step.is_recommendation() {
            return Err(RecommendationError::NotReady(step));
        }

        match step {
            Step::Recommendations => self.recommend(profile).map(RecommendationOutcome::Standard),
            Step::FamilyRecommendations => {
                let household = profile
                    .household
                    .as_ref()
                    .ok_or(RecommendationError::MissingAnswers("family"))?;
                let family = offers::family_offers(&self.catalog, household)?;
                Ok(RecommendationOutcome::Family(family))
            }
            Step::SwitchRecommendations => {
                let current = profile
                    .current_plan
                    .as_ref()
                    .ok_or(RecommendationError::MissingAnswers("switch"))?;
                Ok(RecommendationOutcome::Switch(offers::switch_offers(
                    &self.catalog,
                    current,
                )))
            }
            other => Err(RecommendationError::NotReady(other)),
        }
    }
}
