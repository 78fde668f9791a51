use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::{CoverageTier, FeatureVector};

pub const SENIOR_AGE: u8 = 65;
pub const FAMILY_MIN_CHILDREN: u8 = 2;
pub const BUDGET_MAX_INCOME_LEVEL: u8 = 2;
pub const YOUNG_ADULT_AGE: u8 = 30;
pub const HEALTHY_BMI_CEILING: f64 = 25.0;

/// Which branch of the tier rule produced an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierRule {
    SeniorAge,
    LargeFamily,
    LowIncome,
    YoungAndHealthy,
    Fallback,
}

impl TierRule {
    pub const fn tier(self) -> CoverageTier {
        match self {
            TierRule::SeniorAge => CoverageTier::Senior,
            TierRule::LargeFamily => CoverageTier::Family,
            TierRule::LowIncome | TierRule::YoungAndHealthy => CoverageTier::BudgetFriendly,
            TierRule::Fallback => CoverageTier::Comprehensive,
        }
    }

    pub fn summary(self) -> String {
        match self {
            TierRule::SeniorAge => format!("age {SENIOR_AGE} or older"),
            TierRule::LargeFamily => format!("{FAMILY_MIN_CHILDREN} or more children"),
            TierRule::LowIncome => {
                format!("income level {BUDGET_MAX_INCOME_LEVEL} or lower")
            }
            TierRule::YoungAndHealthy => {
                format!("under {YOUNG_ADULT_AGE} with BMI below {HEALTHY_BMI_CEILING}")
            }
            TierRule::Fallback => "no narrower tier applies".to_string(),
        }
    }
}

/// Evaluate the tier rule; the first matching branch wins.
pub(crate) fn matching_rule(features: &FeatureVector) -> TierRule {
    if features.age >= SENIOR_AGE {
        return TierRule::SeniorAge;
    }

    if features.children >= FAMILY_MIN_CHILDREN {
        return TierRule::LargeFamily;
    }

    if features.income_level <= BUDGET_MAX_INCOME_LEVEL {
        return TierRule::LowIncome;
    }

    if features.age < YOUNG_ADULT_AGE && features.bmi < HEALTHY_BMI_CEILING {
        return TierRule::YoungAndHealthy;
    }

    TierRule::Fallback
}

/// Predicted tier plus a probability for every tier, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierAssignment {
    pub tier: CoverageTier,
    pub rule: TierRule,
    pub confidence: BTreeMap<CoverageTier, f64>,
}

impl TierAssignment {
    pub fn confidence_for(&self, tier: CoverageTier) -> f64 {
        self.confidence.get(&tier).copied().unwrap_or(0.0)
    }
}

/// Stateless classifier applying the closed-form tier rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct TierClassifier;

impl TierClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, features: &FeatureVector) -> TierAssignment {
        let rule = matching_rule(features);
        let tier = rule.tier();

        let confidence = CoverageTier::ALL
            .into_iter()
            .map(|candidate| (candidate, if candidate == tier { 1.0 } else { 0.0 }))
            .collect();

        TierAssignment {
            tier,
            rule,
            confidence,
        }
    }
}
