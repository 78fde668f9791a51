use serde::{Deserialize, Serialize};

use super::super::domain::FeatureVector;

pub const MIN_ANNUAL_COST: f64 = 1_000.0;
pub const MAX_ANNUAL_COST: f64 = 15_000.0;

const COST_PER_YEAR_OF_AGE: f64 = 50.0;
const COST_PER_BMI_POINT: f64 = 30.0;
const SMOKER_SURCHARGE: f64 = 2_000.0;
const COST_PER_CHILD: f64 = 500.0;

pub const LOW_USAGE_MULTIPLIER: f64 = 0.7;
pub const AVERAGE_USAGE_MULTIPLIER: f64 = 1.0;
pub const HIGH_USAGE_MULTIPLIER: f64 = 1.5;

/// Usage projections derived from the point estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostScenarios {
    pub low: f64,
    pub average: f64,
    pub high: f64,
}

impl CostScenarios {
    pub fn from_point(point: f64) -> Self {
        Self {
            low: point * LOW_USAGE_MULTIPLIER,
            average: point * AVERAGE_USAGE_MULTIPLIER,
            high: point * HIGH_USAGE_MULTIPLIER,
        }
    }
}

/// Estimated annual healthcare spend for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub point: f64,
    pub scenarios: CostScenarios,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CostEstimator;

impl CostEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Linear in each input and clamped to the supported range, so raising any
    /// input never lowers the estimate.
    pub fn estimate(&self, features: &FeatureVector) -> CostEstimate {
        let base = f64::from(features.age) * COST_PER_YEAR_OF_AGE
            + features.bmi * COST_PER_BMI_POINT
            + f64::from(features.smoker) * SMOKER_SURCHARGE
            + f64::from(features.children) * COST_PER_CHILD;

        let point = if base.is_nan() {
            MIN_ANNUAL_COST
        } else {
            base.clamp(MIN_ANNUAL_COST, MAX_ANNUAL_COST)
        };

        CostEstimate {
            point,
            scenarios: CostScenarios::from_point(point),
        }
    }
}
