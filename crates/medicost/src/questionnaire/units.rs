use serde::{Deserialize, Serialize};

const METRES_PER_INCH: f64 = 0.0254;
const KILOGRAMS_PER_POUND: f64 = 0.453592;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Imperial,
    Metric,
}

/// Body-mass index from a height/weight pair, rounded to one decimal.
///
/// Imperial input is total inches and pounds; metric input is metres and
/// kilograms. A non-positive height yields `0.0`.
pub fn bmi(height: f64, weight: f64, unit_system: UnitSystem) -> f64 {
    let (height_m, weight_kg) = match unit_system {
        UnitSystem::Imperial => (height * METRES_PER_INCH, weight * KILOGRAMS_PER_POUND),
        UnitSystem::Metric => (height, weight),
    };

    if height_m.is_nan() || height_m <= 0.0 {
        return 0.0;
    }

    round_one_decimal(weight_kg / (height_m * height_m))
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Display band for a BMI value. Upper bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

const BMI_BANDS: [(f64, BmiCategory); 3] = [
    (18.5, BmiCategory::Underweight),
    (25.0, BmiCategory::Normal),
    (30.0, BmiCategory::Overweight),
];

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        BMI_BANDS
            .iter()
            .find(|(upper, _)| bmi < *upper)
            .map(|(_, category)| *category)
            .unwrap_or(BmiCategory::Obese)
    }

    pub const fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}
