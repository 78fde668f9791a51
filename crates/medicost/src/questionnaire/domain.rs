use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::units::{self, BmiCategory, UnitSystem};

/// Raised when a form field carries a value outside its declared domain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: unrecognized value '{value}'")]
    UnknownChoice { field: &'static str, value: String },
    #[error("{field}: {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be a non-negative finite number (found {value})")]
    InvalidMeasurement { field: &'static str, value: f64 },
    #[error("{field}: at most {max} selections allowed (found {found})")]
    TooManySelections {
        field: &'static str,
        max: usize,
        found: usize,
    },
}

impl ValidationError {
    pub(crate) fn check_range(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), ValidationError> {
        if value.is_finite() && value >= min && value <= max {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min,
                max,
            })
        }
    }
}

/// Enumerated form selection with a fixed, display-facing label set.
pub trait Choice: Copy + Sized + 'static {
    const FIELD: &'static str;

    fn all() -> &'static [Self];
    fn label(self) -> &'static str;
}

/// Resolve raw form text against a choice's labels. Matching ignores case and
/// treats `_`, `-` and whitespace runs alike, so `current_smoker` selects
/// "Current Smoker".
pub fn parse_choice<T: Choice>(raw: &str) -> Result<T, ValidationError> {
    let wanted = normalize_token(raw);
    T::all()
        .iter()
        .copied()
        .find(|option| normalize_token(option.label()) == wanted)
        .ok_or_else(|| ValidationError::UnknownChoice {
            field: T::FIELD,
            value: raw.trim().to_string(),
        })
}

pub(crate) fn normalize_token(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

macro_rules! choice_from_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = ValidationError;

                fn from_str(raw: &str) -> Result<Self, Self::Err> {
                    parse_choice(raw)
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageTier {
    BudgetFriendly,
    Comprehensive,
    Family,
    Senior,
}

impl CoverageTier {
    pub const ALL: [CoverageTier; 4] = [
        CoverageTier::BudgetFriendly,
        CoverageTier::Comprehensive,
        CoverageTier::Family,
        CoverageTier::Senior,
    ];

    /// Catalog key, e.g. `budget_friendly`.
    pub const fn key(self) -> &'static str {
        match self {
            CoverageTier::BudgetFriendly => "budget_friendly",
            CoverageTier::Comprehensive => "comprehensive",
            CoverageTier::Family => "family",
            CoverageTier::Senior => "senior",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.key() == key.trim())
    }
}

impl Choice for CoverageTier {
    const FIELD: &'static str = "tier";

    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn label(self) -> &'static str {
        match self {
            CoverageTier::BudgetFriendly => "Budget Friendly",
            CoverageTier::Comprehensive => "Comprehensive",
            CoverageTier::Family => "Family",
            CoverageTier::Senior => "Senior",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Explore,
    Estimate,
    Family,
    Learn,
}

impl Choice for Intent {
    const FIELD: &'static str = "intent";

    fn all() -> &'static [Self] {
        &[Intent::Explore, Intent::Estimate, Intent::Family, Intent::Learn]
    }

    fn label(self) -> &'static str {
        match self {
            Intent::Explore => "Explore",
            Intent::Estimate => "Estimate",
            Intent::Family => "Family",
            Intent::Learn => "Learn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Expert,
    Switching,
}

impl Choice for ExperienceLevel {
    const FIELD: &'static str = "experience";

    fn all() -> &'static [Self] {
        &[
            ExperienceLevel::Beginner,
            ExperienceLevel::Intermediate,
            ExperienceLevel::Expert,
            ExperienceLevel::Switching,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "Beginner",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Expert => "Expert",
            ExperienceLevel::Switching => "Switching",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Choice for Sex {
    const FIELD: &'static str = "sex";

    fn all() -> &'static [Self] {
        &[Sex::Male, Sex::Female, Sex::Other, Sex::PreferNotToSay]
    }

    fn label(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Other => "Other",
            Sex::PreferNotToSay => "Prefer not to say",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmokingStatus {
    NonSmoker,
    FormerSmoker,
    CurrentSmoker,
}

impl SmokingStatus {
    /// Only current smokers count toward the smoker feature.
    pub const fn smoker_flag(self) -> u8 {
        match self {
            SmokingStatus::CurrentSmoker => 1,
            SmokingStatus::NonSmoker | SmokingStatus::FormerSmoker => 0,
        }
    }
}

impl Choice for SmokingStatus {
    const FIELD: &'static str = "smoking_status";

    fn all() -> &'static [Self] {
        &[
            SmokingStatus::NonSmoker,
            SmokingStatus::FormerSmoker,
            SmokingStatus::CurrentSmoker,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            SmokingStatus::NonSmoker => "Non-smoker",
            SmokingStatus::FormerSmoker => "Former Smoker",
            SmokingStatus::CurrentSmoker => "Current Smoker",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl Choice for MaritalStatus {
    const FIELD: &'static str = "marital_status";

    fn all() -> &'static [Self] {
        &[
            MaritalStatus::Single,
            MaritalStatus::Married,
            MaritalStatus::Divorced,
            MaritalStatus::Widowed,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            MaritalStatus::Single => "Single",
            MaritalStatus::Married => "Married",
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Widowed => "Widowed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCondition {
    Diabetes,
    HeartDisease,
    HighBloodPressure,
    Asthma,
    MentalHealth,
    Arthritis,
    CancerHistory,
    ChronicPain,
    Other,
}

impl Choice for HealthCondition {
    const FIELD: &'static str = "conditions";

    fn all() -> &'static [Self] {
        &[
            HealthCondition::Diabetes,
            HealthCondition::HeartDisease,
            HealthCondition::HighBloodPressure,
            HealthCondition::Asthma,
            HealthCondition::MentalHealth,
            HealthCondition::Arthritis,
            HealthCondition::CancerHistory,
            HealthCondition::ChronicPain,
            HealthCondition::Other,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            HealthCondition::Diabetes => "Diabetes",
            HealthCondition::HeartDisease => "Heart Disease",
            HealthCondition::HighBloodPressure => "High Blood Pressure",
            HealthCondition::Asthma => "Asthma",
            HealthCondition::MentalHealth => "Mental Health Conditions",
            HealthCondition::Arthritis => "Arthritis",
            HealthCondition::CancerHistory => "Cancer History",
            HealthCondition::ChronicPain => "Chronic Pain",
            HealthCondition::Other => "Other",
        }
    }
}

/// Annual household income brackets offered by the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeBracket {
    Under30k,
    From30kTo50k,
    From50kTo75k,
    From75kTo100k,
    From100kTo150k,
    Over150k,
}

impl Choice for IncomeBracket {
    const FIELD: &'static str = "income";

    fn all() -> &'static [Self] {
        &[
            IncomeBracket::Under30k,
            IncomeBracket::From30kTo50k,
            IncomeBracket::From50kTo75k,
            IncomeBracket::From75kTo100k,
            IncomeBracket::From100kTo150k,
            IncomeBracket::Over150k,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            IncomeBracket::Under30k => "Under $30,000",
            IncomeBracket::From30kTo50k => "$30,000-50,000",
            IncomeBracket::From50kTo75k => "$50,000-75,000",
            IncomeBracket::From75kTo100k => "$75,000-100,000",
            IncomeBracket::From100kTo150k => "$100,000-150,000",
            IncomeBracket::Over150k => "Over $150,000",
        }
    }
}

/// Seven regions of the state table. Several collapse onto one feature code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Northeast,
    Southeast,
    Midwest,
    West,
    Southwest,
    Northwest,
    South,
}

impl Choice for Region {
    const FIELD: &'static str = "region";

    fn all() -> &'static [Self] {
        &[
            Region::Northeast,
            Region::Southeast,
            Region::Midwest,
            Region::West,
            Region::Southwest,
            Region::Northwest,
            Region::South,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            Region::Northeast => "Northeast",
            Region::Southeast => "Southeast",
            Region::Midwest => "Midwest",
            Region::West => "West",
            Region::Southwest => "Southwest",
            Region::Northwest => "Northwest",
            Region::South => "South",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsState {
    Alabama,
    Alaska,
    Arizona,
    Arkansas,
    California,
    Colorado,
    Connecticut,
    Delaware,
    Florida,
    Georgia,
    Hawaii,
    Idaho,
    Illinois,
    Indiana,
    Iowa,
    Kansas,
    Kentucky,
    Louisiana,
    Maine,
    Maryland,
    Massachusetts,
    Michigan,
    Minnesota,
    Mississippi,
    Missouri,
    Montana,
    Nebraska,
    Nevada,
    NewHampshire,
    NewJersey,
    NewMexico,
    NewYork,
    NorthCarolina,
    NorthDakota,
    Ohio,
    Oklahoma,
    Oregon,
    Pennsylvania,
    RhodeIsland,
    SouthCarolina,
    SouthDakota,
    Tennessee,
    Texas,
    Utah,
    Vermont,
    Virginia,
    Washington,
    WestVirginia,
    Wisconsin,
    Wyoming,
}

/// State name and region, one row per state.
const STATE_TABLE: [(UsState, &str, Region); 50] = [
    (UsState::Alabama, "Alabama", Region::Southeast),
    (UsState::Alaska, "Alaska", Region::Northwest),
    (UsState::Arizona, "Arizona", Region::Southwest),
    (UsState::Arkansas, "Arkansas", Region::South),
    (UsState::California, "California", Region::West),
    (UsState::Colorado, "Colorado", Region::West),
    (UsState::Connecticut, "Connecticut", Region::Northeast),
    (UsState::Delaware, "Delaware", Region::Northeast),
    (UsState::Florida, "Florida", Region::Southeast),
    (UsState::Georgia, "Georgia", Region::Southeast),
    (UsState::Hawaii, "Hawaii", Region::West),
    (UsState::Idaho, "Idaho", Region::Northwest),
    (UsState::Illinois, "Illinois", Region::Midwest),
    (UsState::Indiana, "Indiana", Region::Midwest),
    (UsState::Iowa, "Iowa", Region::Midwest),
    (UsState::Kansas, "Kansas", Region::Midwest),
    (UsState::Kentucky, "Kentucky", Region::South),
    (UsState::Louisiana, "Louisiana", Region::South),
    (UsState::Maine, "Maine", Region::Northeast),
    (UsState::Maryland, "Maryland", Region::Northeast),
    (UsState::Massachusetts, "Massachusetts", Region::Northeast),
    (UsState::Michigan, "Michigan", Region::Midwest),
    (UsState::Minnesota, "Minnesota", Region::Midwest),
    (UsState::Mississippi, "Mississippi", Region::South),
    (UsState::Missouri, "Missouri", Region::Midwest),
    (UsState::Montana, "Montana", Region::Northwest),
    (UsState::Nebraska, "Nebraska", Region::Midwest),
    (UsState::Nevada, "Nevada", Region::West),
    (UsState::NewHampshire, "New Hampshire", Region::Northeast),
    (UsState::NewJersey, "New Jersey", Region::Northeast),
    (UsState::NewMexico, "New Mexico", Region::Southwest),
    (UsState::NewYork, "New York", Region::Northeast),
    (UsState::NorthCarolina, "North Carolina", Region::Southeast),
    (UsState::NorthDakota, "North Dakota", Region::Midwest),
    (UsState::Ohio, "Ohio", Region::Midwest),
    (UsState::Oklahoma, "Oklahoma", Region::South),
    (UsState::Oregon, "Oregon", Region::Northwest),
    (UsState::Pennsylvania, "Pennsylvania", Region::Northeast),
    (UsState::RhodeIsland, "Rhode Island", Region::Northeast),
    (UsState::SouthCarolina, "South Carolina", Region::Southeast),
    (UsState::SouthDakota, "South Dakota", Region::Midwest),
    (UsState::Tennessee, "Tennessee", Region::South),
    (UsState::Texas, "Texas", Region::South),
    (UsState::Utah, "Utah", Region::West),
    (UsState::Vermont, "Vermont", Region::Northeast),
    (UsState::Virginia, "Virginia", Region::Southeast),
    (UsState::Washington, "Washington", Region::Northwest),
    (UsState::WestVirginia, "West Virginia", Region::Southeast),
    (UsState::Wisconsin, "Wisconsin", Region::Midwest),
    (UsState::Wyoming, "Wyoming", Region::West),
];

impl UsState {
    pub const ALL: [UsState; 50] = {
        let mut states = [UsState::Alabama; 50];
        let mut idx = 0;
        while idx < STATE_TABLE.len() {
            states[idx] = STATE_TABLE[idx].0;
            idx += 1;
        }
        states
    };

    // The table is declared in enum order, so the discriminant indexes it.
    fn row(self) -> (UsState, &'static str, Region) {
        STATE_TABLE[self as usize]
    }

    pub fn region(self) -> Region {
        self.row().2
    }
}

impl Choice for UsState {
    const FIELD: &'static str = "state";

    fn all() -> &'static [Self] {
        &Self::ALL
    }

    fn label(self) -> &'static str {
        self.row().1
    }
}

choice_from_str!(
    CoverageTier,
    Intent,
    ExperienceLevel,
    Sex,
    SmokingStatus,
    MaritalStatus,
    HealthCondition,
    IncomeBracket,
    Region,
    UsState,
);

/// Height and weight as entered. Imperial height is total inches and weight
/// pounds; metric height is metres and weight kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurement {
    pub unit_system: UnitSystem,
    pub height: f64,
    pub weight: f64,
}

pub const MIN_HEIGHT_FEET: f64 = 3.0;
pub const MAX_HEIGHT_FEET: f64 = 8.0;
pub const MAX_HEIGHT_INCHES: f64 = 11.0;
pub const MIN_WEIGHT_POUNDS: f64 = 50.0;
pub const MAX_WEIGHT_POUNDS: f64 = 500.0;
pub const MIN_HEIGHT_METRES: f64 = 1.0;
pub const MAX_HEIGHT_METRES: f64 = 2.5;
pub const MIN_WEIGHT_KILOGRAMS: f64 = 25.0;
pub const MAX_WEIGHT_KILOGRAMS: f64 = 250.0;

impl BodyMeasurement {
    /// A height of exactly zero is accepted as unanswered; any other height
    /// must fall inside the form's bounds.
    pub fn imperial(feet: f64, inches: f64, pounds: f64) -> Result<Self, ValidationError> {
        check_measurement("height_feet", feet)?;
        check_measurement("height_inches", inches)?;
        check_measurement("weight", pounds)?;
        ValidationError::check_range("height_inches", inches, 0.0, MAX_HEIGHT_INCHES)?;
        if feet > 0.0 || inches > 0.0 {
            ValidationError::check_range("height_feet", feet, MIN_HEIGHT_FEET, MAX_HEIGHT_FEET)?;
        }
        ValidationError::check_range("weight", pounds, MIN_WEIGHT_POUNDS, MAX_WEIGHT_POUNDS)?;
        Ok(Self {
            unit_system: UnitSystem::Imperial,
            height: feet * 12.0 + inches,
            weight: pounds,
        })
    }

    pub fn metric(metres: f64, kilograms: f64) -> Result<Self, ValidationError> {
        check_measurement("height", metres)?;
        check_measurement("weight", kilograms)?;
        if metres > 0.0 {
            ValidationError::check_range("height", metres, MIN_HEIGHT_METRES, MAX_HEIGHT_METRES)?;
        }
        ValidationError::check_range(
            "weight",
            kilograms,
            MIN_WEIGHT_KILOGRAMS,
            MAX_WEIGHT_KILOGRAMS,
        )?;
        Ok(Self {
            unit_system: UnitSystem::Metric,
            height: metres,
            weight: kilograms,
        })
    }

    pub fn bmi(&self) -> f64 {
        units::bmi(self.height, self.weight, self.unit_system)
    }
}

fn check_measurement(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidMeasurement { field, value })
    }
}

/// Selections captured by the beginner path. None of them feed the feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplePreferences {
    pub health_status: String,
    pub coverage_group: String,
    pub budget: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedPreferences {
    pub plan_type: String,
    pub coverage_level: String,
    pub network_size: String,
    pub out_of_network_required: bool,
    pub max_premium: u32,
    pub max_deductible: u32,
    pub max_out_of_pocket: u32,
    pub benefits: Vec<String>,
}

/// Plan the user holds today, collected on the switching path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPlan {
    pub provider: String,
    pub monthly_premium: u32,
    pub deductible: u32,
    pub satisfaction: String,
    pub switch_reasons: Vec<String>,
    pub priorities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyHousehold {
    pub adults: u8,
    pub children_ages: Vec<u8>,
    pub considerations: Vec<String>,
    pub budget: String,
    pub priority: String,
}

impl FamilyHousehold {
    pub fn members(&self) -> u32 {
        u32::from(self.adults) + self.children_ages.len() as u32
    }
}

/// Answers accumulated across form steps for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub intent: Option<Intent>,
    pub experience: Option<ExperienceLevel>,
    pub age: Option<u8>,
    pub sex: Option<Sex>,
    pub smoking: Option<SmokingStatus>,
    pub state: Option<UsState>,
    pub body: Option<BodyMeasurement>,
    pub children: Option<u8>,
    pub marital_status: Option<MaritalStatus>,
    #[serde(default)]
    pub conditions: BTreeSet<HealthCondition>,
    pub income_bracket: Option<IncomeBracket>,
    pub max_monthly_budget: Option<u32>,
    pub simple: Option<SimplePreferences>,
    pub advanced: Option<AdvancedPreferences>,
    pub current_plan: Option<CurrentPlan>,
    pub household: Option<FamilyHousehold>,
}

impl UserProfile {
    /// Region derived from the selected state.
    pub fn region(&self) -> Option<Region> {
        self.state.map(UsState::region)
    }

    /// Always recomputed from the recorded measurement.
    pub fn bmi(&self) -> Option<f64> {
        self.body.as_ref().map(BodyMeasurement::bmi)
    }

    pub fn bmi_category(&self) -> Option<BmiCategory> {
        self.bmi()
            .filter(|bmi| *bmi > 0.0)
            .map(BmiCategory::from_bmi)
    }
}

/// Canonical numeric input for tier classification and cost estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub age: u8,
    pub bmi: f64,
    pub smoker: u8,
    pub children: u8,
    pub region_code: u8,
    pub income_level: u8,
}
