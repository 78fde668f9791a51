use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{
    normalize_token, parse_choice, AdvancedPreferences, BodyMeasurement, CurrentPlan,
    FamilyHousehold, HealthCondition, SimplePreferences, UserProfile, ValidationError,
};
use super::navigation::Step;
use super::normalizer::{MAX_AGE, MAX_CHILDREN, MIN_AGE};

pub const HEALTH_STATUS_OPTIONS: &[&str] = &["Excellent", "Good", "Fair", "Poor"];
pub const COVERAGE_GROUP_OPTIONS: &[&str] = &[
    "Just Me",
    "Me + Partner",
    "Small Family (3-4)",
    "Large Family (5+)",
];
pub const SIMPLE_BUDGET_OPTIONS: &[&str] =
    &["Under $200", "$200-400", "$400-600", "$600-800", "Over $800"];

pub const PLAN_TYPE_OPTIONS: &[&str] = &["PPO", "HMO", "EPO", "HDHP", "POS"];
pub const COVERAGE_LEVEL_OPTIONS: &[&str] = &["Bronze", "Silver", "Gold", "Platinum"];
pub const NETWORK_SIZE_OPTIONS: &[&str] = &["Local", "Regional", "National", "International"];
pub const BENEFIT_OPTIONS: &[&str] = &[
    "Dental",
    "Vision",
    "Mental Health",
    "Maternity",
    "Wellness Programs",
    "Telemedicine",
    "Alternative Medicine",
    "International Coverage",
];

pub const SATISFACTION_OPTIONS: &[&str] = &[
    "Very Unsatisfied",
    "Unsatisfied",
    "Neutral",
    "Satisfied",
    "Very Satisfied",
];
pub const SWITCH_REASON_OPTIONS: &[&str] = &[
    "Too Expensive",
    "Poor Coverage",
    "Limited Network",
    "Bad Service",
    "Life Changes",
    "Better Options Available",
];
pub const SWITCH_PRIORITY_OPTIONS: &[&str] = &[
    "Lower Costs",
    "Better Coverage",
    "Larger Network",
    "Specific Doctors",
    "Better Service",
    "Additional Benefits",
];
pub const MAX_SWITCH_PRIORITIES: usize = 3;

pub const FAMILY_CONSIDERATION_OPTIONS: &[&str] = &[
    "Pediatric Care",
    "Maternity/Pregnancy",
    "Chronic Conditions",
    "Mental Health Services",
    "Orthodontics/Dental",
    "Vision Care",
    "Special Needs Care",
    "Regular Prescriptions",
];
pub const FAMILY_BUDGET_OPTIONS: &[&str] = &[
    "Under $500",
    "$500-750",
    "$750-1000",
    "$1000-1500",
    "Over $1500",
];
pub const FAMILY_PRIORITY_OPTIONS: &[&str] = &[
    "Comprehensive Pediatric Care",
    "Low Out-of-Pocket Costs",
    "Wide Network of Providers",
    "Prescription Coverage",
    "Preventive Care Coverage",
];

const NO_CONDITIONS: &str = "None";

const MIN_MONTHLY_BUDGET: u32 = 50;
const MAX_MONTHLY_BUDGET: u32 = 2_000;
const MAX_CURRENT_PREMIUM: u32 = 3_000;
const MAX_CURRENT_DEDUCTIBLE: u32 = 15_000;
const MAX_ADULTS: u8 = 10;
const MAX_DEPENDENT_AGE: u8 = 26;

/// One completed form, tagged by the path it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum FormSubmission {
    Simple(SimpleForm),
    User(UserForm),
    Advanced(AdvancedForm),
    Switch(SwitchForm),
    Family(FamilyForm),
}

impl FormSubmission {
    pub const fn kind(&self) -> &'static str {
        match self {
            FormSubmission::Simple(_) => "simple",
            FormSubmission::User(_) => "user",
            FormSubmission::Advanced(_) => "advanced",
            FormSubmission::Switch(_) => "switch",
            FormSubmission::Family(_) => "family",
        }
    }

    /// The step whose page collects this form.
    pub const fn step(&self) -> Step {
        match self {
            FormSubmission::Simple(_) => Step::SimpleForm,
            FormSubmission::User(_) => Step::UserForm,
            FormSubmission::Advanced(_) => Step::AdvancedForm,
            FormSubmission::Switch(_) => Step::SwitchForm,
            FormSubmission::Family(_) => Step::FamilyForm,
        }
    }

    /// Validate every field and merge the answers into `profile`. Nothing is
    /// written unless the whole form is valid.
    pub fn apply_to(&self, profile: &mut UserProfile) -> Result<(), ValidationError> {
        let mut updated = profile.clone();
        match self {
            FormSubmission::Simple(form) => form.merge(&mut updated)?,
            FormSubmission::User(form) => form.merge(&mut updated)?,
            FormSubmission::Advanced(form) => form.merge(&mut updated)?,
            FormSubmission::Switch(form) => form.merge(&mut updated)?,
            FormSubmission::Family(form) => form.merge(&mut updated)?,
        }
        *profile = updated;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleForm {
    pub age: u8,
    pub health_status: String,
    pub coverage_group: String,
    pub budget: String,
    pub state: String,
}

impl SimpleForm {
    fn merge(&self, profile: &mut UserProfile) -> Result<(), ValidationError> {
        check_age(self.age)?;
        profile.age = Some(self.age);
        profile.state = Some(parse_choice(&self.state)?);
        profile.simple = Some(SimplePreferences {
            health_status: pick_option(
                "health_status",
                &self.health_status,
                HEALTH_STATUS_OPTIONS,
            )?,
            coverage_group: pick_option(
                "coverage_group",
                &self.coverage_group,
                COVERAGE_GROUP_OPTIONS,
            )?,
            budget: pick_option("budget", &self.budget, SIMPLE_BUDGET_OPTIONS)?,
        });
        Ok(())
    }
}

/// Height and weight in whichever unit system the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit_system", rename_all = "snake_case")]
pub enum MeasurementForm {
    Imperial { feet: f64, inches: f64, pounds: f64 },
    Metric { metres: f64, kilograms: f64 },
}

impl MeasurementForm {
    pub fn to_measurement(self) -> Result<BodyMeasurement, ValidationError> {
        match self {
            MeasurementForm::Imperial {
                feet,
                inches,
                pounds,
            } => BodyMeasurement::imperial(feet, inches, pounds),
            MeasurementForm::Metric { metres, kilograms } => {
                BodyMeasurement::metric(metres, kilograms)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserForm {
    pub age: u8,
    pub sex: String,
    pub smoking_status: String,
    pub state: String,
    pub measurement: MeasurementForm,
    pub children: u8,
    pub marital_status: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    pub income: String,
    pub max_monthly_budget: u32,
}

impl UserForm {
    fn merge(&self, profile: &mut UserProfile) -> Result<(), ValidationError> {
        check_age(self.age)?;
        ValidationError::check_range(
            "children",
            self.children.into(),
            0.0,
            MAX_CHILDREN.into(),
        )?;
        ValidationError::check_range(
            "max_monthly_budget",
            self.max_monthly_budget.into(),
            MIN_MONTHLY_BUDGET.into(),
            MAX_MONTHLY_BUDGET.into(),
        )?;

        profile.age = Some(self.age);
        profile.sex = Some(parse_choice(&self.sex)?);
        profile.smoking = Some(parse_choice(&self.smoking_status)?);
        profile.state = Some(parse_choice(&self.state)?);
        profile.body = Some(self.measurement.to_measurement()?);
        profile.children = Some(self.children);
        profile.marital_status = Some(parse_choice(&self.marital_status)?);
        profile.conditions = parse_conditions(&self.conditions)?;
        profile.income_bracket = Some(parse_choice(&self.income)?);
        profile.max_monthly_budget = Some(self.max_monthly_budget);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedForm {
    pub plan_type: String,
    pub coverage_level: String,
    pub network_size: String,
    #[serde(default)]
    pub out_of_network_required: bool,
    pub max_premium: u32,
    pub max_deductible: u32,
    pub max_out_of_pocket: u32,
    #[serde(default)]
    pub benefits: Vec<String>,
}

impl AdvancedForm {
    fn merge(&self, profile: &mut UserProfile) -> Result<(), ValidationError> {
        ValidationError::check_range("max_premium", self.max_premium.into(), 100.0, 3_000.0)?;
        ValidationError::check_range(
            "max_deductible",
            self.max_deductible.into(),
            500.0,
            10_000.0,
        )?;
        ValidationError::check_range(
            "max_out_of_pocket",
            self.max_out_of_pocket.into(),
            1_000.0,
            20_000.0,
        )?;

        profile.advanced = Some(AdvancedPreferences {
            plan_type: pick_option("plan_type", &self.plan_type, PLAN_TYPE_OPTIONS)?,
            coverage_level: pick_option(
                "coverage_level",
                &self.coverage_level,
                COVERAGE_LEVEL_OPTIONS,
            )?,
            network_size: pick_option("network_size", &self.network_size, NETWORK_SIZE_OPTIONS)?,
            out_of_network_required: self.out_of_network_required,
            max_premium: self.max_premium,
            max_deductible: self.max_deductible,
            max_out_of_pocket: self.max_out_of_pocket,
            benefits: pick_many("benefits", &self.benefits, BENEFIT_OPTIONS, None)?,
        });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchForm {
    #[serde(default)]
    pub provider: String,
    pub monthly_premium: u32,
    pub deductible: u32,
    pub satisfaction: String,
    #[serde(default)]
    pub switch_reasons: Vec<String>,
    #[serde(default)]
    pub priorities: Vec<String>,
}

impl SwitchForm {
    fn merge(&self, profile: &mut UserProfile) -> Result<(), ValidationError> {
        ValidationError::check_range(
            "monthly_premium",
            self.monthly_premium.into(),
            0.0,
            MAX_CURRENT_PREMIUM.into(),
        )?;
        ValidationError::check_range(
            "deductible",
            self.deductible.into(),
            0.0,
            MAX_CURRENT_DEDUCTIBLE.into(),
        )?;

        profile.current_plan = Some(CurrentPlan {
            provider: self.provider.trim().to_string(),
            monthly_premium: self.monthly_premium,
            deductible: self.deductible,
            satisfaction: pick_option("satisfaction", &self.satisfaction, SATISFACTION_OPTIONS)?,
            switch_reasons: pick_many(
                "switch_reasons",
                &self.switch_reasons,
                SWITCH_REASON_OPTIONS,
                None,
            )?,
            priorities: pick_many(
                "priorities",
                &self.priorities,
                SWITCH_PRIORITY_OPTIONS,
                Some(MAX_SWITCH_PRIORITIES),
            )?,
        });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyForm {
    pub adults: u8,
    #[serde(default)]
    pub children_ages: Vec<u8>,
    #[serde(default)]
    pub considerations: Vec<String>,
    pub budget: String,
    pub priority: String,
}

impl FamilyForm {
    fn merge(&self, profile: &mut UserProfile) -> Result<(), ValidationError> {
        ValidationError::check_range("adults", self.adults.into(), 1.0, MAX_ADULTS.into())?;
        if self.children_ages.len() > usize::from(MAX_CHILDREN) {
            return Err(ValidationError::TooManySelections {
                field: "children_ages",
                max: MAX_CHILDREN.into(),
                found: self.children_ages.len(),
            });
        }
        for age in &self.children_ages {
            ValidationError::check_range(
                "children_ages",
                (*age).into(),
                0.0,
                MAX_DEPENDENT_AGE.into(),
            )?;
        }

        profile.household = Some(FamilyHousehold {
            adults: self.adults,
            children_ages: self.children_ages.clone(),
            considerations: pick_many(
                "considerations",
                &self.considerations,
                FAMILY_CONSIDERATION_OPTIONS,
                None,
            )?,
            budget: pick_option("budget", &self.budget, FAMILY_BUDGET_OPTIONS)?,
            priority: pick_option("priority", &self.priority, FAMILY_PRIORITY_OPTIONS)?,
        });
        Ok(())
    }
}

fn check_age(age: u8) -> Result<(), ValidationError> {
    ValidationError::check_range("age", age.into(), MIN_AGE.into(), MAX_AGE.into())
}

/// Canonical label for a free-text selection from a fixed option list.
fn pick_option(
    field: &'static str,
    raw: &str,
    options: &'static [&'static str],
) -> Result<String, ValidationError> {
    let wanted = normalize_token(raw);
    options
        .iter()
        .find(|option| normalize_token(option) == wanted)
        .map(|option| option.to_string())
        .ok_or_else(|| ValidationError::UnknownChoice {
            field,
            value: raw.trim().to_string(),
        })
}

/// Multi-select variant of [`pick_option`]. Duplicates collapse; order follows
/// the submission.
fn pick_many(
    field: &'static str,
    raw: &[String],
    options: &'static [&'static str],
    max: Option<usize>,
) -> Result<Vec<String>, ValidationError> {
    let mut picked: Vec<String> = Vec::with_capacity(raw.len());
    for value in raw {
        let label = pick_option(field, value, options)?;
        if !picked.contains(&label) {
            picked.push(label);
        }
    }

    match max {
        Some(max) if picked.len() > max => Err(ValidationError::TooManySelections {
            field,
            max,
            found: picked.len(),
        }),
        _ => Ok(picked),
    }
}

/// "None" is an explicit empty answer and is dropped from the set.
fn parse_conditions(raw: &[String]) -> Result<BTreeSet<HealthCondition>, ValidationError> {
    raw.iter()
        .filter(|value| normalize_token(value) != normalize_token(NO_CONDITIONS))
        .map(|value| parse_choice::<HealthCondition>(value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::domain::{IncomeBracket, SmokingStatus, UsState};

    fn user_form() -> UserForm {
        UserForm {
            age: 45,
            sex: "Female".to_string(),
            smoking_status: "Current Smoker".to_string(),
            state: "Ohio".to_string(),
            measurement: MeasurementForm::Metric {
                metres: 1.7,
                kilograms: 90.0,
            },
            children: 1,
            marital_status: "Married".to_string(),
            conditions: vec!["None".to_string(), "Asthma".to_string()],
            income: "$75,000-100,000".to_string(),
            max_monthly_budget: 400,
        }
    }

    #[test]
    fn user_form_populates_profile() {
        let mut profile = UserProfile::default();
        FormSubmission::User(user_form())
            .apply_to(&mut profile)
            .expect("valid form");

        assert_eq!(profile.age, Some(45));
        assert_eq!(profile.smoking, Some(SmokingStatus::CurrentSmoker));
        assert_eq!(profile.state, Some(UsState::Ohio));
        assert_eq!(profile.income_bracket, Some(IncomeBracket::From75kTo100k));
        assert_eq!(
            profile.conditions.iter().copied().collect::<Vec<_>>(),
            vec![HealthCondition::Asthma]
        );
        assert_eq!(profile.bmi(), Some(31.1));
    }

    #[test]
    fn invalid_form_leaves_profile_untouched() {
        let mut profile = UserProfile {
            age: Some(33),
            ..UserProfile::default()
        };
        let mut form = user_form();
        form.income = "About tree fiddy".to_string();

        let err = FormSubmission::User(form)
            .apply_to(&mut profile)
            .unwrap_err();

        assert!(matches!(err, ValidationError::UnknownChoice { field: "income", .. }));
        assert_eq!(profile.age, Some(33));
        assert!(profile.sex.is_none());
    }

    #[test]
    fn forms_deserialize_with_tags() {
        let submission: FormSubmission = serde_json::from_value(serde_json::json!({
            "form": "simple",
            "age": 28,
            "health_status": "good",
            "coverage_group": "Just Me",
            "budget": "$200-400",
            "state": "Texas",
        }))
        .expect("simple form parses");

        assert_eq!(submission.step(), Step::SimpleForm);
        let mut profile = UserProfile::default();
        submission.apply_to(&mut profile).expect("valid");
        assert_eq!(
            profile.simple.map(|prefs| prefs.health_status),
            Some("Good".to_string())
        );
    }

    #[test]
    fn switch_priorities_are_capped() {
        let form = SwitchForm {
            provider: "Acme".to_string(),
            monthly_premium: 350,
            deductible: 2_500,
            satisfaction: "Neutral".to_string(),
            switch_reasons: vec!["Too Expensive".to_string()],
            priorities: vec![
                "Lower Costs".to_string(),
                "Better Coverage".to_string(),
                "Larger Network".to_string(),
                "Better Service".to_string(),
            ],
        };

        let err = FormSubmission::Switch(form)
            .apply_to(&mut UserProfile::default())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooManySelections {
                field: "priorities",
                max: MAX_SWITCH_PRIORITIES,
                found: 4,
            }
        );
    }

    #[test]
    fn family_form_rejects_adult_dependents() {
        let form = FamilyForm {
            adults: 2,
            children_ages: vec![4, 30],
            considerations: Vec::new(),
            budget: "$750-1000".to_string(),
            priority: "Prescription Coverage".to_string(),
        };

        let err = FormSubmission::Family(form)
            .apply_to(&mut UserProfile::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: "children_ages",
                ..
            }
        ));
    }

    #[test]
    fn negative_height_is_rejected_at_submission() {
        let mut form = user_form();
        form.measurement = MeasurementForm::Imperial {
            feet: -5.0,
            inches: 8.0,
            pounds: 160.0,
        };
        let err = FormSubmission::User(form)
            .apply_to(&mut UserProfile::default())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMeasurement { .. }));
    }

    #[test]
    fn height_in_centimetres_is_rejected_not_defaulted() {
        let mut form = user_form();
        form.measurement = MeasurementForm::Metric {
            metres: 170.0,
            kilograms: 60.0,
        };
        let mut profile = UserProfile::default();
        let err = FormSubmission::User(form)
            .apply_to(&mut profile)
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "height", .. }));
        assert!(profile.body.is_none());
    }
}
