use super::domain::{Choice, FeatureVector, IncomeBracket, Region, UserProfile, ValidationError};

/// Feature values used when the user's path never asked the question.
pub const DEFAULT_AGE: u8 = 30;
pub const DEFAULT_BMI: f64 = 25.0;
pub const DEFAULT_CHILDREN: u8 = 0;
pub const DEFAULT_INCOME_LEVEL: u8 = 3;
pub const DEFAULT_SMOKER: u8 = 0;
pub const DEFAULT_REGION: Region = Region::Northeast;

pub const MIN_AGE: u8 = 18;
pub const MAX_AGE: u8 = 100;
pub const MAX_CHILDREN: u8 = 10;

const INCOME_LEVELS: [(IncomeBracket, u8); 6] = [
    (IncomeBracket::Under30k, 1),
    (IncomeBracket::From30kTo50k, 2),
    (IncomeBracket::From50kTo75k, 3),
    (IncomeBracket::From75kTo100k, 4),
    (IncomeBracket::From100kTo150k, 5),
    (IncomeBracket::Over150k, 6),
];

// Seven regions onto four codes. Southwest shares Midwest's code, Northwest
// shares West's and South shares Southeast's.
const REGION_CODES: [(Region, u8); 7] = [
    (Region::Northeast, 0),
    (Region::Southeast, 1),
    (Region::Midwest, 2),
    (Region::West, 3),
    (Region::Southwest, 2),
    (Region::Northwest, 3),
    (Region::South, 1),
];

pub fn income_level(bracket: IncomeBracket) -> Option<u8> {
    INCOME_LEVELS
        .iter()
        .find(|(candidate, _)| *candidate == bracket)
        .map(|(_, level)| *level)
}

pub fn region_code(region: Region) -> Option<u8> {
    REGION_CODES
        .iter()
        .find(|(candidate, _)| *candidate == region)
        .map(|(_, code)| *code)
}

fn unmapped<T: Choice>(value: T) -> ValidationError {
    ValidationError::UnknownChoice {
        field: T::FIELD,
        value: value.label().to_string(),
    }
}

/// Turns an accumulated profile into the canonical feature vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileNormalizer;

impl ProfileNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Explicit answers always win; defaults fill only unanswered fields. A
    /// recorded BMI of zero comes from a degenerate height and counts as
    /// unanswered.
    pub fn normalize(&self, profile: &UserProfile) -> Result<FeatureVector, ValidationError> {
        let age = profile.age.unwrap_or(DEFAULT_AGE);
        ValidationError::check_range("age", age.into(), MIN_AGE.into(), MAX_AGE.into())?;

        let children = profile.children.unwrap_or(DEFAULT_CHILDREN);
        ValidationError::check_range("children", children.into(), 0.0, MAX_CHILDREN.into())?;

        let bmi = profile
            .bmi()
            .filter(|bmi| *bmi > 0.0)
            .unwrap_or(DEFAULT_BMI);

        let smoker = profile
            .smoking
            .map(|status| status.smoker_flag())
            .unwrap_or(DEFAULT_SMOKER);

        let region = profile.region().unwrap_or(DEFAULT_REGION);
        let region_code = region_code(region).ok_or_else(|| unmapped(region))?;

        let income_level = match profile.income_bracket {
            Some(bracket) => income_level(bracket).ok_or_else(|| unmapped(bracket))?,
            None => DEFAULT_INCOME_LEVEL,
        };

        Ok(FeatureVector {
            age,
            bmi,
            smoker,
            children,
            region_code,
            income_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::domain::{parse_choice, BodyMeasurement, SmokingStatus, UsState};

    #[test]
    fn every_bracket_maps_to_a_distinct_level() {
        let levels: Vec<u8> = IncomeBracket::all()
            .iter()
            .map(|bracket| income_level(*bracket).expect("bracket mapped"))
            .collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn income_labels_resolve_to_levels() {
        let level = |raw: &str| parse_choice::<IncomeBracket>(raw).map(income_level);
        assert_eq!(level("Under $30,000"), Ok(Some(1)));
        assert_eq!(level("$100,000-150,000"), Ok(Some(5)));
        assert!(matches!(
            level("$1,000,000+"),
            Err(ValidationError::UnknownChoice { field: "income", .. })
        ));
    }

    #[test]
    fn region_codes_collapse_seven_regions_onto_four() {
        let code = |raw: &str| parse_choice::<Region>(raw).map(region_code);
        assert_eq!(code("Northeast"), Ok(Some(0)));
        assert_eq!(code("Southeast"), Ok(Some(1)));
        assert_eq!(code("South"), Ok(Some(1)));
        assert_eq!(code("Midwest"), Ok(Some(2)));
        assert_eq!(code("Southwest"), Ok(Some(2)));
        assert_eq!(code("West"), Ok(Some(3)));
        assert_eq!(code("Northwest"), Ok(Some(3)));
        assert!(code("Pacific").is_err());
    }

    #[test]
    fn empty_profile_uses_documented_defaults() {
        let features = ProfileNormalizer::new()
            .normalize(&UserProfile::default())
            .expect("defaults normalize");

        assert_eq!(
            features,
            FeatureVector {
                age: DEFAULT_AGE,
                bmi: DEFAULT_BMI,
                smoker: DEFAULT_SMOKER,
                children: DEFAULT_CHILDREN,
                region_code: 0,
                income_level: DEFAULT_INCOME_LEVEL,
            }
        );
    }

    #[test]
    fn explicit_answers_are_never_overridden() {
        let profile = UserProfile {
            age: Some(52),
            smoking: Some(SmokingStatus::CurrentSmoker),
            state: Some(UsState::Arizona),
            body: Some(BodyMeasurement::metric(1.5, 72.0).expect("valid")),
            children: Some(0),
            income_bracket: Some(IncomeBracket::Under30k),
            ..UserProfile::default()
        };

        let features = ProfileNormalizer::new()
            .normalize(&profile)
            .expect("profile normalizes");

        assert_eq!(features.age, 52);
        assert_eq!(features.smoker, 1);
        assert_eq!(features.children, 0);
        assert_eq!(features.region_code, 2);
        assert_eq!(features.income_level, 1);
        assert_eq!(features.bmi, 32.0);
    }

    #[test]
    fn former_smokers_are_not_flagged() {
        let profile = UserProfile {
            smoking: Some(SmokingStatus::FormerSmoker),
            ..UserProfile::default()
        };
        let features = ProfileNormalizer::new().normalize(&profile).expect("ok");
        assert_eq!(features.smoker, 0);
    }

    #[test]
    fn degenerate_height_falls_back_to_default_bmi() {
        let profile = UserProfile {
            body: Some(BodyMeasurement::metric(0.0, 70.0).expect("zero height accepted")),
            ..UserProfile::default()
        };
        let features = ProfileNormalizer::new().normalize(&profile).expect("ok");
        assert_eq!(features.bmi, DEFAULT_BMI);
    }

    #[test]
    fn out_of_range_age_is_rejected() {
        let profile = UserProfile {
            age: Some(12),
            ..UserProfile::default()
        };
        let err = ProfileNormalizer::new().normalize(&profile).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange { field: "age", .. }
        ));
    }
}
