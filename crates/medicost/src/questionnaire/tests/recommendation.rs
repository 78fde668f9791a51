use proptest::prelude::*;

use super::common::*;
use crate::questionnaire::domain::{CoverageTier, CurrentPlan, FamilyHousehold, UserProfile};
use crate::questionnaire::navigation::Step;
use crate::questionnaire::recommendation::{
    CostEstimator, RecommendationEngine, RecommendationError, RecommendationOutcome,
    TierClassifier, TierRule, MAX_ANNUAL_COST, MAX_SWITCH_OFFERS, MIN_ANNUAL_COST,
};

#[test]
fn seventy_year_old_is_senior() {
    let assignment = TierClassifier::new().classify(&features(70, 25.0, 0, 0, 3));
    assert_eq!(assignment.tier, CoverageTier::Senior);
    assert_eq!(assignment.rule, TierRule::SeniorAge);
}

#[test]
fn three_children_is_family() {
    let assignment = TierClassifier::new().classify(&features(40, 22.0, 0, 3, 5));
    assert_eq!(assignment.tier, CoverageTier::Family);
}

#[test]
fn young_and_healthy_is_budget_friendly() {
    let assignment = TierClassifier::new().classify(&features(25, 22.0, 0, 0, 5));
    assert_eq!(assignment.tier, CoverageTier::BudgetFriendly);
    assert_eq!(assignment.rule, TierRule::YoungAndHealthy);
}

#[test]
fn middle_aged_smoker_is_comprehensive() {
    let assignment = TierClassifier::new().classify(&features(45, 31.0, 1, 1, 4));
    assert_eq!(assignment.tier, CoverageTier::Comprehensive);
    assert_eq!(assignment.rule, TierRule::Fallback);
}

#[test]
fn low_income_outranks_age_and_bmi() {
    let assignment = TierClassifier::new().classify(&features(50, 34.0, 1, 1, 2));
    assert_eq!(assignment.tier, CoverageTier::BudgetFriendly);
    assert_eq!(assignment.rule, TierRule::LowIncome);
}

#[test]
fn senior_age_outranks_large_family() {
    let assignment = TierClassifier::new().classify(&features(65, 22.0, 0, 4, 1));
    assert_eq!(assignment.tier, CoverageTier::Senior);
}

#[test]
fn confidence_covers_every_tier_in_catalog_order() {
    let assignment = TierClassifier::new().classify(&features(40, 22.0, 0, 3, 5));
    let tiers: Vec<CoverageTier> = assignment.confidence.keys().copied().collect();
    assert_eq!(tiers, CoverageTier::ALL.to_vec());
    assert_eq!(assignment.confidence_for(CoverageTier::Family), 1.0);
    assert_eq!(assignment.confidence_for(CoverageTier::Senior), 0.0);
}

#[test]
fn estimate_follows_linear_formula() {
    let estimate = CostEstimator::new().estimate(&features(45, 31.0, 1, 1, 4));
    // 45*50 + 31*30 + 2000 + 500
    assert_eq!(estimate.point, 5_680.0);
    assert_eq!(estimate.scenarios.average, 5_680.0);
}

#[test]
fn estimate_is_clamped_at_both_ends() {
    let floor = CostEstimator::new().estimate(&features(18, 0.0, 0, 0, 3));
    assert_eq!(floor.point, MIN_ANNUAL_COST);

    let ceiling = CostEstimator::new().estimate(&features(100, 120.0, 1, 10, 3));
    assert_eq!(ceiling.point, MAX_ANNUAL_COST);
}

#[test]
fn family_tier_lists_plans_in_stored_order() {
    let catalog = catalog();
    let names: Vec<&str> = catalog
        .plans_for_tier("family")
        .expect("family tier present")
        .iter()
        .map(|plan| plan.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Kaiser Permanente", "UnitedHealthcare", "Anthem BlueCross"]
    );
}

#[test]
fn engine_attaches_tier_plans_with_annual_totals() {
    let engine = RecommendationEngine::new(catalog());
    let recommendation = engine
        .recommend_features(features(70, 25.0, 0, 0, 3))
        .expect("senior plans present");

    assert_eq!(recommendation.tier, CoverageTier::Senior);
    assert_eq!(recommendation.plans.len(), 3);
    let humana = &recommendation.plans[0];
    assert_eq!(humana.plan.name, "Humana Medicare Advantage");
    assert_eq!(humana.estimated_annual_total, 1_500.0 + 360.0);
}

#[test]
fn unanswered_profile_gets_default_features() {
    let engine = RecommendationEngine::new(catalog());
    let recommendation = engine
        .recommend(&UserProfile::default())
        .expect("defaults recommend");

    // age 30, bmi 25, income 3: no narrower rule applies
    assert_eq!(recommendation.tier, CoverageTier::Comprehensive);
    assert_eq!(recommendation.features.region_code, 0);
    assert_eq!(recommendation.cost_estimate.point, 1_500.0 + 750.0);
}

#[test]
fn family_outcome_prices_per_member() {
    let engine = RecommendationEngine::new(catalog());
    let profile = UserProfile {
        household: Some(FamilyHousehold {
            adults: 2,
            children_ages: vec![3, 7],
            considerations: Vec::new(),
            budget: "$750-1000".to_string(),
            priority: "Low Out-of-Pocket Costs".to_string(),
        }),
        ..UserProfile::default()
    };

    let outcome = engine
        .outcome_for(Step::FamilyRecommendations, &profile)
        .expect("family outcome");
    let family = match outcome {
        RecommendationOutcome::Family(family) => family,
        other => panic!("expected family outcome, got {other:?}"),
    };

    assert_eq!(family.household_size, 4);
    assert_eq!(family.plans[0].per_person_monthly, 195.0);
    assert_eq!(family.plans[0].annual_premium, 9_360);
}

#[test]
fn switch_outcome_keeps_cheapest_plans_under_ceiling() {
    let engine = RecommendationEngine::new(catalog());
    let profile = UserProfile {
        current_plan: Some(CurrentPlan {
            provider: "Legacy Mutual".to_string(),
            monthly_premium: 150,
            deductible: 2_000,
            satisfaction: "Neutral".to_string(),
            switch_reasons: Vec::new(),
            priorities: Vec::new(),
        }),
        ..UserProfile::default()
    };

    let outcome = engine
        .outcome_for(Step::SwitchRecommendations, &profile)
        .expect("switch outcome");
    let switch = match outcome {
        RecommendationOutcome::Switch(switch) => switch,
        other => panic!("expected switch outcome, got {other:?}"),
    };

    // ceiling 180: Wellcare 95, Humana 125, Aetna Medicare 145
    let names: Vec<&str> = switch.plans.iter().map(|offer| offer.plan.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Wellcare Medicare", "Humana Medicare Advantage", "Aetna Medicare"]
    );
    assert_eq!(switch.plans[0].monthly_savings, 55);
    assert_eq!(switch.plans[2].monthly_savings, 5);
}

#[test]
fn switch_ceiling_is_inclusive_and_savings_never_negative() {
    let engine = RecommendationEngine::new(catalog());
    let profile = UserProfile {
        current_plan: Some(CurrentPlan {
            provider: String::new(),
            // 100 * 1.2 = 120 keeps Wellcare (95) only
            monthly_premium: 100,
            deductible: 0,
            satisfaction: "Neutral".to_string(),
            switch_reasons: Vec::new(),
            priorities: Vec::new(),
        }),
        ..UserProfile::default()
    };
    let RecommendationOutcome::Switch(switch) = engine
        .outcome_for(Step::SwitchRecommendations, &profile)
        .expect("switch outcome")
    else {
        panic!("expected switch outcome");
    };
    assert_eq!(switch.plans.len(), 1);

    let mut profile = profile;
    if let Some(current) = profile.current_plan.as_mut() {
        current.monthly_premium = 125;
    }
    let RecommendationOutcome::Switch(switch) = engine
        .outcome_for(Step::SwitchRecommendations, &profile)
        .expect("switch outcome")
    else {
        panic!("expected switch outcome");
    };
    // ceiling 150: Wellcare 95, Humana 125, Aetna Medicare 145
    assert_eq!(switch.plans.len(), MAX_SWITCH_OFFERS);
    assert_eq!(switch.plans[2].monthly_savings, 0);
}

#[test]
fn outcome_requires_a_recommendation_step() {
    let engine = RecommendationEngine::new(catalog());
    assert!(matches!(
        engine.outcome_for(Step::UserForm, &UserProfile::default()),
        Err(RecommendationError::NotReady(Step::UserForm))
    ));
    assert!(matches!(
        engine.outcome_for(Step::FamilyRecommendations, &UserProfile::default()),
        Err(RecommendationError::MissingAnswers("family"))
    ));
}

fn feature_strategy() -> impl Strategy<Value = crate::questionnaire::domain::FeatureVector> {
    (18u8..=100, 10.0f64..60.0, 0u8..=1, 0u8..=10, 0u8..=3, 1u8..=6).prop_map(
        |(age, bmi, smoker, children, region_code, income_level)| {
            crate::questionnaire::domain::FeatureVector {
                age,
                bmi,
                smoker,
                children,
                region_code,
                income_level,
            }
        },
    )
}

proptest! {
    #[test]
    fn classification_is_deterministic(features in feature_strategy()) {
        let classifier = TierClassifier::new();
        prop_assert_eq!(classifier.classify(&features), classifier.classify(&features));
    }

    #[test]
    fn confidence_is_a_distribution(features in feature_strategy()) {
        let assignment = TierClassifier::new().classify(&features);
        let total: f64 = assignment.confidence.values().sum();
        prop_assert!(assignment.confidence.values().all(|p| *p >= 0.0));
        prop_assert!((total - 1.0).abs() < 1e-6);
        prop_assert_eq!(assignment.confidence.len(), 4);
    }

    #[test]
    fn estimate_stays_in_range_with_ordered_scenarios(features in feature_strategy()) {
        let estimate = CostEstimator::new().estimate(&features);
        prop_assert!((MIN_ANNUAL_COST..=MAX_ANNUAL_COST).contains(&estimate.point));
        prop_assert!(estimate.scenarios.low < estimate.scenarios.average);
        prop_assert!(estimate.scenarios.average < estimate.scenarios.high);
        prop_assert_eq!(estimate.scenarios.low, estimate.point * 0.7);
        prop_assert_eq!(estimate.scenarios.high, estimate.point * 1.5);
    }

    #[test]
    fn estimate_never_drops_when_an_input_rises(
        features in feature_strategy(),
        extra_years in 0u8..10,
        extra_bmi in 0.0f64..10.0,
    ) {
        let estimator = CostEstimator::new();
        let base = estimator.estimate(&features).point;

        let mut older = features;
        older.age = older.age.saturating_add(extra_years);
        prop_assert!(estimator.estimate(&older).point >= base);

        let mut heavier = features;
        heavier.bmi += extra_bmi;
        prop_assert!(estimator.estimate(&heavier).point >= base);

        let mut smoker = features;
        smoker.smoker = 1;
        prop_assert!(estimator.estimate(&smoker).point >= base);

        let mut larger = features;
        larger.children = larger.children.saturating_add(1);
        prop_assert!(estimator.estimate(&larger).point >= base);
    }
}
