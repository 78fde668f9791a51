use serde::{Deserialize, Serialize};

use super::super::catalog::{CatalogError, PlanCatalog, PlanRecord};
use super::super::domain::{CoverageTier, CurrentPlan, FamilyHousehold};

/// Ceiling on alternatives as a ratio of the current premium, kept as an
/// integer fraction (6/5 = 120%).
const SWITCH_CEILING_NUMERATOR: u64 = 6;
const SWITCH_CEILING_DENOMINATOR: u64 = 5;
pub const MAX_SWITCH_OFFERS: usize = 3;

/// A catalogued plan with the annual figure shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOffer {
    #[serde(flatten)]
    pub plan: PlanRecord,
    pub estimated_annual_total: f64,
}

impl From<&PlanRecord> for PlanOffer {
    fn from(plan: &PlanRecord) -> Self {
        Self {
            estimated_annual_total: plan.estimated_annual_total(),
            plan: plan.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyOffer {
    #[serde(flatten)]
    pub plan: PlanRecord,
    pub per_person_monthly: f64,
    pub annual_premium: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyRecommendation {
    pub household_size: u32,
    pub plans: Vec<FamilyOffer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchOffer {
    #[serde(flatten)]
    pub plan: PlanRecord,
    pub tier: CoverageTier,
    pub monthly_savings: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchRecommendation {
    pub current_monthly_premium: u32,
    pub plans: Vec<SwitchOffer>,
}

/// Family-tier plans priced for the whole household.
pub(crate) fn family_offers(
    catalog: &PlanCatalog,
    household: &FamilyHousehold,
) -> Result<FamilyRecommendation, CatalogError> {
    let household_size = household.members().max(1);
    let plans = catalog
        .plans(CoverageTier::Family)?
        .iter()
        .map(|plan| FamilyOffer {
            per_person_monthly: f64::from(plan.monthly_premium) / f64::from(household_size),
            annual_premium: plan.annual_premium(),
            plan: plan.clone(),
        })
        .collect();

    Ok(FamilyRecommendation {
        household_size,
        plans,
    })
}

/// The cheapest plans across every tier costing at most 120% of the current
/// premium. Ties keep catalog order.
pub(crate) fn switch_offers(catalog: &PlanCatalog, current: &CurrentPlan) -> SwitchRecommendation {
    let current_premium = u64::from(current.monthly_premium);

    let mut candidates: Vec<(CoverageTier, &PlanRecord)> = catalog
        .iter()
        .filter(|(_, plan)| {
            u64::from(plan.monthly_premium) * SWITCH_CEILING_DENOMINATOR
                <= current_premium * SWITCH_CEILING_NUMERATOR
        })
        .collect();
    candidates.sort_by_key(|(_, plan)| plan.monthly_premium);

    let plans = candidates
        .into_iter()
        .take(MAX_SWITCH_OFFERS)
        .map(|(tier, plan)| SwitchOffer {
            tier,
            monthly_savings: current.monthly_premium.saturating_sub(plan.monthly_premium),
            plan: plan.clone(),
        })
        .collect();

    SwitchRecommendation {
        current_monthly_premium: current.monthly_premium,
        plans,
    }
}
