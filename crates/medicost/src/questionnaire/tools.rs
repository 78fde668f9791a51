//! Standalone tools reachable from any step: cost calculator, plan comparison
//! and the FAQ. Also holds the reference text behind the education step.

use serde::{Deserialize, Serialize};

use super::catalog::{CatalogError, PlanCatalog, PlanRecord};
use super::domain::{CoverageTier, ValidationError};

const PRESCRIPTION_MONTHLY_COST: u32 = 50;
const COINSURANCE_RATE: f64 = 0.2;

pub const MIN_COMPARED_PLANS: usize = 2;
pub const MAX_COMPARED_PLANS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyRisk {
    #[default]
    Low,
    Medium,
    High,
}

impl EmergencyRisk {
    /// Expected yearly emergency spend for the risk level.
    pub const fn allowance(self) -> u32 {
        match self {
            EmergencyRisk::Low => 0,
            EmergencyRisk::Medium => 1_500,
            EmergencyRisk::High => 5_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorInput {
    pub monthly_premium: u32,
    pub annual_deductible: u32,
    pub copay: u32,
    pub doctor_visits: u32,
    pub monthly_prescriptions: u32,
    pub emergency_risk: EmergencyRisk,
}

impl Default for CalculatorInput {
    fn default() -> Self {
        Self {
            monthly_premium: 350,
            annual_deductible: 2_000,
            copay: 25,
            doctor_visits: 4,
            monthly_prescriptions: 1,
            emergency_risk: EmergencyRisk::Low,
        }
    }
}

impl CalculatorInput {
    fn validate(&self) -> Result<(), ValidationError> {
        let bounds = [
            ("monthly_premium", self.monthly_premium, 100, 2_000),
            ("annual_deductible", self.annual_deductible, 0, 10_000),
            ("copay", self.copay, 0, 100),
            ("doctor_visits", self.doctor_visits, 0, 24),
            ("monthly_prescriptions", self.monthly_prescriptions, 0, 10),
        ];
        for (field, value, min, max) in bounds {
            ValidationError::check_range(field, value.into(), min.into(), max.into())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub annual_premium: u32,
    pub copay_costs: u32,
    pub prescription_costs: u32,
    pub emergency_estimate: u32,
    pub total_medical_costs: u32,
    pub out_of_pocket: f64,
    pub total_annual_cost: f64,
    pub monthly_total: f64,
}

/// Annual cost under a plan: premiums plus what the member pays toward care.
/// Spending past the deductible is shared at the coinsurance rate.
pub fn calculate(input: &CalculatorInput) -> Result<CostBreakdown, ValidationError> {
    input.validate()?;

    let annual_premium = input.monthly_premium * 12;
    let copay_costs = input.copay * input.doctor_visits;
    let prescription_costs = input.monthly_prescriptions * PRESCRIPTION_MONTHLY_COST * 12;
    let emergency_estimate = input.emergency_risk.allowance();
    let total_medical_costs = copay_costs + prescription_costs + emergency_estimate;

    let out_of_pocket = if total_medical_costs <= input.annual_deductible {
        f64::from(total_medical_costs)
    } else {
        let excess = total_medical_costs - input.annual_deductible;
        f64::from(input.annual_deductible) + f64::from(excess) * COINSURANCE_RATE
    };

    let total_annual_cost = f64::from(annual_premium) + out_of_pocket;

    Ok(CostBreakdown {
        annual_premium,
        copay_costs,
        prescription_costs,
        emergency_estimate,
        total_medical_costs,
        out_of_pocket,
        total_annual_cost,
        monthly_total: total_annual_cost / 12.0,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("select between {MIN_COMPARED_PLANS} and {MAX_COMPARED_PLANS} plans (found {0})")]
    WrongCount(usize),
    #[error("plan '{0}' was selected more than once")]
    Duplicate(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedPlan {
    pub tier: CoverageTier,
    #[serde(flatten)]
    pub plan: PlanRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanComparison {
    pub plans: Vec<ComparedPlan>,
}

/// Side-by-side view of named plans, in the order they were selected.
pub fn compare_plans(
    catalog: &PlanCatalog,
    names: &[String],
) -> Result<PlanComparison, ComparisonError> {
    if !(MIN_COMPARED_PLANS..=MAX_COMPARED_PLANS).contains(&names.len()) {
        return Err(ComparisonError::WrongCount(names.len()));
    }

    let mut plans: Vec<ComparedPlan> = Vec::with_capacity(names.len());
    for name in names {
        let (tier, plan) = catalog.plan_by_name(name)?;
        if plans.iter().any(|existing| existing.plan.name == plan.name) {
            return Err(ComparisonError::Duplicate(plan.name.clone()));
        }
        plans.push(ComparedPlan {
            tier,
            plan: plan.clone(),
        });
    }

    Ok(PlanComparison { plans })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

const FAQ: [FaqEntry; 5] = [
    FaqEntry {
        question: "When can I enroll in health insurance?",
        answer: "Open Enrollment is typically November 1 - December 15 each year. You can also \
                 enroll during Special Enrollment Periods if you have qualifying life events \
                 (job loss, marriage, new baby, etc.).",
    },
    FaqEntry {
        question: "What's the difference between in-network and out-of-network?",
        answer: "In-network providers have contracts with your insurance for lower rates. \
                 Out-of-network providers cost more, and some plans don't cover them at all.",
    },
    FaqEntry {
        question: "Is dental and vision included?",
        answer: "Most health plans don't include dental and vision. These are usually separate \
                 plans, though some comprehensive plans may include basic coverage.",
    },
    FaqEntry {
        question: "What if I can't afford health insurance?",
        answer: "You may qualify for subsidies through Healthcare.gov, Medicaid, or CHIP. Many \
                 people qualify for plans under $100/month with subsidies.",
    },
    FaqEntry {
        question: "What's an HSA?",
        answer: "A Health Savings Account lets you save pre-tax money for medical expenses. You \
                 need a High Deductible Health Plan to qualify. Money rolls over year to year.",
    },
];

pub fn faq() -> &'static [FaqEntry] {
    &FAQ
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EducationTopic {
    pub heading: &'static str,
    pub points: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EducationSection {
    pub title: &'static str,
    pub topics: &'static [EducationTopic],
}

const EDUCATION: [EducationSection; 4] = [
    EducationSection {
        title: "Key Terms",
        topics: &[
            EducationTopic {
                heading: "Premium",
                points: &[
                    "Your monthly payment to maintain insurance coverage",
                    "Paid regardless of whether you use healthcare services",
                    "Typically ranges from $200-800+ for individuals",
                ],
            },
            EducationTopic {
                heading: "Deductible",
                points: &[
                    "Amount you pay before insurance starts covering costs",
                    "Resets annually",
                    "Higher deductible usually means lower premium",
                ],
            },
            EducationTopic {
                heading: "Copayment (Copay)",
                points: &[
                    "Fixed amount you pay for covered services",
                    "Example: $25 for a doctor visit",
                    "Applies after deductible is met",
                ],
            },
            EducationTopic {
                heading: "Coinsurance",
                points: &[
                    "Percentage of costs you share with insurance",
                    "Example: 80/20 split (insurance pays 80%, you pay 20%)",
                    "Applies after deductible is met",
                ],
            },
            EducationTopic {
                heading: "Out-of-Pocket Maximum",
                points: &[
                    "Most you'll pay in a year for covered services",
                    "Insurance pays 100% after this limit",
                    "Includes deductibles, copays, and coinsurance",
                ],
            },
        ],
    },
    EducationSection {
        title: "Plan Types",
        topics: &[
            EducationTopic {
                heading: "HMO (Health Maintenance Organization)",
                points: &[
                    "Lower costs and predictable expenses",
                    "Must choose a primary care doctor",
                    "Need referrals for specialists",
                    "Limited to network providers",
                ],
            },
            EducationTopic {
                heading: "PPO (Preferred Provider Organization)",
                points: &[
                    "See any doctor without referral",
                    "Out-of-network coverage available",
                    "Higher premiums and higher out-of-network costs",
                ],
            },
            EducationTopic {
                heading: "EPO (Exclusive Provider Organization)",
                points: &[
                    "No referrals needed",
                    "Lower premiums than PPO",
                    "No out-of-network coverage",
                ],
            },
            EducationTopic {
                heading: "HDHP (High Deductible Health Plan)",
                points: &[
                    "Lower monthly premiums",
                    "HSA eligible (tax benefits)",
                    "High deductible ($1,400+ individual)",
                    "Pay more upfront for care",
                ],
            },
        ],
    },
    EducationSection {
        title: "Cost Structure",
        topics: &[
            EducationTopic {
                heading: "How You Pay for Healthcare",
                points: &[
                    "Monthly premium: ongoing cost regardless of usage",
                    "First pay full cost until the deductible is met",
                    "Then pay copays or coinsurance",
                    "Insurance pays 100% after the out-of-pocket max",
                ],
            },
            EducationTopic {
                heading: "Example Cost Scenario",
                points: &[
                    "Premium: $300/month = $3,600/year",
                    "Deductible: $2,000",
                    "Doctor visit: $200, all of it toward the deductible",
                    "After the deductible is met: $25 copay per visit",
                ],
            },
            EducationTopic {
                heading: "Tips to Save Money",
                points: &[
                    "Use in-network providers (30-50% savings)",
                    "Generic medications (80% cheaper)",
                    "Preventive care is usually free",
                    "Use urgent care instead of ER when appropriate",
                    "Ask about payment plans for large bills",
                ],
            },
        ],
    },
    EducationSection {
        title: "Choosing a Plan",
        topics: &[
            EducationTopic {
                heading: "Choose HMO if",
                points: &[
                    "You want lower costs",
                    "You don't mind having a primary doctor",
                    "You rarely need specialists",
                ],
            },
            EducationTopic {
                heading: "Choose PPO if",
                points: &[
                    "You want flexibility",
                    "You have preferred doctors",
                    "You travel frequently",
                ],
            },
            EducationTopic {
                heading: "Choose HDHP if",
                points: &[
                    "You're healthy and rarely need care",
                    "You want lower monthly costs",
                    "You can afford a high deductible if needed",
                ],
            },
            EducationTopic {
                heading: "Key Questions to Ask",
                points: &[
                    "Are my doctors in-network?",
                    "Are my medications covered?",
                    "What's the total annual cost if I get sick?",
                    "Does it cover my specific health needs?",
                    "What's the quality rating of the plan?",
                ],
            },
        ],
    },
];

/// Reference material shown on the education step.
pub fn education() -> &'static [EducationSection] {
    &EDUCATION
}
