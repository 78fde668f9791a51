use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::CoverageTier;

const STANDARD_CATALOG: &str = include_str!("../../data/plans.csv");
const FEATURE_SEPARATOR: char = ';';
const MAX_RATING: f32 = 5.0;
const DEDUCTIBLE_SHARE_IN_ANNUAL_ESTIMATE: f64 = 0.3;

/// One insurance plan as published in the reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub name: String,
    pub monthly_premium: u32,
    pub annual_deductible: u32,
    pub coverage: String,
    pub network: String,
    pub rating: f32,
    pub features: Vec<String>,
    pub best_for: String,
    pub copay: String,
    pub out_of_pocket_max: String,
}

impl PlanRecord {
    pub fn annual_premium(&self) -> u32 {
        self.monthly_premium.saturating_mul(12)
    }

    /// Premiums for the year plus a typical share of the deductible.
    pub fn estimated_annual_total(&self) -> f64 {
        f64::from(self.annual_premium())
            + f64::from(self.annual_deductible) * DEDUCTIBLE_SHARE_IN_ANNUAL_ESTIMATE
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no plans are catalogued for tier '{0}'")]
    TierNotFound(String),
    #[error("plan '{0}' is not in the catalog")]
    PlanNotFound(String),
    #[error("failed to read plan catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid plan catalog data: {0}")]
    Csv(#[from] csv::Error),
    #[error("plan '{name}' has rating {rating} outside 0-5")]
    InvalidRating { name: String, rating: f32 },
    #[error("plan '{0}' is listed more than once")]
    DuplicatePlan(String),
    #[error("catalog has no plans for tier '{0}'")]
    MissingTier(&'static str),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::TierNotFound(_) | CatalogError::PlanNotFound(_)
        )
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    tier: CoverageTier,
    name: String,
    monthly: u32,
    deductible: u32,
    coverage: String,
    network: String,
    rating: f32,
    features: String,
    best_for: String,
    copay: String,
    oop_max: String,
}

impl CatalogRow {
    fn into_record(self) -> Result<(CoverageTier, PlanRecord), CatalogError> {
        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(CatalogError::InvalidRating {
                name: self.name,
                rating: self.rating,
            });
        }

        let features = self
            .features
            .split(FEATURE_SEPARATOR)
            .map(str::trim)
            .filter(|feature| !feature.is_empty())
            .map(str::to_string)
            .collect();

        Ok((
            self.tier,
            PlanRecord {
                name: self.name,
                monthly_premium: self.monthly,
                annual_deductible: self.deductible,
                coverage: self.coverage,
                network: self.network,
                rating: self.rating,
                features,
                best_for: self.best_for,
                copay: self.copay,
                out_of_pocket_max: self.oop_max,
            },
        ))
    }
}

/// Read-only plan catalog indexed by tier and by plan name.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    tiers: BTreeMap<CoverageTier, Vec<PlanRecord>>,
    names: HashMap<String, (CoverageTier, usize)>,
}

impl PlanCatalog {
    /// The catalog bundled with the crate.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_reader(STANDARD_CATALOG.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut tiers: BTreeMap<CoverageTier, Vec<PlanRecord>> = BTreeMap::new();
        let mut names = HashMap::new();

        for row in csv_reader.deserialize::<CatalogRow>() {
            let (tier, record) = row?.into_record()?;
            let plans = tiers.entry(tier).or_default();
            let key = name_key(&record.name);
            if names.insert(key, (tier, plans.len())).is_some() {
                return Err(CatalogError::DuplicatePlan(record.name));
            }
            plans.push(record);
        }

        if let Some(missing) = CoverageTier::ALL
            .into_iter()
            .find(|tier| tiers.get(tier).map_or(true, Vec::is_empty))
        {
            return Err(CatalogError::MissingTier(missing.key()));
        }

        Ok(Self { tiers, names })
    }

    /// Plans for a tier key such as `family`, in stored order.
    pub fn plans_for_tier(&self, tier_name: &str) -> Result<&[PlanRecord], CatalogError> {
        let tier = CoverageTier::from_key(tier_name)
            .ok_or_else(|| CatalogError::TierNotFound(tier_name.trim().to_string()))?;
        self.plans(tier)
    }

    pub fn plans(&self, tier: CoverageTier) -> Result<&[PlanRecord], CatalogError> {
        self.tiers
            .get(&tier)
            .map(Vec::as_slice)
            .ok_or_else(|| CatalogError::TierNotFound(tier.key().to_string()))
    }

    /// Case-insensitive lookup through the name index.
    pub fn plan_by_name(&self, name: &str) -> Result<(CoverageTier, &PlanRecord), CatalogError> {
        self.names
            .get(&name_key(name))
            .and_then(|(tier, idx)| {
                self.tiers
                    .get(tier)
                    .and_then(|plans| plans.get(*idx))
                    .map(|plan| (*tier, plan))
            })
            .ok_or_else(|| CatalogError::PlanNotFound(name.trim().to_string()))
    }

    /// Every plan, grouped by tier in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (CoverageTier, &PlanRecord)> + '_ {
        self.tiers
            .iter()
            .flat_map(|(tier, plans)| plans.iter().map(move |plan| (*tier, plan)))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
