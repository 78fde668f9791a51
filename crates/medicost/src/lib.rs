//! Guided health-insurance questionnaire: profile normalization, tier
//! classification, cost estimation and plan recommendations.

pub mod config;
pub mod error;
pub mod questionnaire;
pub mod telemetry;
