use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PricingUnit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub unit: PricingUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: u32,
    pub price_range: PriceRange,
    pub price_ht: f64,
    pub price_ttc: f64,
    pub active: bool,
}
