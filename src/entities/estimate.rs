use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub distance_km: f64,
    pub price_amount: f64,
    pub basis: PricingBasis,
}

/// Which formula produced `price_amount`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum PricingBasis {
    Rule { rule_id: i64 },
    Fallback,
}

impl PriceEstimate {
    pub fn is_fallback(&self) -> bool {
        matches!(self.basis, PricingBasis::Fallback)
    }
}
