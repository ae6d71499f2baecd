use serde::{Deserialize, Serialize};

/// The active pricing policy as stored by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    pub rule_id: i64,
    pub per_km_rate: f64,
    pub base_fare: f64,
    pub multiplier: f64,
}

impl PricingRule {
    /// A rule can only price if every factor is a finite, non-negative number.
    pub fn is_usable(&self) -> bool {
        [self.per_km_rate, self.base_fare, self.multiplier]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}
