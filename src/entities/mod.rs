mod coordinates;
mod estimate;
mod order;
mod pricing_rule;

pub use coordinates::Coordinates;
pub use estimate::{PriceEstimate, PricingBasis};
pub use order::{NewOrder, Order, Status as OrderStatus};
pub use pricing_rule::PricingRule;
