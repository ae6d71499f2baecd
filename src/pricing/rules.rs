use async_trait::async_trait;

use crate::entities::PricingRule;
use crate::error::Error;

/// Read-only access to the backend-owned pricing rules.
///
/// `Ok(None)` means the rule does not exist. Callers in this crate treat
/// both `Ok(None)` and `Err(_)` as "no rule available".
#[async_trait]
pub trait PricingRuleStore: Send + Sync {
    async fn find_rule(&self, rule_id: i64) -> Result<Option<PricingRule>, Error>;
}
