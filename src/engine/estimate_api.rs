use super::Engine;

use async_trait::async_trait;

use crate::{
    api::EstimateAPI,
    auth::User,
    db::OrderStore,
    entities::{Coordinates, PriceEstimate},
    error::Error,
    pricing::{PricingRuleStore, RoutingProvider},
};

#[async_trait]
impl<R, S, O> EstimateAPI for Engine<R, S, O>
where
    R: RoutingProvider,
    S: PricingRuleStore,
    O: OrderStore,
{
    /// Any identified caller may ask for a quote.
    #[tracing::instrument(skip(self, user))]
    async fn estimate_price(
        &self,
        user: User,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<PriceEstimate, Error> {
        tracing::debug!(user_id = %user.id, "estimating price");

        let estimate = self.pricing.estimate(origin, destination).await?;

        Ok(estimate)
    }
}
