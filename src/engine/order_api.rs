use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::OrderAPI,
    auth::User,
    db::OrderStore,
    entities::{NewOrder, Order},
    error::{not_found_error, Error},
    pricing::{PricingRuleStore, RoutingProvider},
};

#[async_trait]
impl<R, S, O> OrderAPI for Engine<R, S, O>
where
    R: RoutingProvider,
    S: PricingRuleStore,
    O: OrderStore,
{
    #[tracing::instrument(skip(self, user, new_order), fields(user_id = %user.id))]
    async fn create_order(&self, user: User, new_order: NewOrder) -> Result<Order, Error> {
        new_order.validate()?;

        let estimate = self
            .pricing
            .estimate(new_order.pickup, new_order.delivery)
            .await?;

        let order = Order::new(user.id, new_order, &estimate);

        self.orders.insert_order(&order).await?;

        tracing::info!(
            order_id = %order.id,
            fallback_pricing = estimate.is_fallback(),
            "created order"
        );

        Ok(order)
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn find_order(&self, user: User, id: Uuid) -> Result<Order, Error> {
        let order = self
            .orders
            .find_order(id)
            .await?
            .ok_or_else(not_found_error)?;

        self.authorize(user, "read", order.clone())?;

        Ok(order)
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn list_orders(&self, user: User) -> Result<Vec<Order>, Error> {
        self.orders.list_orders(user.id).await
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    async fn cancel_order(&self, user: User, id: Uuid) -> Result<Order, Error> {
        self.orders
            .update_order(id, |order| {
                self.authorize(user, "cancel", order.clone())?;
                order.cancel()
            })
            .await
    }
}
