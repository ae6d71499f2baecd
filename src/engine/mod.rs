mod estimate_api;
mod order_api;
mod translation_api;

use oso::Oso;
use sqlx::Pool;

use crate::{
    api::API,
    auth::authorizor,
    config::Config,
    db::{self, Database, OrderStore, PgOrderStore, PgPricingRuleStore},
    error::{unauthorized_error, Error},
    external::google_maps::GoogleDirections,
    i18n::Catalog,
    pricing::{PricingEngine, PricingRuleStore, RoutingProvider},
};

pub struct Engine<R = GoogleDirections, S = PgPricingRuleStore, O = PgOrderStore> {
    authorizor: Oso,
    pricing: PricingEngine<R, S>,
    orders: O,
    catalog: Catalog,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(pool: Pool<Database>, config: &Config) -> Result<Self, Error> {
        db::migrate(&pool).await?;

        let routing = GoogleDirections::new(&config.google_maps)?;
        let rules = PgPricingRuleStore::new(pool.clone());

        Self::with_parts(
            PricingEngine::new(routing, rules, config.pricing.clone()),
            PgOrderStore::new(pool),
        )
    }
}

impl<R, S, O> Engine<R, S, O>
where
    R: RoutingProvider,
    S: PricingRuleStore,
    O: OrderStore,
{
    pub fn with_parts(pricing: PricingEngine<R, S>, orders: O) -> Result<Self, Error> {
        Ok(Self {
            authorizor: authorizor::new()?,
            pricing,
            orders,
            catalog: Catalog::bundled()?,
        })
    }

    pub fn authorize<Actor, Action, Resource>(
        &self,
        actor: Actor,
        action: Action,
        resource: Resource,
    ) -> Result<(), Error>
    where
        Actor: oso::ToPolar,
        Action: oso::ToPolar,
        Resource: oso::ToPolar,
    {
        if self.authorizor.is_allowed(actor, action, resource)? {
            return Ok(());
        }

        Err(unauthorized_error())
    }
}

impl<R, S, O> API for Engine<R, S, O>
where
    R: RoutingProvider,
    S: PricingRuleStore,
    O: OrderStore,
{
}
