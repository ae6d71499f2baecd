use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{Coordinates, NewOrder, Order, PriceEstimate};
use crate::error::Error;

#[async_trait]
pub trait EstimateAPI {
    async fn estimate_price(
        &self,
        user: User,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<PriceEstimate, Error>;
}

#[async_trait]
pub trait OrderAPI {
    async fn create_order(&self, user: User, new_order: NewOrder) -> Result<Order, Error>;
    async fn find_order(&self, user: User, id: Uuid) -> Result<Order, Error>;
    async fn list_orders(&self, user: User) -> Result<Vec<Order>, Error>;
    async fn cancel_order(&self, user: User, id: Uuid) -> Result<Order, Error>;
}

pub trait TranslationAPI {
    fn translate(&self, locale: &str, key: &str, options: &HashMap<String, String>) -> String;
    fn supported_languages(&self) -> BTreeMap<String, String>;
}

pub trait API: EstimateAPI + OrderAPI + TranslationAPI {}
