use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Coordinates, PriceEstimate};
use crate::error::{invalid_input_error, invalid_state_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub pickup_address: String,
    pub pickup: Coordinates,
    pub delivery_address: String,
    pub delivery: Coordinates,
    pub item_list: Vec<String>,
    pub distance: f64,
    pub est_price: f64,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Accepted,
    PickedUp,
    Delivered,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Accepted => "accepted".into(),
            Self::PickedUp => "picked_up".into(),
            Self::Delivered => "delivered".into(),
            Self::Cancelled => "cancelled".into(),
        }
    }
}

/// What a customer submits; distance and price are filled in by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewOrder {
    pub pickup_address: String,
    pub pickup: Coordinates,
    pub delivery_address: String,
    pub delivery: Coordinates,
    pub item_list: Vec<String>,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), Error> {
        if self.pickup_address.trim().is_empty() || self.delivery_address.trim().is_empty() {
            return Err(invalid_input_error());
        }

        if self.item_list.iter().all(|item| item.trim().is_empty()) {
            return Err(invalid_input_error());
        }

        Ok(())
    }
}

impl Order {
    pub fn new(customer_id: Uuid, new_order: NewOrder, estimate: &PriceEstimate) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            pickup_address: new_order.pickup_address.trim().into(),
            pickup: new_order.pickup,
            delivery_address: new_order.delivery_address.trim().into(),
            delivery: new_order.delivery,
            item_list: new_order
                .item_list
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
            distance: estimate.distance_km,
            est_price: estimate.price_amount,
            status: Status::Pending,
            created_at: Utc::now(),
        }
    }

    #[tracing::instrument(skip(self), fields(order_id = %self.id))]
    pub fn cancel(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Pending | Status::Accepted => {
                self.status = Status::Cancelled;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }
}

impl PolarClass for Order {
    fn get_polar_class_builder() -> oso::ClassBuilder<Order> {
        oso::Class::builder()
            .name("Order")
            .add_attribute_getter("id", |recv: &Order| recv.id.to_string())
            .add_attribute_getter("customer_id", |recv: &Order| recv.customer_id.to_string())
            .add_attribute_getter("status", |recv: &Order| recv.status.name())
    }

    fn get_polar_class() -> oso::Class {
        let builder = Order::get_polar_class_builder();
        builder.build()
    }
}
