use async_trait::async_trait;
use thiserror::Error;

use crate::entities::Coordinates;

#[derive(Debug, Error, PartialEq)]
pub enum RoutingError {
    #[error("no driving route found")]
    NoRoute,
    #[error("routing provider unavailable: {0}")]
    Unavailable(String),
}

/// Driving distance between two points. Travel mode is always driving.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn driving_distance_meters(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<f64, RoutingError>;
}
