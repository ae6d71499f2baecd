use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::GoogleMapsConfig,
    entities::Coordinates,
    error::Error,
    pricing::{RoutingError, RoutingProvider},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Leg {
    pub distance: TextValue,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextValue {
    pub text: Option<String>,
    pub value: f64,
}

/// Driving distances from the Google Directions web service.
#[derive(Clone, Debug)]
pub struct GoogleDirections {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl GoogleDirections {
    pub fn new(config: &GoogleMapsConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            url: format!("https://{}/maps/api/directions/json", config.api_base),
            key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl RoutingProvider for GoogleDirections {
    #[tracing::instrument(name = "GoogleDirections::driving_distance_meters", skip(self))]
    async fn driving_distance_meters(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<f64, RoutingError> {
        let origin: String = origin.into();
        let destination: String = destination.into();

        let res = self
            .client
            .get(&self.url)
            .query(&[("key", self.key.as_str())])
            .query(&[("origin", origin)])
            .query(&[("destination", destination)])
            .query(&[("mode", "driving")])
            .send()
            .await
            .map_err(|err| RoutingError::Unavailable(err.to_string()))?;

        if let Some(err) = status_error(res.status().as_u16()) {
            return Err(err);
        }

        let data: DirectionsResponse = res.json().await.map_err(|err| {
            if err.is_timeout() {
                RoutingError::Unavailable(err.to_string())
            } else {
                tracing::warn!("malformed directions response: {}", err);
                RoutingError::NoRoute
            }
        })?;

        route_distance(data)
    }
}

/// Timeouts and throttling are worth retrying; other 4xx mean the request
/// itself cannot be routed.
pub fn status_error(status_code: u16) -> Option<RoutingError> {
    match status_code {
        200 => None,
        408 | 429 => Some(RoutingError::Unavailable(format!(
            "http status {}",
            status_code
        ))),
        400..=499 => {
            tracing::warn!(status_code, "directions request rejected");
            Some(RoutingError::NoRoute)
        }
        _ => Some(RoutingError::Unavailable(format!(
            "http status {}",
            status_code
        ))),
    }
}

/// Total distance of the first route, in meters.
pub fn route_distance(data: DirectionsResponse) -> Result<f64, RoutingError> {
    match data.status.as_str() {
        "OK" => (),
        "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" => {
            return Err(RoutingError::Unavailable(data.status.clone()));
        }
        _ => {
            if let Some(message) = &data.error_message {
                tracing::warn!(status = %data.status, "directions error: {}", message);
            }
            return Err(RoutingError::NoRoute);
        }
    }

    let route = data.routes.into_iter().next().ok_or(RoutingError::NoRoute)?;

    if route.legs.is_empty() {
        return Err(RoutingError::NoRoute);
    }

    Ok(route.legs.iter().map(|leg| leg.distance.value).sum())
}
