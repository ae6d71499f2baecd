use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::entities::{Coordinates, PriceEstimate};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    origin: Coordinates,
    destination: Coordinates,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<CreateParams>,
) -> Result<Json<PriceEstimate>, Error> {
    let estimate = api
        .estimate_price(user, params.origin, params.destination)
        .await?;

    Ok(estimate.into())
}
