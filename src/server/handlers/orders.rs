use axum::extract::{Extension, Json, Path};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{NewOrder, Order};
use crate::error::Error;
use crate::server::DynAPI;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<NewOrder>,
) -> Result<Json<Order>, Error> {
    let order = api.create_order(user, params).await?;

    Ok(order.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<Order>>, Error> {
    let orders = api.list_orders(user).await?;

    Ok(orders.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, Error> {
    let order = api.find_order(user, id).await?;

    Ok(order.into())
}

pub async fn cancel(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, Error> {
    let order = api.cancel_order(user, id).await?;

    Ok(order.into())
}
