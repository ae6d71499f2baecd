mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::API;
use crate::auth::TrustedRoles;
use crate::error::{server_error, Error};
use crate::server::handlers::{estimates, orders, translations};

pub type DynAPI = Arc<dyn API + Send + Sync>;

pub fn router(api: DynAPI, trusted_roles: TrustedRoles) -> Router {
    Router::new()
        .route("/estimates", post(estimates::create))
        .route("/orders", post(orders::create).get(orders::list))
        .route("/orders/:id", get(orders::find))
        .route("/orders/:id/cancel", patch(orders::cancel))
        .route("/translations", get(translations::languages))
        .route("/translations/:locale/:key", get(translations::translate))
        .layer(Extension(api))
        .layer(Extension(trusted_roles))
}

pub async fn serve<T: API + Sync + Send + 'static>(
    api: T,
    addr: SocketAddr,
    trusted_roles: TrustedRoles,
) -> Result<(), Error> {
    let app = router(Arc::new(api) as DynAPI, trusted_roles);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(server_error)
}
