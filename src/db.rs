use async_trait::async_trait;
use geo_types::Geometry;
use geozero::wkb;
use sqlx::{postgres::PgPoolOptions, types::Json, Executor, Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::{
    entities::{Order, PricingRule},
    error::{not_found_error, Error},
    pricing::PricingRuleStore,
};

pub type Database = Postgres;

pub async fn connect(db_uri: &str, max_connections: u32) -> Result<Pool<Database>, Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(db_uri)
        .await?;

    Ok(pool)
}

/// Creates the tables this service reads and writes, if missing.
#[tracing::instrument(skip_all)]
pub async fn migrate(pool: &Pool<Database>) -> Result<(), Error> {
    pool.execute("CREATE EXTENSION IF NOT EXISTS postgis")
        .await?;

    // maintained by the backend's admin tooling, read-only here
    pool.execute("CREATE TABLE IF NOT EXISTS pricing_rules (id INT8 PRIMARY KEY, per_km_rate DOUBLE PRECISION NOT NULL, base_fare DOUBLE PRECISION NOT NULL, multiplier DOUBLE PRECISION NOT NULL)")
        .await?;

    pool.execute("CREATE TABLE IF NOT EXISTS orders (id UUID PRIMARY KEY, customer_id UUID NOT NULL, status VARCHAR NOT NULL, pickup_location geometry(Point, 4326), delivery_location geometry(Point, 4326), created_at TIMESTAMPTZ NOT NULL, data JSONB NOT NULL)")
        .await?;
    pool.execute("CREATE INDEX IF NOT EXISTS orders_customer_created_idx ON orders (customer_id, created_at DESC)")
        .await?;

    Ok(())
}

#[derive(Clone, Debug)]
pub struct PgPricingRuleStore {
    pool: Pool<Database>,
}

impl PgPricingRuleStore {
    pub fn new(pool: Pool<Database>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PricingRuleStore for PgPricingRuleStore {
    #[tracing::instrument(name = "PgPricingRuleStore::find_rule", skip(self))]
    async fn find_rule(&self, rule_id: i64) -> Result<Option<PricingRule>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(
                sqlx::query(
                    "SELECT id, per_km_rate, base_fare, multiplier FROM pricing_rules WHERE id = $1",
                )
                .bind(rule_id),
            )
            .await?;

        match maybe_result {
            Some(row) => Ok(Some(PricingRule {
                rule_id: row.try_get("id")?,
                per_km_rate: row.try_get("per_km_rate")?,
                base_fare: row.try_get("base_fare")?,
                multiplier: row.try_get("multiplier")?,
            })),
            None => Ok(None),
        }
    }
}

/// Persistence for customer orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: &Order) -> Result<(), Error>;
    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, Error>;
    /// Newest first.
    async fn list_orders(&self, customer_id: Uuid) -> Result<Vec<Order>, Error>;
    /// Locks the order, applies `f` and writes the result in one transaction.
    /// Nothing is written when `f` fails.
    async fn update_order<F>(&self, id: Uuid, f: F) -> Result<Order, Error>
    where
        F: FnOnce(&mut Order) -> Result<(), Error> + Send;
}

#[derive(Clone, Debug)]
pub struct PgOrderStore {
    pool: Pool<Database>,
}

impl PgOrderStore {
    pub fn new(pool: Pool<Database>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    #[tracing::instrument(name = "PgOrderStore::insert_order", skip_all, fields(order_id = %order.id))]
    async fn insert_order(&self, order: &Order) -> Result<(), Error> {
        let pickup: Geometry<f64> = order.pickup.into();
        let delivery: Geometry<f64> = order.delivery.into();

        let mut tx = self.pool.begin().await?;

        tx.execute(
            sqlx::query(
                "INSERT INTO orders (id, customer_id, status, pickup_location, delivery_location, created_at, data) VALUES ($1, $2, $3, ST_SetSRID($4, 4326), ST_SetSRID($5, 4326), $6, $7)",
            )
            .bind(&order.id)
            .bind(&order.customer_id)
            .bind(order.status.name())
            .bind(wkb::Encode(pickup))
            .bind(wkb::Encode(delivery))
            .bind(&order.created_at)
            .bind(Json(order)),
        )
        .await?;

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(name = "PgOrderStore::find_order", skip(self))]
    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM orders WHERE id = $1").bind(&id))
            .await?;

        match maybe_result {
            Some(row) => {
                let Json(order): Json<Order> = row.try_get("data")?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(name = "PgOrderStore::list_orders", skip(self))]
    async fn list_orders(&self, customer_id: Uuid) -> Result<Vec<Order>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
                )
                .bind(&customer_id),
            )
            .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let Json(order): Json<Order> = row.try_get("data")?;
            orders.push(order);
        }

        Ok(orders)
    }

    #[tracing::instrument(name = "PgOrderStore::update_order", skip(self, f))]
    async fn update_order<F>(&self, id: Uuid, f: F) -> Result<Order, Error>
    where
        F: FnOnce(&mut Order) -> Result<(), Error> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let mut order = fetch_order_for_update(&mut tx, &id).await?;

        if let Err(err) = f(&mut order) {
            tx.rollback().await?;
            return Err(err);
        }

        tx.execute(
            sqlx::query("UPDATE orders SET status = $2, data = $3 WHERE id = $1")
                .bind(&order.id)
                .bind(order.status.name())
                .bind(Json(&order)),
        )
        .await?;

        tx.commit().await?;

        Ok(order)
    }
}

async fn fetch_order_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Order, Error> {
    let Json(order): Json<Order> = tx
        .fetch_optional(sqlx::query("SELECT data FROM orders WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(not_found_error)?
        .try_get("data")?;

    Ok(order)
}
