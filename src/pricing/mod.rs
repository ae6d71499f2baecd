//! Distance-based price estimation.
//!
//! A price is derived from the driving distance between pickup and delivery
//! and the single active pricing rule. When no rule can be read the engine
//! falls back to a flat per-kilometer rate instead of failing.

mod routing;
mod rules;

pub use routing::{RoutingError, RoutingProvider};
pub use rules::PricingRuleStore;

use std::str::FromStr;

use futures::future;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::entities::{Coordinates, PriceEstimate, PricingBasis, PricingRule};

pub const DEFAULT_PRICING_RULE_ID: i64 = 1;
pub const DEFAULT_FALLBACK_RATE_PER_KM: f64 = 1.21;

#[derive(Debug, Error, PartialEq)]
pub enum EstimationError {
    #[error("coordinates out of range")]
    InvalidCoordinates,
    #[error("no route between origin and destination")]
    NoRoute,
    #[error("routing provider failure: {0}")]
    TransientProviderFailure(String),
}

impl From<RoutingError> for EstimationError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::NoRoute => Self::NoRoute,
            RoutingError::Unavailable(reason) => Self::TransientProviderFailure(reason),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PricingConfig {
    pub rule_id: i64,
    pub fallback_rate: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            rule_id: DEFAULT_PRICING_RULE_ID,
            fallback_rate: DEFAULT_FALLBACK_RATE_PER_KM,
        }
    }
}

/// Rounds to two decimals, half away from zero.
///
/// Rounding happens on the shortest decimal form of `x`, so `1.005` becomes
/// `1.01` even though the nearest binary value sits just below the midpoint.
pub fn round2(x: f64) -> f64 {
    Decimal::from_str(&x.to_string())
        .ok()
        .and_then(|d| {
            d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .to_f64()
        })
        .unwrap_or_else(|| (x * 100.0).round() / 100.0)
}

pub fn rule_price(distance_km: f64, rule: &PricingRule) -> f64 {
    let base_price = (distance_km * rule.per_km_rate).max(rule.base_fare);

    round2(base_price * rule.multiplier)
}

pub fn fallback_price(distance_km: f64, fallback_rate: f64) -> f64 {
    round2(distance_km * fallback_rate)
}

pub struct PricingEngine<R, S> {
    routing: R,
    rules: S,
    config: PricingConfig,
}

impl<R, S> PricingEngine<R, S>
where
    R: RoutingProvider,
    S: PricingRuleStore,
{
    pub fn new(routing: R, rules: S, config: PricingConfig) -> Self {
        Self {
            routing,
            rules,
            config,
        }
    }

    /// Prices a delivery from `origin` to `destination`.
    ///
    /// Only the routing step can fail the estimate. The rule lookup is issued
    /// alongside it, and any failure there selects the fallback formula.
    #[tracing::instrument(name = "PricingEngine::estimate", skip(self))]
    pub async fn estimate(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<PriceEstimate, EstimationError> {
        if !origin.is_valid() || !destination.is_valid() {
            return Err(EstimationError::InvalidCoordinates);
        }

        let (distance, rule) = future::join(
            self.routing.driving_distance_meters(origin, destination),
            self.rules.find_rule(self.config.rule_id),
        )
        .await;

        let meters = distance?;
        if !meters.is_finite() || meters < 0.0 {
            return Err(EstimationError::NoRoute);
        }

        let distance_km = meters / 1000.0;

        let estimate = match rule {
            Ok(Some(rule)) if rule.is_usable() => PriceEstimate {
                distance_km,
                price_amount: rule_price(distance_km, &rule),
                basis: PricingBasis::Rule {
                    rule_id: rule.rule_id,
                },
            },
            Ok(Some(rule)) => {
                tracing::warn!(
                    rule_id = rule.rule_id,
                    per_km_rate = rule.per_km_rate,
                    base_fare = rule.base_fare,
                    multiplier = rule.multiplier,
                    "pricing rule has unusable factors, using fallback rate"
                );
                self.fallback(distance_km)
            }
            Ok(None) => {
                tracing::warn!(
                    rule_id = self.config.rule_id,
                    "pricing rule not found, using fallback rate"
                );
                self.fallback(distance_km)
            }
            Err(err) => {
                tracing::warn!(
                    rule_id = self.config.rule_id,
                    code = err.code,
                    "pricing rule lookup failed, using fallback rate"
                );
                self.fallback(distance_km)
            }
        };

        tracing::info!(
            distance_km = estimate.distance_km,
            price_amount = estimate.price_amount,
            "estimated price"
        );

        Ok(estimate)
    }

    fn fallback(&self, distance_km: f64) -> PriceEstimate {
        PriceEstimate {
            distance_km,
            price_amount: fallback_price(distance_km, self.config.fallback_rate),
            basis: PricingBasis::Fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{database_error, Error};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedRoute(Result<f64, RoutingError>);

    #[async_trait]
    impl RoutingProvider for FixedRoute {
        async fn driving_distance_meters(
            &self,
            _origin: Coordinates,
            _destination: Coordinates,
        ) -> Result<f64, RoutingError> {
            match &self.0 {
                Ok(meters) => Ok(*meters),
                Err(RoutingError::NoRoute) => Err(RoutingError::NoRoute),
                Err(RoutingError::Unavailable(r)) => Err(RoutingError::Unavailable(r.clone())),
            }
        }
    }

    enum RuleLookup {
        Found(PricingRule),
        Missing,
        Broken,
    }

    struct FixedRules {
        lookup: RuleLookup,
        calls: Arc<AtomicUsize>,
    }

    impl FixedRules {
        fn new(lookup: RuleLookup) -> Self {
            Self {
                lookup,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl PricingRuleStore for FixedRules {
        async fn find_rule(&self, rule_id: i64) -> Result<Option<PricingRule>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            match &self.lookup {
                RuleLookup::Found(rule) if rule.rule_id == rule_id => Ok(Some(rule.clone())),
                RuleLookup::Found(_) | RuleLookup::Missing => Ok(None),
                RuleLookup::Broken => Err(database_error("connection refused")),
            }
        }
    }

    fn rule(per_km_rate: f64, base_fare: f64, multiplier: f64) -> PricingRule {
        PricingRule {
            rule_id: 1,
            per_km_rate,
            base_fare,
            multiplier,
        }
    }

    fn madrid() -> Coordinates {
        Coordinates::new(40.4168, -3.7038)
    }

    fn toledo() -> Coordinates {
        Coordinates::new(39.8628, -4.0273)
    }

    fn engine(
        route: Result<f64, RoutingError>,
        lookup: RuleLookup,
    ) -> PricingEngine<FixedRoute, FixedRules> {
        PricingEngine::new(
            FixedRoute(route),
            FixedRules::new(lookup),
            PricingConfig::default(),
        )
    }

    #[tokio::test]
    async fn prices_with_the_active_rule() {
        let engine = engine(Ok(12_340.0), RuleLookup::Found(rule(0.8, 3.0, 1.21)));

        let estimate = engine.estimate(madrid(), toledo()).await.unwrap();

        assert_eq!(estimate.distance_km, 12.34);
        assert_eq!(estimate.price_amount, 11.95);
        assert_eq!(estimate.basis, PricingBasis::Rule { rule_id: 1 });
    }

    #[tokio::test]
    async fn base_fare_is_the_floor() {
        let engine = engine(Ok(1_000.0), RuleLookup::Found(rule(0.8, 3.0, 1.5)));

        let estimate = engine.estimate(madrid(), toledo()).await.unwrap();

        assert_eq!(estimate.price_amount, 4.5);
    }

    #[tokio::test]
    async fn missing_rule_falls_back_to_flat_rate() {
        let engine = engine(Ok(5_000.0), RuleLookup::Missing);

        let estimate = engine.estimate(madrid(), toledo()).await.unwrap();

        assert_eq!(estimate.distance_km, 5.0);
        assert_eq!(estimate.price_amount, 6.05);
        assert!(estimate.is_fallback());
    }

    #[tokio::test]
    async fn broken_rule_store_falls_back_to_flat_rate() {
        let engine = engine(Ok(5_000.0), RuleLookup::Broken);

        let estimate = engine.estimate(madrid(), toledo()).await.unwrap();

        assert_eq!(estimate.price_amount, 6.05);
        assert!(estimate.is_fallback());
    }

    #[tokio::test]
    async fn negative_multiplier_falls_back_to_flat_rate() {
        let engine = engine(Ok(5_000.0), RuleLookup::Found(rule(0.8, 3.0, -1.0)));

        let estimate = engine.estimate(madrid(), toledo()).await.unwrap();

        assert_eq!(estimate.price_amount, 6.05);
        assert!(estimate.is_fallback());
    }

    #[tokio::test]
    async fn non_finite_rule_falls_back_to_flat_rate() {
        let engine = engine(
            Ok(5_000.0),
            RuleLookup::Found(rule(f64::NAN, f64::NAN, 1.0)),
        );

        let estimate = engine.estimate(madrid(), toledo()).await.unwrap();

        assert!(estimate.price_amount.is_finite());
        assert_eq!(estimate.price_amount, 6.05);
        assert!(estimate.is_fallback());
    }

    #[tokio::test]
    async fn configured_rule_id_and_fallback_rate_are_used() {
        let rules = FixedRules::new(RuleLookup::Found(rule(0.8, 3.0, 1.21)));
        let engine = PricingEngine::new(
            FixedRoute(Ok(10_000.0)),
            rules,
            PricingConfig {
                rule_id: 2,
                fallback_rate: 2.0,
            },
        );

        let estimate = engine.estimate(madrid(), toledo()).await.unwrap();

        assert_eq!(estimate.price_amount, 20.0);
        assert!(estimate.is_fallback());
    }

    #[tokio::test]
    async fn zero_distance() {
        let with_rule = engine(Ok(0.0), RuleLookup::Found(rule(0.8, 3.0, 1.0)));
        let estimate = with_rule.estimate(madrid(), madrid()).await.unwrap();
        assert_eq!(estimate.distance_km, 0.0);
        assert_eq!(estimate.price_amount, 3.0);

        let without_rule = engine(Ok(0.0), RuleLookup::Missing);
        let estimate = without_rule.estimate(madrid(), madrid()).await.unwrap();
        assert_eq!(estimate.price_amount, 0.0);
    }

    #[tokio::test]
    async fn no_route_is_fatal() {
        let engine = engine(
            Err(RoutingError::NoRoute),
            RuleLookup::Found(rule(0.8, 3.0, 1.21)),
        );

        let err = engine.estimate(madrid(), toledo()).await.unwrap_err();

        assert_eq!(err, EstimationError::NoRoute);
    }

    #[tokio::test]
    async fn unavailable_provider_is_transient() {
        let engine = engine(
            Err(RoutingError::Unavailable("timed out".into())),
            RuleLookup::Missing,
        );

        let err = engine.estimate(madrid(), toledo()).await.unwrap_err();

        assert_eq!(
            err,
            EstimationError::TransientProviderFailure("timed out".into())
        );
    }

    #[tokio::test]
    async fn negative_distance_is_treated_as_no_route() {
        let engine = engine(Ok(-1.0), RuleLookup::Missing);

        let err = engine.estimate(madrid(), toledo()).await.unwrap_err();

        assert_eq!(err, EstimationError::NoRoute);
    }

    #[tokio::test]
    async fn invalid_coordinates_skip_external_calls() {
        let rules = FixedRules::new(RuleLookup::Missing);
        let calls = rules.calls.clone();
        let engine = PricingEngine::new(FixedRoute(Ok(1.0)), rules, PricingConfig::default());

        let err = engine
            .estimate(Coordinates::new(91.0, 0.0), toledo())
            .await
            .unwrap_err();

        assert_eq!(err, EstimationError::InvalidCoordinates);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rules_are_read_on_every_estimate() {
        let rules = FixedRules::new(RuleLookup::Found(rule(0.8, 3.0, 1.21)));
        let calls = rules.calls.clone();
        let engine = PricingEngine::new(FixedRoute(Ok(1.0)), rules, PricingConfig::default());

        engine.estimate(madrid(), toledo()).await.unwrap();
        engine.estimate(madrid(), toledo()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(11.94512), 11.95);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(2.0), 2.0);
    }

    #[test]
    fn round2_rounds_decimal_midpoints_up() {
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(0.145), 0.15);
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(-1.005), -1.01);
        assert_eq!(round2(5.0 * 1.21), 6.05);
    }

    proptest! {
        #[test]
        fn round2_is_idempotent(x in 0.0f64..1_000_000.0) {
            prop_assert_eq!(round2(round2(x)), round2(x));
        }

        #[test]
        fn round2_matches_integer_rounding_of_thousandths(n in 0u64..10_000_000) {
            let expected = ((n + 5) / 10) as f64 / 100.0;

            prop_assert_eq!(round2(n as f64 / 1000.0), expected);
        }

        #[test]
        fn rule_estimates_follow_the_formula(
            meters in 0u32..500_000,
            per_km_rate in 0.0f64..10.0,
            base_fare in 0.0f64..50.0,
            multiplier in 0.5f64..3.0,
        ) {
            let rule = rule(per_km_rate, base_fare, multiplier);
            let engine = engine(Ok(meters as f64), RuleLookup::Found(rule));

            let estimate = tokio_test::block_on(engine.estimate(madrid(), toledo())).unwrap();
            let d = meters as f64 / 1000.0;

            prop_assert_eq!(estimate.distance_km, d);
            prop_assert_eq!(estimate.price_amount, round2((d * per_km_rate).max(base_fare) * multiplier));
            prop_assert!(estimate.price_amount >= 0.0);
        }

        #[test]
        fn fallback_estimates_follow_the_formula(meters in 0u32..500_000) {
            let engine = engine(Ok(meters as f64), RuleLookup::Missing);

            let estimate = tokio_test::block_on(engine.estimate(madrid(), toledo())).unwrap();
            let d = meters as f64 / 1000.0;

            prop_assert_eq!(estimate.distance_km, d);
            prop_assert_eq!(estimate.price_amount, round2(d * 1.21));
        }
    }
}
