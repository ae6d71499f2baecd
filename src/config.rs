use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{invalid_config_error, Error};
use crate::pricing::PricingConfig;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_GOOGLE_MAPS_API_BASE: &str = "maps.googleapis.com";
pub const DEFAULT_ROUTING_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub listen_addr: SocketAddr,
    pub google_maps: GoogleMapsConfig,
    pub pricing: PricingConfig,
    /// Roles accepted from the `x-user-roles` header, from `TRUSTED_ROLES`.
    pub trusted_roles: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct GoogleMapsConfig {
    pub api_base: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Config {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| lookup(name).ok_or_else(|| invalid_config_error(name));

        let defaults = PricingConfig::default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            listen_addr: parse_or(
                &lookup,
                "LISTEN_ADDR",
                SocketAddr::from_str(DEFAULT_LISTEN_ADDR)
                    .map_err(|_| invalid_config_error("LISTEN_ADDR"))?,
            )?,
            google_maps: GoogleMapsConfig {
                api_base: lookup("GOOGLE_MAPS_API_BASE")
                    .unwrap_or_else(|| DEFAULT_GOOGLE_MAPS_API_BASE.into()),
                api_key: required("GOOGLE_MAPS_API_KEY")?,
                timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "ROUTING_TIMEOUT_SECS",
                    DEFAULT_ROUTING_TIMEOUT_SECS,
                )?),
            },
            pricing: PricingConfig {
                rule_id: parse_or(&lookup, "PRICING_RULE_ID", defaults.rule_id)?,
                fallback_rate: parse_rate(
                    &lookup,
                    "PRICING_FALLBACK_RATE",
                    defaults.fallback_rate,
                )?,
            },
            trusted_roles: lookup("TRUSTED_ROLES")
                .map(|value| {
                    value
                        .split(',')
                        .map(|role| role.trim().to_string())
                        .filter(|role| !role.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| invalid_config_error(name)),
        None => Ok(default),
    }
}

/// Rates must be finite and non-negative.
fn parse_rate<F>(lookup: &F, name: &str, default: f64) -> Result<f64, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let rate: f64 = parse_or(lookup, name, default)?;

    if rate.is_finite() && rate >= 0.0 {
        Ok(rate)
    } else {
        Err(invalid_config_error(name))
    }
}
