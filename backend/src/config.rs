//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;

/// Radius, in kilometres, used to group access points on the map.
pub const CLUSTER_ACCESS_POINTS_WITHIN_KM: f64 = 2.0;

/// Default page size for access point listings.
pub const ACCESS_POINTS_PER_PAGE: u32 = 10;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server bind address (host:port)
    pub bind_address: String,

    /// Log level
    pub log_level: String,

    /// OTLP collector endpoint; tracing export is disabled when unset
    pub otel_endpoint: Option<String>,

    /// Map clustering radius in kilometres
    pub cluster_radius_km: f64,

    /// Page size for access point listings
    pub access_points_per_page: u32,

    /// Timeout for associated user lookups against a WISP management service
    pub associated_users_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| AppError::Config("DATABASE_URL not set".into()))?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".into()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            otel_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|s| !s.is_empty()),
            cluster_radius_km: lookup("CLUSTER_RADIUS_KM")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|r| r.is_finite() && *r > 0.0)
                .unwrap_or(CLUSTER_ACCESS_POINTS_WITHIN_KM),
            access_points_per_page: lookup("ACCESS_POINTS_PER_PAGE")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(ACCESS_POINTS_PER_PAGE),
            associated_users_timeout_secs: lookup("ASSOCIATED_USERS_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }
}
