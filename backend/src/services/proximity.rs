//! "Within radius" lookups used by map clustering.
//!
//! Distances use the haversine formula with the same earth radius in Rust
//! and in SQL, so the in-memory and PostgreSQL sources agree on which points
//! fall inside a radius. A point is at distance exactly zero from itself.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, Result};
use crate::models::{AccessPoint, Coordinates};
use crate::services::access_point_query::AccessPointScope;

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6376.77271;

/// Great-circle distance between two positions, in kilometres.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let half_dlat = (b.lat - a.lat).to_radians() / 2.0;
    let half_dlng = (b.lng - a.lng).to_radians() / 2.0;
    let h = half_dlat.sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * half_dlng.sin().powi(2);
    2.0 * h.clamp(0.0, 1.0).sqrt().asin() * EARTH_RADIUS_KM
}

/// Source of access points near a position.
#[async_trait]
pub trait ProximitySource: Send + Sync {
    /// All access points within `radius_km` of `origin` (inclusive), in
    /// persistence order.
    async fn around(&self, origin: Coordinates, radius_km: f64) -> Result<Vec<AccessPoint>>;
}

/// Radius lookups over an already loaded set of access points.
pub struct InMemoryProximity {
    access_points: Vec<AccessPoint>,
}

impl InMemoryProximity {
    pub fn new(mut access_points: Vec<AccessPoint>) -> Self {
        access_points.sort_by_key(|ap| ap.id);
        Self { access_points }
    }
}

#[async_trait]
impl ProximitySource for InMemoryProximity {
    async fn around(&self, origin: Coordinates, radius_km: f64) -> Result<Vec<AccessPoint>> {
        Ok(self
            .access_points
            .iter()
            .filter(|ap| distance_km(origin, ap.coords()) <= radius_km)
            .cloned()
            .collect())
    }
}

/// Radius lookups executed by PostgreSQL, restricted to a scope.
pub struct PgProximity {
    db: PgPool,
    scope: AccessPointScope,
}

impl PgProximity {
    pub fn new(db: PgPool, scope: AccessPointScope) -> Self {
        Self { db, scope }
    }
}

#[async_trait]
impl ProximitySource for PgProximity {
    async fn around(&self, origin: Coordinates, radius_km: f64) -> Result<Vec<AccessPoint>> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(AppError::Validation(format!(
                "Invalid radius: {radius_km}"
            )));
        }

        let mut query = self
            .scope
            .clone()
            .around(origin, radius_km)
            .select_query(None);

        let access_points = query
            .build_query_as::<AccessPoint>()
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(access_points)
    }
}
