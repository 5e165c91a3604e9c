//! Map rendering: greedy radius clustering of access points.
//!
//! Access points are visited in persistence order. Each point that is not
//! yet part of a group seeds a new one made of every not-yet-grouped point
//! within the clustering radius of the seed. Membership depends on distance
//! from the seed only, so the result depends on iteration order.

use std::collections::HashSet;

use sqlx::PgPool;

use crate::error::Result;
use crate::models::{AccessPoint, Cluster, MapMarker};
use crate::services::access_point_query::AccessPointScope;
use crate::services::access_point_service::AccessPointService;
use crate::services::proximity::{InMemoryProximity, PgProximity, ProximitySource};

/// Group access points into map markers.
///
/// `access_points` must be in persistence order. Every access point ends up
/// in exactly one marker.
pub async fn cluster_access_points<P>(
    access_points: Vec<AccessPoint>,
    proximity: &P,
    radius_km: f64,
) -> Result<Vec<MapMarker>>
where
    P: ProximitySource + ?Sized,
{
    let mut already_clustered: HashSet<i64> = HashSet::with_capacity(access_points.len());
    let mut markers = Vec::new();

    for seed in access_points {
        if already_clustered.contains(&seed.id) {
            continue;
        }

        let mut group: Vec<AccessPoint> = proximity
            .around(seed.coords(), radius_km)
            .await?
            .into_iter()
            .filter(|ap| !already_clustered.contains(&ap.id))
            .collect();

        if !group.iter().any(|ap| ap.id == seed.id) {
            group.insert(0, seed);
        }

        already_clustered.extend(group.iter().map(|ap| ap.id));

        let marker = if group.len() > 1 {
            MapMarker::Cluster(Cluster::new(group))
        } else {
            MapMarker::Single(group.remove(0))
        };
        markers.push(marker);
    }

    Ok(markers)
}

/// Cluster an already loaded set without touching the database.
pub async fn cluster_in_memory(
    access_points: Vec<AccessPoint>,
    radius_km: f64,
) -> Result<Vec<MapMarker>> {
    let proximity = InMemoryProximity::new(access_points.clone());
    cluster_access_points(access_points, &proximity, radius_km).await
}

pub struct MapService {
    db: PgPool,
    radius_km: f64,
}

impl MapService {
    pub fn new(db: PgPool, radius_km: f64) -> Self {
        Self { db, radius_km }
    }

    /// Markers for every access point of a WISP (or all WISPs). Neighbours
    /// are looked up with the same WISP restriction as the seeds.
    pub async fn draw_map(&self, wisp_id: Option<i64>) -> Result<Vec<MapMarker>> {
        let scope = AccessPointScope::new().of_wisp(wisp_id);
        let access_points = AccessPointService::new(self.db.clone())
            .list(&scope, None)
            .await?;
        let total = access_points.len();

        let proximity = PgProximity::new(self.db.clone(), scope);
        let markers = cluster_access_points(access_points, &proximity, self.radius_km).await?;

        tracing::debug!(
            wisp_id,
            access_points = total,
            markers = markers.len(),
            radius_km = self.radius_km,
            "Map drawn"
        );
        Ok(markers)
    }
}
