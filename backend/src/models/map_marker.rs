//! Map markers: single access points or clusters of nearby ones.

use serde::Serialize;
use utoipa::ToSchema;

use super::access_point::{AccessPoint, Coordinates, Reachability};

/// Count of members per reachability state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusTally {
    pub up: usize,
    pub down: usize,
    pub unknown: usize,
}

impl StatusTally {
    pub fn record(&mut self, reachability: Reachability) {
        match reachability {
            Reachability::Up => self.up += 1,
            Reachability::Down => self.down += 1,
            Reachability::Unknown => self.unknown += 1,
        }
    }
}

/// Group of access points drawn as one marker.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Cluster {
    /// Mean position of the members.
    pub center: Coordinates,
    pub count: usize,
    pub tally: StatusTally,
    pub access_points: Vec<AccessPoint>,
}

impl Cluster {
    pub fn new(access_points: Vec<AccessPoint>) -> Self {
        let count = access_points.len();
        let mut tally = StatusTally::default();
        let (mut lat, mut lng) = (0.0, 0.0);
        for ap in &access_points {
            tally.record(ap.reachability());
            lat += ap.lat;
            lng += ap.lng;
        }
        let center = if count == 0 {
            Coordinates::new(0.0, 0.0)
        } else {
            Coordinates::new(lat / count as f64, lng / count as f64)
        };

        Self {
            center,
            count,
            tally,
            access_points,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn ids(&self) -> Vec<i64> {
        self.access_points.iter().map(|ap| ap.id).collect()
    }
}

/// One entry of a rendered map.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapMarker {
    Single(AccessPoint),
    Cluster(Cluster),
}

impl MapMarker {
    /// Ids of the access points behind this marker.
    pub fn ids(&self) -> Vec<i64> {
        match self {
            MapMarker::Single(ap) => vec![ap.id],
            MapMarker::Cluster(cluster) => cluster.ids(),
        }
    }

    pub fn position(&self) -> Coordinates {
        match self {
            MapMarker::Single(ap) => ap.coords(),
            MapMarker::Cluster(cluster) => cluster.center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::access_point::test_support::{access_point, with_reachable};

    #[test]
    fn test_cluster_center_and_tally() {
        let cluster = Cluster::new(vec![
            with_reachable(access_point(1, 41.0, 12.0), Some(true)),
            with_reachable(access_point(2, 41.2, 12.4), Some(false)),
            access_point(3, 41.1, 12.2),
        ]);
        assert_eq!(cluster.len(), 3);
        assert!((cluster.center.lat - 41.1).abs() < 1e-9);
        assert!((cluster.center.lng - 12.2).abs() < 1e-9);
        assert_eq!(
            cluster.tally,
            StatusTally {
                up: 1,
                down: 1,
                unknown: 1
            }
        );
        assert_eq!(cluster.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_marker_serialization_is_tagged() {
        let single = MapMarker::Single(access_point(9, 45.0, 9.0));
        let json = serde_json::to_value(&single).unwrap();
        assert_eq!(json["kind"], "single");
        assert_eq!(json["id"], 9);

        let cluster = MapMarker::Cluster(Cluster::new(vec![
            access_point(1, 45.0, 9.0),
            access_point(2, 45.001, 9.001),
        ]));
        let json = serde_json::to_value(&cluster).unwrap();
        assert_eq!(json["kind"], "cluster");
        assert_eq!(json["count"], 2);
        assert_eq!(json["access_points"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_marker_position() {
        let single = MapMarker::Single(access_point(9, 45.0, 9.0));
        assert_eq!(single.position(), Coordinates::new(45.0, 9.0));
    }
}
