//! Activity history model: aggregated reachability of an access point over
//! an interval.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// One aggregated observation interval.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct ActivityHistory {
    pub id: i64,
    pub access_point_id: i64,
    /// Fraction of the interval in which the device answered (0.0 to 1.0).
    pub status: f64,
    pub start_time: DateTime<Utc>,
    pub last_time: DateTime<Utc>,
}

/// Percentages rendered with one decimal, e.g. `"97.5"`.
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}", value)
}

/// Up/down percentages of an access point over an observation window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Availability {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Average availability in percent.
    pub up: f64,
}

impl Availability {
    pub fn down(&self) -> f64 {
        100.0 - self.up
    }

    pub fn up_average(&self) -> String {
        format_percentage(self.up)
    }

    pub fn down_average(&self) -> String {
        format_percentage(self.down())
    }
}
