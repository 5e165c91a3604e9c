//! Property set model: reachability and visibility metadata of an access point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One-to-one companion row of an access point.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct PropertySet {
    pub id: i64,
    pub access_point_id: i64,
    /// `None` means the device state is unknown.
    pub reachable: Option<bool>,
    pub public: Option<bool>,
    pub notes: Option<String>,
    pub site_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of the editable property set fields.
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PropertyUpdate {
    pub notes: Option<String>,
    pub site_description: Option<String>,
    pub public: Option<bool>,
}

impl PropertyUpdate {
    pub fn is_empty(&self) -> bool {
        self.notes.is_none() && self.site_description.is_none() && self.public.is_none()
    }
}
