//! Users associated with an access point, as reported by the WISP's
//! management service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A client device/user currently associated with an access point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssociatedUser {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub mac_address: Option<String>,
    pub ip_address: Option<String>,
    pub access_point: Option<String>,
    /// Any other attribute returned by the management service.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// How many associated users a lookup returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LookupScope {
    #[default]
    All,
    First,
}
