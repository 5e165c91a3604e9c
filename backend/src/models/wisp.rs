//! WISP (wireless ISP) model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A wireless ISP owning a set of access points.
///
/// The `owmw_*` columns point at the WISP's management service, which is
/// queried for the users associated with each access point.
#[derive(Clone, FromRow)]
pub struct Wisp {
    pub id: i64,
    pub name: String,
    pub owmw_url: Option<String>,
    pub owmw_username: Option<String>,
    pub owmw_password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

redacted_debug!(Wisp {
    show id,
    show name,
    show owmw_url,
    show owmw_username,
    redact_option owmw_password,
    show created_at,
    show updated_at,
});
