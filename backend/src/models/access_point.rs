//! Access point model.
//!
//! Rows are always loaded together with the columns of their property set
//! (LEFT JOIN), so reachability and visibility can be read directly from the
//! record. Access points without a property set carry `None` in those
//! columns and report an unknown state.

use std::fmt;
use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Column list used by every access point query.
pub const ACCESS_POINT_COLUMNS: &str = "access_points.id, access_points.wisp_id, \
     access_points.hostname, access_points.mng_ip, access_points.lat, access_points.lng, \
     access_points.address, access_points.city, access_points.activation_date, \
     access_points.created_at, access_points.updated_at, \
     property_sets.id AS property_set_id, property_sets.reachable, property_sets.public, \
     property_sets.notes, property_sets.site_description";

/// Join bringing in the property set columns.
pub const WITH_PROPERTIES: &str =
    "LEFT JOIN property_sets ON property_sets.access_point_id = access_points.id";

/// Tri-state network status of an access point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Up,
    Down,
    Unknown,
}

impl Reachability {
    /// Numeric status code: `1` up, `0` down, `-1` unknown.
    pub fn code(self) -> i32 {
        match self {
            Reachability::Up => 1,
            Reachability::Down => 0,
            Reachability::Unknown => -1,
        }
    }
}

impl From<Option<bool>> for Reachability {
    fn from(reachable: Option<bool>) -> Self {
        match reachable {
            Some(true) => Reachability::Up,
            Some(false) => Reachability::Down,
            None => Reachability::Unknown,
        }
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reachability::Up => write!(f, "up"),
            Reachability::Down => write!(f, "down"),
            Reachability::Unknown => write!(f, "unknown"),
        }
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// When an access point was seen answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sighting {
    /// Reachability is known but no activity history reports it up.
    Never,
    At(DateTime<Utc>),
}

impl fmt::Display for Sighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sighting::Never => write!(f, "-"),
            Sighting::At(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl Serialize for Sighting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Sighting::Never => serializer.serialize_str("-"),
            Sighting::At(ts) => ts.serialize(serializer),
        }
    }
}

/// Managed wireless access point.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct AccessPoint {
    pub id: i64,
    pub wisp_id: Option<i64>,
    pub hostname: String,
    /// Management IPv4 address packed into an integer.
    pub mng_ip: Option<i64>,
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub activation_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Delegated to the property set
    pub property_set_id: Option<i64>,
    pub reachable: Option<bool>,
    pub public: Option<bool>,
    pub notes: Option<String>,
    pub site_description: Option<String>,
}

impl AccessPoint {
    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    /// Management address, `None` when unset or not a valid IPv4 integer.
    pub fn ip(&self) -> Option<Ipv4Addr> {
        self.mng_ip
            .and_then(|raw| u32::try_from(raw).ok())
            .map(Ipv4Addr::from)
    }

    pub fn reachability(&self) -> Reachability {
        Reachability::from(self.reachable)
    }

    pub fn is_up(&self) -> bool {
        self.reachable == Some(true)
    }

    pub fn is_down(&self) -> bool {
        self.reachable == Some(false)
    }

    pub fn is_unknown(&self) -> bool {
        self.reachable.is_none()
    }

    pub fn is_known(&self) -> bool {
        !self.is_unknown()
    }

    /// `1` up, `0` down, `-1` unknown.
    pub fn status(&self) -> i32 {
        self.reachability().code()
    }

    pub fn has_property_set(&self) -> bool {
        self.property_set_id.is_some()
    }

    pub fn is_public(&self) -> Option<bool> {
        self.public
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn site_description(&self) -> Option<&str> {
        self.site_description.as_deref()
    }

    /// Start of an observation window: `from`, or the activation date when
    /// the device was activated later.
    pub fn observation_start(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self.activation_date {
            Some(activated) if activated > from => activated,
            _ => from,
        }
    }
}

/// Pack an IPv4 address the way `mng_ip` stores it.
pub fn pack_ipv4(ip: Ipv4Addr) -> i64 {
    i64::from(u32::from(ip))
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reachable_true_is_up() {
        let ap = with_reachable(access_point(1, 41.9, 12.5), Some(true));
        assert!(ap.is_up());
        assert!(!ap.is_down());
        assert!(ap.is_known());
        assert_eq!(ap.status(), 1);
        assert_eq!(ap.reachability(), Reachability::Up);
    }

    #[test]
    fn test_reachable_false_is_down() {
        let ap = with_reachable(access_point(1, 41.9, 12.5), Some(false));
        assert!(ap.is_down());
        assert!(!ap.is_up());
        assert!(ap.is_known());
        assert_eq!(ap.status(), 0);
    }

    #[test]
    fn test_null_reachable_is_unknown() {
        let ap = with_reachable(access_point(1, 41.9, 12.5), None);
        assert!(ap.is_unknown());
        assert!(!ap.is_known());
        assert_eq!(ap.status(), -1);
    }

    #[test]
    fn test_missing_property_set_is_unknown() {
        let ap = access_point(1, 41.9, 12.5);
        assert!(!ap.has_property_set());
        assert!(ap.is_unknown());
        assert_eq!(ap.reachability(), Reachability::Unknown);
        assert!(ap.notes().is_none());
        assert!(ap.is_public().is_none());
    }

    #[test]
    fn test_ip_from_packed_integer() {
        let mut ap = access_point(1, 0.0, 0.0);
        assert!(ap.ip().is_none());

        ap.mng_ip = Some(pack_ipv4(Ipv4Addr::new(10, 8, 0, 254)));
        assert_eq!(ap.ip(), Some(Ipv4Addr::new(10, 8, 0, 254)));
        assert_eq!(ap.ip().unwrap().to_string(), "10.8.0.254");

        ap.mng_ip = Some(3232235777);
        assert_eq!(ap.ip(), Some(Ipv4Addr::new(192, 168, 1, 1)));
    }

    #[test]
    fn test_ip_out_of_range_is_none() {
        let mut ap = access_point(1, 0.0, 0.0);
        ap.mng_ip = Some(-1);
        assert!(ap.ip().is_none());
        ap.mng_ip = Some(1 << 40);
        assert!(ap.ip().is_none());
    }

    #[test]
    fn test_coords() {
        let ap = access_point(1, 41.89, 12.49);
        assert_eq!(ap.coords(), Coordinates::new(41.89, 12.49));
    }

    #[test]
    fn test_observation_start_uses_later_activation_date() {
        let from = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
        let activated = Utc.with_ymd_and_hms(2012, 2, 15, 0, 0, 0).unwrap();

        let mut ap = access_point(1, 0.0, 0.0);
        assert_eq!(ap.observation_start(from), from);

        ap.activation_date = Some(activated);
        assert_eq!(ap.observation_start(from), activated);

        let later_from = Utc.with_ymd_and_hms(2012, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(ap.observation_start(later_from), later_from);
    }

    #[test]
    fn test_sighting_rendering() {
        assert_eq!(Sighting::Never.to_string(), "-");
        assert_eq!(serde_json::to_string(&Sighting::Never).unwrap(), "\"-\"");

        let ts = Utc.with_ymd_and_hms(2012, 5, 4, 10, 30, 0).unwrap();
        let json = serde_json::to_string(&Sighting::At(ts)).unwrap();
        assert!(json.contains("2012-05-04T10:30:00"));
    }

    #[test]
    fn test_reachability_serialization() {
        assert_eq!(serde_json::to_string(&Reachability::Up).unwrap(), "\"up\"");
        assert_eq!(Reachability::Unknown.to_string(), "unknown");
        assert_eq!(Reachability::Down.code(), 0);
    }
}
