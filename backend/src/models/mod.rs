//! Database models (SQLx).

pub mod access_point;
pub mod activity_history;
pub mod associated_user;
pub mod map_marker;
pub mod property_set;
pub mod wisp;

pub use access_point::{AccessPoint, Coordinates, Reachability, Sighting};
pub use activity_history::{ActivityHistory, Availability};
pub use associated_user::{AssociatedUser, LookupScope};
pub use map_marker::{Cluster, MapMarker, StatusTally};
pub use property_set::{PropertySet, PropertyUpdate};
pub use wisp::Wisp;
