//! HTTP request handlers.

pub mod access_points;
pub mod health;
pub mod map;
