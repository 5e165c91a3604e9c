//! Business logic services.

pub mod access_point_query;
pub mod access_point_service;
pub mod associated_user_client;
pub mod map_service;
pub mod proximity;
