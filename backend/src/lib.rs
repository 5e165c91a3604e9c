//! AP Monitor - Backend Library
//!
//! Reachability, availability and map clustering for WISP access points.

#[macro_use]
mod macros;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
