//! API module - HTTP handlers.

pub mod dto;
pub mod handlers;
pub mod openapi;
pub mod routes;

use crate::config::Config;
use crate::error::Result;
use crate::services::access_point_service::AccessPointService;
use crate::services::associated_user_client::AssociatedUserClient;
use crate::services::map_service::MapService;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: PgPool,
    pub associated_users: Arc<AssociatedUserClient>,
}

impl AppState {
    pub fn new(config: Config, db: PgPool) -> Result<Self> {
        let associated_users = Arc::new(AssociatedUserClient::new(
            config.associated_users_timeout_secs,
        )?);
        Ok(Self {
            config,
            db,
            associated_users,
        })
    }

    pub fn access_point_service(&self) -> AccessPointService {
        AccessPointService::new(self.db.clone())
    }

    pub fn map_service(&self) -> MapService {
        MapService::new(self.db.clone(), self.config.cluster_radius_km)
    }
}

pub type SharedState = Arc<AppState>;
