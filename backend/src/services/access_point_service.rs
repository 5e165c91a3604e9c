//! Access point service.
//!
//! Loads access points together with their property sets, updates
//! reachability and visibility metadata, and answers uptime questions from
//! the activity history.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::error::{AppError, Result};
use crate::models::access_point::{ACCESS_POINT_COLUMNS, WITH_PROPERTIES};
use crate::models::{
    AccessPoint, ActivityHistory, Availability, PropertySet, PropertyUpdate, Sighting, Wisp,
};
use crate::services::access_point_query::{AccessPointScope, Page};

const PROPERTY_SET_COLUMNS: &str =
    "id, access_point_id, reachable, public, notes, site_description, created_at, updated_at";

/// Request to register an access point.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAccessPointRequest {
    pub wisp_id: Option<i64>,
    pub hostname: String,
    pub mng_ip: Option<i64>,
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub activation_date: Option<DateTime<Utc>>,
}

pub struct AccessPointService {
    db: PgPool,
}

impl AccessPointService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get an access point by ID
    pub async fn get(&self, id: i64) -> Result<AccessPoint> {
        let sql = format!(
            "SELECT {} FROM access_points {} WHERE access_points.id = $1",
            ACCESS_POINT_COLUMNS, WITH_PROPERTIES
        );
        sqlx::query_as::<_, AccessPoint>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Access point {} not found", id)))
    }

    /// Get an access point by hostname
    pub async fn get_by_hostname(&self, hostname: &str) -> Result<AccessPoint> {
        let sql = format!(
            "SELECT {} FROM access_points {} WHERE access_points.hostname = $1",
            ACCESS_POINT_COLUMNS, WITH_PROPERTIES
        );
        sqlx::query_as::<_, AccessPoint>(&sql)
            .bind(hostname)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Access point '{}' not found", hostname)))
    }

    /// List access points matching a scope.
    pub async fn list(&self, scope: &AccessPointScope, page: Option<Page>) -> Result<Vec<AccessPoint>> {
        let mut query = scope.select_query(page);
        let access_points = query
            .build_query_as::<AccessPoint>()
            .fetch_all(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(access_points)
    }

    /// Count access points matching a scope.
    pub async fn count(&self, scope: &AccessPointScope) -> Result<i64> {
        let mut query = scope.count_query();
        let total: i64 = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total)
    }

    /// One page of a scope plus the total number of matches.
    pub async fn paginate(
        &self,
        scope: &AccessPointScope,
        page: Page,
    ) -> Result<(Vec<AccessPoint>, i64)> {
        let items = self.list(scope, Some(page)).await?;
        let total = self.count(scope).await?;
        Ok((items, total))
    }

    /// Register a new access point. The property set is created lazily.
    pub async fn create(&self, req: CreateAccessPointRequest) -> Result<AccessPoint> {
        if req.hostname.trim().is_empty() {
            return Err(AppError::Validation("Hostname cannot be empty".to_string()));
        }
        if !(-90.0..=90.0).contains(&req.lat) || !(-180.0..=180.0).contains(&req.lng) {
            return Err(AppError::Validation(format!(
                "Invalid coordinates ({}, {})",
                req.lat, req.lng
            )));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO access_points (wisp_id, hostname, mng_ip, lat, lng, address, city, activation_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(req.wisp_id)
        .bind(&req.hostname)
        .bind(req.mng_ip)
        .bind(req.lat)
        .bind(req.lng)
        .bind(&req.address)
        .bind(&req.city)
        .bind(req.activation_date)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            let message = e.to_string();
            if message.contains("duplicate key") {
                AppError::Conflict(format!("Access point '{}' already exists", req.hostname))
            } else if message.contains("foreign key") {
                AppError::Validation(format!("Unknown WISP {:?}", req.wisp_id))
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        tracing::info!(access_point_id = id, hostname = %req.hostname, "Access point created");
        self.get(id).await
    }

    /// Delete an access point; its property set and history go with it.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM access_points WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Access point {} not found", id)));
        }

        Ok(())
    }

    /// The WISP an access point belongs to.
    pub async fn wisp_of(&self, access_point: &AccessPoint) -> Result<Wisp> {
        let wisp_id = access_point.wisp_id.ok_or_else(|| {
            AppError::NotFound(format!(
                "Access point '{}' does not belong to a WISP",
                access_point.hostname
            ))
        })?;

        sqlx::query_as::<_, Wisp>(
            r#"
            SELECT id, name, owmw_url, owmw_username, owmw_password, created_at, updated_at
            FROM wisps
            WHERE id = $1
            "#,
        )
        .bind(wisp_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("WISP {} not found", wisp_id)))
    }

    /// Property set of an access point, if one exists.
    pub async fn property_set(&self, access_point_id: i64) -> Result<Option<PropertySet>> {
        let sql = format!(
            "SELECT {} FROM property_sets WHERE access_point_id = $1",
            PROPERTY_SET_COLUMNS
        );
        sqlx::query_as::<_, PropertySet>(&sql)
            .bind(access_point_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark an access point as reachable.
    pub async fn mark_reachable(&self, access_point_id: i64) -> Result<PropertySet> {
        self.set_reachable_to(access_point_id, true).await
    }

    /// Mark an access point as unreachable.
    pub async fn mark_unreachable(&self, access_point_id: i64) -> Result<PropertySet> {
        self.set_reachable_to(access_point_id, false).await
    }

    async fn set_reachable_to(&self, access_point_id: i64, reachable: bool) -> Result<PropertySet> {
        let sql = format!(
            "UPDATE property_sets SET reachable = $2, updated_at = NOW() \
             WHERE access_point_id = $1 RETURNING {}",
            PROPERTY_SET_COLUMNS
        );
        let updated = sqlx::query_as::<_, PropertySet>(&sql)
            .bind(access_point_id)
            .bind(reachable)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(property_set) = updated {
            tracing::debug!(access_point_id, reachable, "Reachability updated");
            return Ok(property_set);
        }

        tracing::debug!(
            access_point_id,
            reachable,
            "No property set to update, creating one"
        );
        self.create_property_set(
            access_point_id,
            &PropertyUpdate::default(),
            Some(reachable),
        )
        .await
    }

    /// Update notes, site description and visibility. Fields left as `None`
    /// keep their current value. An empty update writes nothing and returns
    /// the existing property set.
    pub async fn update_properties(
        &self,
        access_point_id: i64,
        update: PropertyUpdate,
    ) -> Result<PropertySet> {
        if update.is_empty() {
            return self.property_set(access_point_id).await?.ok_or_else(|| {
                AppError::NotFound(format!(
                    "No property set for access point {}",
                    access_point_id
                ))
            });
        }

        let sql = format!(
            r#"
            UPDATE property_sets
            SET notes = COALESCE($2, notes),
                site_description = COALESCE($3, site_description),
                public = COALESCE($4, public),
                updated_at = NOW()
            WHERE access_point_id = $1
            RETURNING {}
            "#,
            PROPERTY_SET_COLUMNS
        );
        let updated = sqlx::query_as::<_, PropertySet>(&sql)
            .bind(access_point_id)
            .bind(&update.notes)
            .bind(&update.site_description)
            .bind(update.public)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match updated {
            Some(property_set) => Ok(property_set),
            None => {
                tracing::debug!(access_point_id, "No property set to update, creating one");
                self.create_property_set(access_point_id, &update, None)
                    .await
            }
        }
    }

    async fn create_property_set(
        &self,
        access_point_id: i64,
        fields: &PropertyUpdate,
        reachable: Option<bool>,
    ) -> Result<PropertySet> {
        // A concurrent creator may win the race; fold our values into its row.
        let sql = format!(
            r#"
            INSERT INTO property_sets (access_point_id, reachable, public, notes, site_description)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (access_point_id) DO UPDATE SET
                reachable = COALESCE(EXCLUDED.reachable, property_sets.reachable),
                public = COALESCE(EXCLUDED.public, property_sets.public),
                notes = COALESCE(EXCLUDED.notes, property_sets.notes),
                site_description = COALESCE(EXCLUDED.site_description, property_sets.site_description),
                updated_at = NOW()
            RETURNING {}
            "#,
            PROPERTY_SET_COLUMNS
        );
        sqlx::query_as::<_, PropertySet>(&sql)
            .bind(access_point_id)
            .bind(reachable)
            .bind(fields.public)
            .bind(&fields.notes)
            .bind(&fields.site_description)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                if e.to_string().contains("foreign key") {
                    AppError::NotFound(format!("Access point {} not found", access_point_id))
                } else {
                    AppError::Database(e.to_string())
                }
            })
    }

    /// Activity histories observed inside `[from, to]`.
    pub async fn activity_histories(
        &self,
        access_point_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ActivityHistory>> {
        sqlx::query_as::<_, ActivityHistory>(
            r#"
            SELECT id, access_point_id, status, start_time, last_time
            FROM activity_histories
            WHERE access_point_id = $1 AND start_time >= $2 AND last_time <= $3
            ORDER BY last_time ASC
            "#,
        )
        .bind(access_point_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Average availability in percent over `[from, to]`; `0` without history.
    pub async fn average_availability(
        &self,
        access_point_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<f64> {
        let average: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(AVG(status), 0) * 100
            FROM activity_histories
            WHERE access_point_id = $1 AND start_time >= $2 AND last_time <= $3
            "#,
        )
        .bind(access_point_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(average)
    }

    /// Up/down percentages between `from` (or the activation date, when
    /// later) and `to`.
    pub async fn availability(
        &self,
        access_point: &AccessPoint,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Availability> {
        if from > to {
            return Err(AppError::Validation(
                "Observation window starts after it ends".to_string(),
            ));
        }

        let from = access_point.observation_start(from);
        let up = self.average_availability(access_point.id, from, to).await?;
        Ok(Availability { from, to, up })
    }

    /// Uptime percentage formatted with one decimal.
    pub async fn up_average(
        &self,
        access_point: &AccessPoint,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<String> {
        Ok(self.availability(access_point, from, to).await?.up_average())
    }

    /// Downtime percentage formatted with one decimal.
    pub async fn down_average(
        &self,
        access_point: &AccessPoint,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<String> {
        Ok(self
            .availability(access_point, from, to)
            .await?
            .down_average())
    }

    /// Most recent time the access point was seen up. `None` when its state
    /// is unknown.
    pub async fn latest_seen(&self, access_point: &AccessPoint) -> Result<Option<Sighting>> {
        self.seen(access_point, "DESC").await
    }

    /// First time the access point was seen up. `None` when its state is
    /// unknown.
    pub async fn earliest_seen(&self, access_point: &AccessPoint) -> Result<Option<Sighting>> {
        self.seen(access_point, "ASC").await
    }

    async fn seen(&self, access_point: &AccessPoint, order: &str) -> Result<Option<Sighting>> {
        if access_point.is_unknown() {
            return Ok(None);
        }

        let sql = format!(
            "SELECT last_time FROM activity_histories \
             WHERE access_point_id = $1 AND status > 0 \
             ORDER BY last_time {} LIMIT 1",
            order
        );
        let last_time: Option<DateTime<Utc>> = sqlx::query_scalar(&sql)
            .bind(access_point.id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Some(last_time.map_or(Sighting::Never, Sighting::At)))
    }
}
