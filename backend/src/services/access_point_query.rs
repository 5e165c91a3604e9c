//! Composable access point scopes.
//!
//! A scope collects filters (WISP, reachability, hostname pattern, activation
//! date, public visibility, radius) and an ordering, then renders them into a
//! `sqlx::QueryBuilder`. Every query joins the property set table so that
//! delegated columns are always available.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use utoipa::ToSchema;

use crate::error::{AppError, Result};
use crate::models::access_point::{ACCESS_POINT_COLUMNS, WITH_PROPERTIES};
use crate::models::Coordinates;
use crate::services::proximity::EARTH_RADIUS_KM;

/// Reachability filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Up,
    Down,
    /// Up or down.
    Known,
    /// No reachability recorded, including access points without a property set.
    Unknown,
}

/// Attributes an access point listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Hostname,
    /// Sorts by the delegated `reachable` column.
    Status,
    ActivationDate,
    CreatedAt,
    Lat,
    Lng,
    City,
}

impl SortColumn {
    fn sql(self) -> &'static str {
        match self {
            SortColumn::Id => "access_points.id",
            SortColumn::Hostname => "access_points.hostname",
            SortColumn::Status => "property_sets.reachable",
            SortColumn::ActivationDate => "access_points.activation_date",
            SortColumn::CreatedAt => "access_points.created_at",
            SortColumn::Lat => "access_points.lat",
            SortColumn::Lng => "access_points.lng",
            SortColumn::City => "access_points.city",
        }
    }

    /// NULL placement keeping unknown reachability below down and up.
    fn nulls(self, direction: SortDirection) -> Option<&'static str> {
        match (self, direction) {
            (SortColumn::Status, SortDirection::Asc) => Some("NULLS FIRST"),
            (SortColumn::Status, SortDirection::Desc) => Some("NULLS LAST"),
            _ => None,
        }
    }
}

impl FromStr for SortColumn {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "id" => Ok(SortColumn::Id),
            "hostname" => Ok(SortColumn::Hostname),
            "status" => Ok(SortColumn::Status),
            "activation_date" => Ok(SortColumn::ActivationDate),
            "created_at" => Ok(SortColumn::CreatedAt),
            "lat" => Ok(SortColumn::Lat),
            "lng" => Ok(SortColumn::Lng),
            "city" => Ok(SortColumn::City),
            other => Err(AppError::Validation(format!(
                "Cannot sort access points by '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::Validation(format!(
                "Invalid sort direction '{}'",
                other
            ))),
        }
    }
}

/// 1-indexed page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

/// Filters and ordering for access point queries.
#[derive(Debug, Clone, Default)]
pub struct AccessPointScope {
    wisp_id: Option<i64>,
    status: Option<StatusFilter>,
    public_only: bool,
    hostname_pattern: Option<String>,
    activated_till: Option<DateTime<Utc>>,
    within: Option<(Coordinates, f64)>,
    sort: Option<(SortColumn, SortDirection)>,
}

impl AccessPointScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one WISP. `None` leaves the scope untouched.
    pub fn of_wisp(mut self, wisp_id: Option<i64>) -> Self {
        if wisp_id.is_some() {
            self.wisp_id = wisp_id;
        }
        self
    }

    /// Reachability filter; the last one set wins.
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }

    pub fn up(self) -> Self {
        self.with_status(StatusFilter::Up)
    }

    pub fn down(self) -> Self {
        self.with_status(StatusFilter::Down)
    }

    pub fn known(self) -> Self {
        self.with_status(StatusFilter::Known)
    }

    pub fn unknown(self) -> Self {
        self.with_status(StatusFilter::Unknown)
    }

    /// Only access points published on the public feed.
    pub fn on_georss(mut self) -> Self {
        self.public_only = true;
        self
    }

    /// Case-insensitive substring match on the hostname. The pattern is not
    /// escaped, so `%` and `_` act as wildcards.
    pub fn hostname_like(mut self, pattern: impl Into<String>) -> Self {
        self.hostname_pattern = Some(pattern.into());
        self
    }

    /// Activated on or before `till`.
    pub fn activated(mut self, till: DateTime<Utc>) -> Self {
        self.activated_till = Some(till);
        self
    }

    /// Within `radius_km` of `origin`, inclusive.
    pub fn around(mut self, origin: Coordinates, radius_km: f64) -> Self {
        self.within = Some((origin, radius_km));
        self
    }

    pub fn sort_with(mut self, column: SortColumn, direction: SortDirection) -> Self {
        self.sort = Some((column, direction));
        self
    }

    /// Sort using raw attribute and direction names, as received from a
    /// listing UI.
    pub fn sort_with_names(self, attribute: &str, direction: &str) -> Result<Self> {
        Ok(self.sort_with(attribute.parse()?, direction.parse()?))
    }

    pub fn all_up(pattern: Option<&str>) -> Self {
        Self::new().up().hostname_like(pattern.unwrap_or_default())
    }

    pub fn all_down(pattern: Option<&str>) -> Self {
        Self::new().down().hostname_like(pattern.unwrap_or_default())
    }

    pub fn all_unknown(pattern: Option<&str>) -> Self {
        Self::new().unknown().hostname_like(pattern.unwrap_or_default())
    }

    /// `SELECT` of full access point rows, ordered, optionally paginated.
    pub fn select_query(&self, page: Option<Page>) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(ACCESS_POINT_COLUMNS);
        qb.push(" FROM access_points ");
        qb.push(WITH_PROPERTIES);
        self.push_conditions(&mut qb);

        qb.push(" ORDER BY ");
        if let Some((column, direction)) = self.sort {
            qb.push(column.sql()).push(" ").push(direction.sql());
            if let Some(nulls) = column.nulls(direction) {
                qb.push(" ").push(nulls);
            }
            qb.push(", ");
        }
        qb.push("access_points.id ASC");

        if let Some(page) = page {
            qb.push(" LIMIT ").push_bind(page.limit());
            qb.push(" OFFSET ").push_bind(page.offset());
        }
        qb
    }

    /// `SELECT COUNT(*)` over the same filters.
    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM access_points ");
        qb.push(WITH_PROPERTIES);
        self.push_conditions(&mut qb);
        qb
    }

    fn push_conditions(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let mut has_where = false;
        let mut clause = |qb: &mut QueryBuilder<'static, Postgres>| {
            qb.push(if has_where { " AND " } else { " WHERE " });
            has_where = true;
        };

        if let Some(wisp_id) = self.wisp_id {
            clause(qb);
            qb.push("access_points.wisp_id = ").push_bind(wisp_id);
        }

        match self.status {
            Some(StatusFilter::Up) => {
                clause(qb);
                qb.push("property_sets.reachable = TRUE");
            }
            Some(StatusFilter::Down) => {
                clause(qb);
                qb.push("property_sets.reachable = FALSE");
            }
            Some(StatusFilter::Known) => {
                clause(qb);
                qb.push("property_sets.reachable IS NOT NULL");
            }
            Some(StatusFilter::Unknown) => {
                clause(qb);
                qb.push("property_sets.reachable IS NULL");
            }
            None => {}
        }

        if self.public_only {
            clause(qb);
            qb.push("property_sets.public = TRUE");
        }

        if let Some(pattern) = &self.hostname_pattern {
            clause(qb);
            qb.push("access_points.hostname ILIKE ")
                .push_bind(format!("%{}%", pattern));
        }

        if let Some(till) = self.activated_till {
            clause(qb);
            qb.push("access_points.activation_date <= ").push_bind(till);
        }

        if let Some((origin, radius_km)) = self.within {
            clause(qb);
            qb.push("2 * ASIN(SQRT(LEAST(1.0, POWER(SIN(RADIANS(access_points.lat - ")
                .push_bind(origin.lat)
                .push(") / 2), 2) + COS(RADIANS(")
                .push_bind(origin.lat)
                .push(")) * COS(RADIANS(access_points.lat)) * POWER(SIN(RADIANS(access_points.lng - ")
                .push_bind(origin.lng)
                .push(") / 2), 2)))) * ")
                .push(EARTH_RADIUS_KM)
                .push(" <= ")
                .push_bind(radius_km);
        }
    }
}
