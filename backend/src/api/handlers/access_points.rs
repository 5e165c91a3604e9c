//! Access point API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::api::dto::{Pagination, PaginationQuery};
use crate::api::SharedState;
use crate::error::Result;
use crate::models::{
    AccessPoint, AssociatedUser, LookupScope, PropertySet, PropertyUpdate, Reachability, Sighting,
};
use crate::services::access_point_query::{AccessPointScope, StatusFilter};
use crate::services::access_point_service::CreateAccessPointRequest;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_access_points,
        create_access_point,
        get_access_point,
        delete_access_point,
        update_properties,
        mark_reachable,
        mark_unreachable,
        get_availability,
        get_seen,
        get_associated_users,
    ),
    components(schemas(
        AccessPointView,
        AccessPointListResponse,
        AccessPoint,
        CreateAccessPointRequest,
        PropertySet,
        PropertyUpdate,
        Reachability,
        StatusFilter,
        AvailabilityResponse,
        SeenResponse,
        AssociatedUser,
        LookupScope,
    ))
)]
pub struct AccessPointsApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_access_points).post(create_access_point))
        .route("/:id", get(get_access_point).delete(delete_access_point))
        .route("/:id/properties", patch(update_properties))
        .route("/:id/reachable", post(mark_reachable))
        .route("/:id/unreachable", post(mark_unreachable))
        .route("/:id/availability", get(get_availability))
        .route("/:id/seen", get(get_seen))
        .route("/:id/associated-users", get(get_associated_users))
}

/// Access point with its derived status fields.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessPointView {
    #[serde(flatten)]
    pub access_point: AccessPoint,
    /// `1` up, `0` down, `-1` unknown
    pub status: i32,
    pub reachability: Reachability,
    /// Management address in dotted notation
    pub ip: Option<String>,
}

impl From<AccessPoint> for AccessPointView {
    fn from(access_point: AccessPoint) -> Self {
        Self {
            status: access_point.status(),
            reachability: access_point.reachability(),
            ip: access_point.ip().map(|ip| ip.to_string()),
            access_point,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessPointListResponse {
    pub items: Vec<AccessPointView>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListAccessPointsQuery {
    pub wisp_id: Option<i64>,
    pub status: Option<StatusFilter>,
    /// Case-insensitive hostname substring
    pub hostname: Option<String>,
    pub activated_till: Option<DateTime<Utc>>,
    /// Only access points published on the public feed
    pub public: Option<bool>,
    /// Sort attribute (id, hostname, status, activation_date, created_at, lat, lng, city)
    pub sort: Option<String>,
    /// asc or desc
    pub direction: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListAccessPointsQuery {
    fn to_scope(&self) -> Result<AccessPointScope> {
        let mut scope = AccessPointScope::new().of_wisp(self.wisp_id);
        if let Some(status) = self.status {
            scope = scope.with_status(status);
        }
        if let Some(hostname) = self.hostname.as_deref().filter(|h| !h.is_empty()) {
            scope = scope.hostname_like(hostname);
        }
        if let Some(till) = self.activated_till {
            scope = scope.activated(till);
        }
        if self.public == Some(true) {
            scope = scope.on_georss();
        }
        if let Some(sort) = &self.sort {
            scope = scope.sort_with_names(sort, self.direction.as_deref().unwrap_or("asc"))?;
        }
        Ok(scope)
    }

    fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// GET /api/v1/access-points
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/access-points",
    tag = "access_points",
    operation_id = "list_access_points",
    params(ListAccessPointsQuery),
    responses(
        (status = 200, description = "Paginated access points", body = AccessPointListResponse),
        (status = 400, description = "Invalid sort attribute or direction"),
    ),
)]
pub async fn list_access_points(
    State(state): State<SharedState>,
    Query(query): Query<ListAccessPointsQuery>,
) -> Result<Json<AccessPointListResponse>> {
    let scope = query.to_scope()?;
    let page = query
        .pagination()
        .to_page(state.config.access_points_per_page);

    let (items, total) = state.access_point_service().paginate(&scope, page).await?;

    Ok(Json(AccessPointListResponse {
        items: items.into_iter().map(AccessPointView::from).collect(),
        pagination: Pagination::from_page_and_total(page, total),
    }))
}

/// POST /api/v1/access-points
#[utoipa::path(
    post,
    path = "",
    context_path = "/api/v1/access-points",
    tag = "access_points",
    operation_id = "create_access_point",
    request_body = CreateAccessPointRequest,
    responses(
        (status = 201, description = "Access point created", body = AccessPointView),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Hostname already registered"),
    ),
)]
pub async fn create_access_point(
    State(state): State<SharedState>,
    Json(payload): Json<CreateAccessPointRequest>,
) -> Result<(StatusCode, Json<AccessPointView>)> {
    let access_point = state.access_point_service().create(payload).await?;
    Ok((StatusCode::CREATED, Json(access_point.into())))
}

/// GET /api/v1/access-points/:id
#[utoipa::path(
    get,
    path = "/{id}",
    context_path = "/api/v1/access-points",
    tag = "access_points",
    operation_id = "get_access_point",
    params(("id" = i64, Path, description = "Access point ID")),
    responses(
        (status = 200, description = "Access point details", body = AccessPointView),
        (status = 404, description = "Access point not found"),
    ),
)]
pub async fn get_access_point(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<AccessPointView>> {
    let access_point = state.access_point_service().get(id).await?;
    Ok(Json(access_point.into()))
}

/// DELETE /api/v1/access-points/:id
#[utoipa::path(
    delete,
    path = "/{id}",
    context_path = "/api/v1/access-points",
    tag = "access_points",
    operation_id = "delete_access_point",
    params(("id" = i64, Path, description = "Access point ID")),
    responses(
        (status = 204, description = "Access point deleted"),
        (status = 404, description = "Access point not found"),
    ),
)]
pub async fn delete_access_point(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.access_point_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/access-points/:id/properties
#[utoipa::path(
    patch,
    path = "/{id}/properties",
    context_path = "/api/v1/access-points",
    tag = "access_points",
    operation_id = "update_access_point_properties",
    params(("id" = i64, Path, description = "Access point ID")),
    request_body = PropertyUpdate,
    responses(
        (status = 200, description = "Property set after the update", body = PropertySet),
        (status = 404, description = "Access point not found"),
    ),
)]
pub async fn update_properties(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(payload): Json<PropertyUpdate>,
) -> Result<Json<PropertySet>> {
    let property_set = state
        .access_point_service()
        .update_properties(id, payload)
        .await?;
    Ok(Json(property_set))
}

/// POST /api/v1/access-points/:id/reachable
#[utoipa::path(
    post,
    path = "/{id}/reachable",
    context_path = "/api/v1/access-points",
    tag = "access_points",
    operation_id = "mark_access_point_reachable",
    params(("id" = i64, Path, description = "Access point ID")),
    responses(
        (status = 200, description = "Property set after the update", body = PropertySet),
        (status = 404, description = "Access point not found"),
    ),
)]
pub async fn mark_reachable(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<PropertySet>> {
    let property_set = state.access_point_service().mark_reachable(id).await?;
    Ok(Json(property_set))
}

/// POST /api/v1/access-points/:id/unreachable
#[utoipa::path(
    post,
    path = "/{id}/unreachable",
    context_path = "/api/v1/access-points",
    tag = "access_points",
    operation_id = "mark_access_point_unreachable",
    params(("id" = i64, Path, description = "Access point ID")),
    responses(
        (status = 200, description = "Property set after the update", body = PropertySet),
        (status = 404, description = "Access point not found"),
    ),
)]
pub async fn mark_unreachable(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<PropertySet>> {
    let property_set = state.access_point_service().mark_unreachable(id).await?;
    Ok(Json(property_set))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    pub from: DateTime<Utc>,
    /// Defaults to now
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Effective window start (activation date when later than requested)
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub up_average: String,
    pub down_average: String,
}

/// GET /api/v1/access-points/:id/availability
#[utoipa::path(
    get,
    path = "/{id}/availability",
    context_path = "/api/v1/access-points",
    tag = "access_points",
    operation_id = "get_access_point_availability",
    params(("id" = i64, Path, description = "Access point ID"), AvailabilityQuery),
    responses(
        (status = 200, description = "Uptime and downtime percentages", body = AvailabilityResponse),
        (status = 400, description = "Invalid window"),
        (status = 404, description = "Access point not found"),
    ),
)]
pub async fn get_availability(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>> {
    let service = state.access_point_service();
    let access_point = service.get(id).await?;
    let to = query.to.unwrap_or_else(Utc::now);

    let availability = service.availability(&access_point, query.from, to).await?;

    Ok(Json(AvailabilityResponse {
        from: availability.from,
        to: availability.to,
        up_average: availability.up_average(),
        down_average: availability.down_average(),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeenResponse {
    pub reachability: Reachability,
    /// Timestamp, `-` when never seen up, null when the state is unknown
    #[schema(value_type = Option<String>)]
    pub earliest: Option<Sighting>,
    #[schema(value_type = Option<String>)]
    pub latest: Option<Sighting>,
}

/// GET /api/v1/access-points/:id/seen
#[utoipa::path(
    get,
    path = "/{id}/seen",
    context_path = "/api/v1/access-points",
    tag = "access_points",
    operation_id = "get_access_point_seen",
    params(("id" = i64, Path, description = "Access point ID")),
    responses(
        (status = 200, description = "First and last time seen up", body = SeenResponse),
        (status = 404, description = "Access point not found"),
    ),
)]
pub async fn get_seen(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<SeenResponse>> {
    let service = state.access_point_service();
    let access_point = service.get(id).await?;

    let earliest = service.earliest_seen(&access_point).await?;
    let latest = service.latest_seen(&access_point).await?;

    Ok(Json(SeenResponse {
        reachability: access_point.reachability(),
        earliest,
        latest,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AssociatedUsersQuery {
    /// `all` (default) or `first`
    #[serde(default)]
    pub scope: LookupScope,
}

/// GET /api/v1/access-points/:id/associated-users
#[utoipa::path(
    get,
    path = "/{id}/associated-users",
    context_path = "/api/v1/access-points",
    tag = "access_points",
    operation_id = "get_access_point_associated_users",
    params(("id" = i64, Path, description = "Access point ID"), AssociatedUsersQuery),
    responses(
        (status = 200, description = "Users associated with the access point", body = Vec<AssociatedUser>),
        (status = 404, description = "Access point or WISP not found"),
        (status = 502, description = "Management service error"),
    ),
)]
pub async fn get_associated_users(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Query(query): Query<AssociatedUsersQuery>,
) -> Result<Json<Vec<AssociatedUser>>> {
    let service = state.access_point_service();
    let access_point = service.get(id).await?;
    let wisp = service.wisp_of(&access_point).await?;

    let users = state
        .associated_users
        .fetch(&wisp, &access_point.hostname, query.scope)
        .await?;
    Ok(Json(users))
}
