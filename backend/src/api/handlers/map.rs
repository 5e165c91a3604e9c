//! Map rendering endpoints.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::api::SharedState;
use crate::error::Result;
use crate::models::{AccessPoint, MapMarker};
use crate::services::access_point_query::AccessPointScope;

#[derive(OpenApi)]
#[openapi(
    paths(draw_map, public_access_points),
    components(schemas(MapResponse, PublicAccessPointsResponse))
)]
pub struct MapApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(draw_map))
        .route("/public", get(public_access_points))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MapQuery {
    /// Restrict the map to one WISP
    pub wisp_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MapResponse {
    /// Radius used to group access points, in kilometres
    pub radius_km: f64,
    /// Markers tagged by `kind`: `single` or `cluster`
    #[schema(value_type = Vec<Object>)]
    pub markers: Vec<MapMarker>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicAccessPointsResponse {
    pub items: Vec<AccessPoint>,
}

/// GET /api/v1/map
#[utoipa::path(
    get,
    path = "",
    context_path = "/api/v1/map",
    tag = "map",
    operation_id = "draw_map",
    params(MapQuery),
    responses(
        (status = 200, description = "Clustered map markers", body = MapResponse),
    ),
)]
pub async fn draw_map(
    State(state): State<SharedState>,
    Query(query): Query<MapQuery>,
) -> Result<Json<MapResponse>> {
    let markers = state.map_service().draw_map(query.wisp_id).await?;
    Ok(Json(MapResponse {
        radius_km: state.config.cluster_radius_km,
        markers,
    }))
}

/// GET /api/v1/map/public
#[utoipa::path(
    get,
    path = "/public",
    context_path = "/api/v1/map",
    tag = "map",
    operation_id = "list_public_access_points",
    params(MapQuery),
    responses(
        (status = 200, description = "Access points published on the public feed", body = PublicAccessPointsResponse),
    ),
)]
pub async fn public_access_points(
    State(state): State<SharedState>,
    Query(query): Query<MapQuery>,
) -> Result<Json<PublicAccessPointsResponse>> {
    let scope = AccessPointScope::new().of_wisp(query.wisp_id).on_georss();
    let items = state.access_point_service().list(&scope, None).await?;
    Ok(Json(PublicAccessPointsResponse { items }))
}
