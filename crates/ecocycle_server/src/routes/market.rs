use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use ecocycle_core::db::queries::listings;
use ecocycle_core::model::{MarketListing, Seller};
use ecocycle_core::routing::filter::SellerFilter;
use ecocycle_core::routing::geo::Coordinate;
use ecocycle_core::routing::sequencer::{RoutePlan, SellerStop, SequenceOptions, plan_route};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SellerQuery {
    pub material: Option<String>,
    pub volume: Option<String>,
}

/// Origin as sent by a browser geolocation lookup; either part may be missing.
#[derive(Debug, Deserialize)]
pub struct OriginInput {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub origin: Option<OriginInput>,
    #[serde(default)]
    pub sellers: Vec<SellerStop>,
}

pub async fn products(State(state): State<SharedState>) -> AppResult<Json<Vec<MarketListing>>> {
    let rows = state.pool.run(|con| listings::active_listings(con)).await?;
    Ok(Json(rows))
}

pub async fn sellers(
    State(state): State<SharedState>,
    query: Result<Query<SellerQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Seller>>> {
    let Query(q) = query?;
    let filter = SellerFilter::parse(q.material.as_deref(), q.volume.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let all = state.pool.run(|con| listings::list_sellers(con)).await?;
    let total = all.len();
    let kept = filter.apply(all);

    debug!(total, kept = kept.len(), "sellers filtered");
    Ok(Json(kept))
}

pub async fn route(payload: Result<Json<RouteRequest>, JsonRejection>) -> AppResult<Json<RoutePlan>> {
    let Json(req) = payload?;

    let origin = req
        .origin
        .and_then(|o| Coordinate::from_parts(o.lat, o.lng));

    let plan = plan_route(origin, &req.sellers, SequenceOptions::default());
    Ok(Json(plan))
}
