use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use ecocycle_core::db::queries::listings;
use ecocycle_core::model::{
    Category, ListingStatus, ListingTotals, ListingUpdate, LocationInput, NewListing, OwnListing,
    RecentItem,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::session::CurrentUser;
use crate::state::SharedState;

/// Dashboard preview size for `/api/items`.
const PREVIEW_ITEMS: usize = 4;

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewListingRequest {
    pub category_id: i64,
    pub location: LocationInput,
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ListingStatus>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListingRequest {
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ListingStatus>,
    pub category_id: i64,
}

fn check_listing_fields(name: &str, price: f64, quantity: f64) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".into()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::BadRequest("Price must be a non-negative number".into()));
    }
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(AppError::BadRequest("Quantity must be a non-negative number".into()));
    }
    Ok(())
}

pub async fn category_list(State(state): State<SharedState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.pool.run(|con| listings::list_categories(con)).await?;
    Ok(Json(categories))
}

pub async fn category_by_name(
    State(state): State<SharedState>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    let Query(q) = query?;
    let Some(name) = q.name.filter(|n| !n.trim().is_empty()) else {
        return Err(AppError::BadRequest("Category name is required".into()));
    };

    state
        .pool
        .run(move |con| listings::find_category_by_name(con, &name))
        .await?
        .map(|id| Json(json!({ "category_id": id })))
        .ok_or_else(|| AppError::NotFound("Category not found".into()))
}

pub async fn create_listing(
    State(state): State<SharedState>,
    user: CurrentUser,
    payload: Result<Json<NewListingRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let Json(req) = payload?;
    check_listing_fields(&req.name, req.price, req.quantity)?;

    if req.location.city.trim().is_empty() || req.location.country.trim().is_empty() {
        return Err(AppError::BadRequest("Location city and country are required".into()));
    }

    let listing = NewListing {
        category_id: req.category_id,
        location: req.location,
        name: req.name.trim().to_string(),
        price: req.price,
        quantity: req.quantity,
        unit: req.unit,
        description: req.description,
        status: req.status.unwrap_or_default(),
        image_url: req.image_url,
    };

    let created = state
        .pool
        .run(move |con| {
            if !listings::category_exists(con, listing.category_id)? {
                return Ok(None);
            }
            listings::create_listing(con, user.id, &listing).map(Some)
        })
        .await?;

    let Some((product_id, location_id)) = created else {
        return Err(AppError::BadRequest("Unknown category".into()));
    };

    info!(user_id = user.id, product_id, location_id, "listing created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product created successfully",
            "product_id": product_id,
            "location_id": location_id
        })),
    ))
}

pub async fn my_listings(
    State(state): State<SharedState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<OwnListing>>> {
    let rows = state
        .pool
        .run(move |con| listings::list_own_listings(con, user.id))
        .await?;
    Ok(Json(rows))
}

pub async fn update_listing(
    State(state): State<SharedState>,
    user: CurrentUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateListingRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Path(product_id) = path?;
    let Json(req) = payload?;
    check_listing_fields(&req.name, req.price, req.quantity)?;

    let update = ListingUpdate {
        name: req.name.trim().to_string(),
        price: req.price,
        quantity: req.quantity,
        unit: req.unit,
        description: req.description,
        status: req.status.unwrap_or_default(),
        category_id: req.category_id,
    };

    let changed = state
        .pool
        .run(move |con| {
            if !listings::category_exists(con, update.category_id)? {
                return Ok(None);
            }
            listings::update_listing(con, user.id, product_id, &update).map(Some)
        })
        .await?;

    match changed {
        None => Err(AppError::BadRequest("Unknown category".into())),
        Some(0) => Err(AppError::NotFound("Product not found".into())),
        Some(_) => Ok(Json(json!({ "message": "Product updated successfully" }))),
    }
}

pub async fn delete_listing(
    State(state): State<SharedState>,
    user: CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(product_id) = path?;

    let removed = state
        .pool
        .run(move |con| listings::delete_listing(con, user.id, product_id))
        .await?;

    if removed == 0 {
        return Err(AppError::NotFound("Product not found".into()));
    }

    info!(user_id = user.id, product_id, "listing deleted");
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

pub async fn recent_items(
    State(state): State<SharedState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<RecentItem>>> {
    let items = state
        .pool
        .run(move |con| listings::oldest_items(con, user.id, PREVIEW_ITEMS))
        .await?;
    Ok(Json(items))
}

pub async fn total_listings(
    State(state): State<SharedState>,
    user: CurrentUser,
) -> AppResult<Json<ListingTotals>> {
    let totals = state
        .pool
        .run(move |con| listings::listing_totals(con, user.id))
        .await?;
    Ok(Json(totals))
}
