use std::time::Duration;

use axum::{
    Json, Router,
    http::{
        HeaderValue, Method,
        header::{CONTENT_TYPE, COOKIE},
    },
    routing::{get, post, put},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::state::SharedState;

pub mod auth;
pub mod chat;
pub mod listings;
pub mod market;
pub mod stats;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60));

    match HeaderValue::from_str(origin) {
        Ok(v) => cors.allow_origin(v),
        Err(e) => {
            warn!("Ignoring invalid CORS origin '{origin}': {e}");
            cors
        }
    }
}

/// Every endpoint of the API, with tracing and CORS applied.
pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .route("/health", get(health))
        // accounts
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .route("/checklogin", get(auth::check_login))
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::current_user))
        .route("/api/update-profile-photo", post(auth::update_profile_photo))
        // listings
        .route("/api/categorylist", get(listings::category_list))
        .route("/api/categories", get(listings::category_by_name))
        .route("/newlisting", post(listings::create_listing))
        .route("/mylistings", get(listings::my_listings))
        .route(
            "/mylistings/{id}",
            put(listings::update_listing).delete(listings::delete_listing),
        )
        .route("/api/items", get(listings::recent_items))
        .route("/api/total-listings", get(listings::total_listings))
        // marketplace and routing
        .route("/api/products", get(market::products))
        .route("/api/sellers", get(market::sellers))
        .route("/api/route", post(market::route))
        // stats
        .route("/api/score", get(stats::score))
        .route("/percents", get(stats::percents))
        // chat
        .route("/api/chat-threads", post(chat::open_thread))
        .route("/api/chat-thread", get(chat::threads))
        .route("/api/recent-threads", get(chat::recent_threads))
        .route(
            "/api/messages/{thread_id}",
            get(chat::messages).post(chat::post_message),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
