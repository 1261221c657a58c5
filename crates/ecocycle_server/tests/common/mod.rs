#![allow(dead_code)]

use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use ecocycle_server::config::Config;
use ecocycle_server::create_router;
use ecocycle_server::state::AppState;
use serde_json::Value;
use tower::ServiceExt;

pub fn test_config() -> Config {
    Config {
        port: 0,
        db_path: std::env::temp_dir().join(format!("ecocycle_api_{}.sqlite", uuid::Uuid::new_v4())),
        pool_size: 4,
        pool_timeout: Duration::from_secs(5),
        cors_origin: "http://localhost:5173".into(),
        // bcrypt's minimum, keeps the suite fast
        bcrypt_cost: 4,
        secure_cookie: false,
    }
}

pub fn test_app() -> Router {
    create_router(AppState::new(test_config()).expect("state"))
}

pub struct Reply {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub body: Value,
}

/// Send one request. `cookie` is a `name=value` pair as returned in
/// [`Reply::cookie`].
pub async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Reply {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }

    let req = match body {
        Some(v) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    Reply {
        status,
        cookie,
        body,
    }
}

/// Register a user and return its session cookie and id.
pub async fn sign_up(app: &Router, name: &str, phone: &str) -> (String, i64) {
    let r = call(
        app,
        "POST",
        "/signup",
        None,
        Some(serde_json::json!({
            "user_name": name,
            "phone_number": phone,
            "password": "hunter22",
            "user_type": "individual"
        })),
    )
    .await;

    assert_eq!(r.status, StatusCode::CREATED, "{}", r.body);
    let id = r.body["userId"].as_i64().unwrap();
    (r.cookie.unwrap(), id)
}

pub fn listing_body(category_id: i64, quantity: f64, lat: f64, lng: f64) -> Value {
    serde_json::json!({
        "category_id": category_id,
        "location": {
            "city": "Blantyre",
            "district": "Blantyre",
            "country": "Malawi",
            "latitude": lat,
            "longitude": lng
        },
        "name": "Sorted lot",
        "price": 1000.0,
        "quantity": quantity,
        "unit": "kg",
        "image_url": "/uploads/lot.jpg"
    })
}
