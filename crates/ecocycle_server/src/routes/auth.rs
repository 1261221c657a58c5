use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use ecocycle_core::auth::{SessionToken, hash_password, verify_password};
use ecocycle_core::db::is_unique_violation;
use ecocycle_core::db::queries::{sessions, users};
use ecocycle_core::model::{User, UserType};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::session::{CurrentUser, clear_cookie, session_user_id, set_cookie, token_from_headers};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub user_name: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
    pub user_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PhotoRequest {
    pub image_url: Option<String>,
}

enum SignupOutcome {
    Created(i64),
    PhoneTaken,
}

enum SigninOutcome {
    LoggedIn,
    NoAccount,
    BadPassword,
}

fn required(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub async fn signup(
    State(state): State<SharedState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(req) = payload?;

    let (Some(user_name), Some(phone_number), Some(password), Some(user_type)) = (
        required(req.user_name),
        required(req.phone_number),
        req.password.filter(|p| !p.is_empty()),
        required(req.user_type),
    ) else {
        return Err(AppError::BadRequest("All fields are required".into()));
    };

    let user_type: UserType = user_type
        .parse()
        .map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string()))?;

    let token = SessionToken::generate();
    let digest = token.digest();
    let cost = state.config.bcrypt_cost;

    let outcome = state
        .pool
        .run(move |con| {
            if users::find_credentials_by_phone(con, &phone_number)?.is_some() {
                return Ok(SignupOutcome::PhoneTaken);
            }

            let hash = hash_password(&password, cost)?;
            // the number may have been taken since the check
            let id = match users::insert_user(con, &user_name, &phone_number, &hash, user_type) {
                Ok(id) => id,
                Err(e) if is_unique_violation(&e) => return Ok(SignupOutcome::PhoneTaken),
                Err(e) => return Err(e),
            };
            sessions::create_session(con, &digest, id)?;
            Ok(SignupOutcome::Created(id))
        })
        .await?;

    match outcome {
        SignupOutcome::PhoneTaken => Err(AppError::Conflict("User already exists".into())),
        SignupOutcome::Created(id) => {
            info!(user_id = id, "user registered");
            Ok((
                StatusCode::CREATED,
                [(SET_COOKIE, set_cookie(&token, state.config.secure_cookie))],
                Json(json!({
                    "message": "User registered successfully",
                    "userId": id
                })),
            )
                .into_response())
        }
    }
}

pub async fn signin(
    State(state): State<SharedState>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(req) = payload?;

    let token = SessionToken::generate();
    let digest = token.digest();

    let outcome = state
        .pool
        .run(move |con| {
            let Some(creds) = users::find_credentials_by_phone(con, req.phone_number.trim())?
            else {
                return Ok(SigninOutcome::NoAccount);
            };

            if !verify_password(&req.password, &creds.password_hash)? {
                return Ok(SigninOutcome::BadPassword);
            }

            sessions::create_session(con, &digest, creds.id)?;
            Ok(SigninOutcome::LoggedIn)
        })
        .await?;

    match outcome {
        SigninOutcome::NoAccount => Err(AppError::NotFound("No such account".into())),
        SigninOutcome::BadPassword => Err(AppError::Unauthorized("Invalid credentials".into())),
        SigninOutcome::LoggedIn => Ok((
            StatusCode::OK,
            [(SET_COOKIE, set_cookie(&token, state.config.secure_cookie))],
            Json(json!({ "message": "Logged in successfully" })),
        )
            .into_response()),
    }
}

pub async fn check_login(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    let body = match session_user_id(&state, &headers).await? {
        Some(id) => json!({ "loggedIn": true, "userId": id }),
        None => json!({ "loggedIn": false }),
    };
    Ok(Json(body))
}

pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = token_from_headers(&headers) {
        let digest = token.digest();
        state
            .pool
            .run(move |con| sessions::delete_session(con, &digest))
            .await?;
    }

    Ok((
        [(SET_COOKIE, clear_cookie())],
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response())
}

pub async fn current_user(
    State(state): State<SharedState>,
    user: CurrentUser,
) -> AppResult<Json<User>> {
    state
        .pool
        .run(move |con| users::find_user_by_id(con, user.id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn update_profile_photo(
    State(state): State<SharedState>,
    user: CurrentUser,
    payload: Result<Json<PhotoRequest>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Json(req) = payload?;

    state
        .pool
        .run(move |con| users::upsert_user_photo(con, user.id, req.image_url.as_deref()))
        .await?;

    Ok(Json(json!({ "message": "updated successfully" })))
}
