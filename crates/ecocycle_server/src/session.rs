use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::COOKIE, request::Parts},
};
use ecocycle_core::auth::SessionToken;
use ecocycle_core::db::queries::sessions;

use crate::error::{AppError, AppResult};
use crate::state::{AppState, SharedState};

pub const SESSION_COOKIE: &str = "ecocycle_sid";

/// Pull the session token out of the `Cookie` header(s).
pub fn token_from_headers(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionToken::from_cookie(value))
}

pub fn set_cookie(token: &SessionToken, secure: bool) -> String {
    format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax{}",
        token.as_str(),
        if secure { "; Secure" } else { "" }
    )
}

pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Resolve the logged-in user id, if the request carries a live session.
pub async fn session_user_id(state: &AppState, headers: &HeaderMap) -> AppResult<Option<i64>> {
    let Some(token) = token_from_headers(headers) else {
        return Ok(None);
    };

    let digest = token.digest();
    let user_id = state
        .pool
        .run(move |con| sessions::session_user(con, &digest))
        .await?;
    Ok(user_id)
}

/// Extractor for handlers that require a logged-in user.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i64,
}

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        match session_user_id(state, &parts.headers).await? {
            Some(id) => Ok(CurrentUser { id }),
            None => Err(AppError::unauthorized()),
        }
    }
}
