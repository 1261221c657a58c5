use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use ecocycle_core::db::queries::{chat, users};
use ecocycle_core::model::{ChatMessage, ChatThreadSummary};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::session::CurrentUser;
use crate::state::SharedState;

const RECENT_THREADS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct OpenThreadRequest {
    pub recipient_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub text: String,
}

enum Opened {
    Thread(i64, bool),
    NoRecipient,
}

pub async fn open_thread(
    State(state): State<SharedState>,
    user: CurrentUser,
    payload: Result<Json<OpenThreadRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let Json(req) = payload?;

    let recipient_id = match req.recipient_id {
        Some(id) if id != user.id => id,
        _ => return Err(AppError::BadRequest("Invalid recipient".into())),
    };

    let opened = state
        .pool
        .run(move |con| {
            if !users::user_exists(con, recipient_id)? {
                return Ok(Opened::NoRecipient);
            }
            let (id, created) = chat::open_thread(con, user.id, recipient_id)?;
            Ok(Opened::Thread(id, created))
        })
        .await?;

    match opened {
        Opened::NoRecipient => Err(AppError::NotFound("Recipient not found".into())),
        Opened::Thread(id, created) => {
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            Ok((status, Json(json!({ "thread_id": id }))))
        }
    }
}

pub async fn threads(
    State(state): State<SharedState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ChatThreadSummary>>> {
    let rows = state
        .pool
        .run(move |con| chat::list_threads(con, user.id, None))
        .await?;
    Ok(Json(rows))
}

pub async fn recent_threads(
    State(state): State<SharedState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ChatThreadSummary>>> {
    let rows = state
        .pool
        .run(move |con| chat::list_threads(con, user.id, Some(RECENT_THREADS)))
        .await?;
    Ok(Json(rows))
}

pub async fn post_message(
    State(state): State<SharedState>,
    user: CurrentUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ChatMessage>)> {
    let Path(thread_id) = path?;
    let Json(req) = payload?;

    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("Message text required".into()));
    }

    let sent = state
        .pool
        .run(move |con| {
            if !chat::is_participant(con, thread_id, user.id)? {
                return Ok(None);
            }
            chat::post_message(con, thread_id, user.id, &req.text).map(Some)
        })
        .await?
        .ok_or(AppError::Forbidden)?;

    debug!(thread_id, message_id = sent.id, "message stored");
    Ok((StatusCode::CREATED, Json(sent)))
}

pub async fn messages(
    State(state): State<SharedState>,
    user: CurrentUser,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    let Path(thread_id) = path?;

    let rows = state
        .pool
        .run(move |con| {
            if !chat::is_participant(con, thread_id, user.id)? {
                return Ok(None);
            }
            let rows = chat::thread_messages(con, thread_id, user.id)?;
            chat::mark_opened(con, thread_id, user.id)?;
            Ok(Some(rows))
        })
        .await?
        .ok_or(AppError::Forbidden)?;

    Ok(Json(rows))
}
