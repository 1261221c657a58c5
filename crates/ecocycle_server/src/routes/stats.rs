use axum::{Json, extract::State};
use ecocycle_core::db::queries::stats;
use ecocycle_core::model::{CategoryShare, ScoreEntry};

use crate::error::AppResult;
use crate::session::CurrentUser;
use crate::state::SharedState;

pub async fn score(
    State(state): State<SharedState>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<ScoreEntry>>> {
    let board = state.pool.run(|con| stats::leaderboard(con)).await?;
    Ok(Json(board))
}

pub async fn percents(
    State(state): State<SharedState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<CategoryShare>>> {
    let shares = state
        .pool
        .run(move |con| stats::category_shares(con, user.id))
        .await?;
    Ok(Json(shares))
}
