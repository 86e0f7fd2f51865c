/*
 * Responsibility
 * - 管理系 handler (Elevated のみ)
 * - rating decision cache の手動クリア (role 剥奪直後など)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{dto::admin::ClearCacheResponse, extractors::Elevated},
    state::AppState,
};

pub async fn clear_rating_cache(
    State(state): State<AppState>,
    _elevated: Elevated,
) -> Json<ClearCacheResponse> {
    let cleared = state.ratings.clear_cache();
    Json(ClearCacheResponse { cleared })
}
