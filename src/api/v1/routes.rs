/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証 context の設置は app.rs で middleware::auth::access を掛ける
 */
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    admin::clear_rating_cache,
    health::health,
    sessions::get_roster,
    users::{get_user, list_users, me, update_rating},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/me", get(me))
        .route("/users", get(list_users))
        .route("/users/{user_id}", get(get_user))
        .route("/users/{user_id}/rating", put(update_rating))
        .route("/sessions/{session_id}/roster", get(get_roster))
        .route("/admin/rating-cache/clear", post(clear_rating_cache))
}
