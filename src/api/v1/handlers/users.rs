/*
 * Responsibility
 * - /users, /me 系 handler
 * - rating は SecureRatingService で caller ごとに mask してから返す
 * - rating の更新は Elevated (Admin / SubAdmin) のみ
 */
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::users::{MeResponse, UpdateRatingRequest, UserResponse},
        extractors::{CurrentUser, Elevated},
    },
    error::AppError,
    repos::user_repo::{self, UserRow},
    state::AppState,
};

fn row_to_response(state: &AppState, row: UserRow) -> UserResponse {
    UserResponse {
        rating: state.ratings.secure_rating(Some(&row)),
        id: row.id,
        user_name: row.user_name,
        image_url: row.image_url,
    }
}

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = user_repo::list(&state.db).await?;

    let res = rows
        .into_iter()
        .map(|row| row_to_response(&state, row))
        .collect();

    Ok(Json(res))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::get(&state.db, user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(row_to_response(&state, row)))
}

pub async fn me(
    State(state): State<AppState>,
    CurrentUser { user_id }: CurrentUser,
) -> Result<Json<MeResponse>, AppError> {
    let row = user_repo::get(&state.db, user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(MeResponse {
        user: row_to_response(&state, row),
        roles: state.security.current_roles().into_iter().collect(),
    }))
}

pub async fn update_rating(
    State(state): State<AppState>,
    _elevated: Elevated,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateRatingRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_RATING", msg))?;

    let row = user_repo::update_rating(&state.db, user_id, req.rating)
        .await?
        .ok_or(AppError::not_found("user"))?;

    tracing::info!(%user_id, rating = %row.rating, "user rating updated");

    Ok(Json(row_to_response(&state, row)))
}
