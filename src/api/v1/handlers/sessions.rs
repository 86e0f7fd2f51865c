/*
 * Responsibility
 * - GET /sessions/{session_id}/roster
 * - session_id は公開 ID (sqids) → PublicSessionId extractor で内部 ID に変換して受け取る
 * - roster の rating も users と同じ gate を通す
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::sessions::{RosterEntryResponse, RosterResponse},
        extractors::PublicSessionId,
    },
    error::AppError,
    repos::session_repo,
    state::AppState,
};

pub async fn get_roster(
    State(state): State<AppState>,
    session_id: PublicSessionId,
) -> Result<Json<RosterResponse>, AppError> {
    let session = session_repo::get(&state.db, session_id.id)
        .await?
        .ok_or(AppError::not_found("session"))?;

    let entries = session_repo::roster(&state.db, session.session_id).await?;

    let players = entries
        .into_iter()
        .map(|entry| RosterEntryResponse {
            rating: state.ratings.secure_rating(Some(&entry)),
            user_id: entry.user_id,
            user_name: entry.user_name,
            joined_at: entry.joined_at,
        })
        .collect();

    Ok(Json(RosterResponse {
        session_id: state.id_codec.encode(session.session_id)?,
        title: session.title,
        starts_at: session.starts_at,
        players,
    }))
}
