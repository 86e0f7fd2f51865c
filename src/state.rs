/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, id_codec: IdCodec, auth: AuthService, security: context accessor, ratings
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{
    auth::AuthService, id_codec::IdCodec, rating::SecureRatingService,
    security::SecurityContextAccessor,
};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub id_codec: IdCodec,
    pub auth: Arc<AuthService>,
    pub security: Arc<SecurityContextAccessor>,
    pub ratings: Arc<SecureRatingService>,
}

impl AppState {
    pub fn new(
        db: sqlx::PgPool,
        id_codec: IdCodec,
        auth: Arc<AuthService>,
        security: Arc<SecurityContextAccessor>,
        ratings: Arc<SecureRatingService>,
    ) -> Self {
        Self {
            db,
            id_codec,
            auth,
            security,
            ratings,
        }
    }
}
