/*
 * Responsibility
 * - sessions / session_players の読み取り
 * - roster は session_players と users の join から作る (永続化された entity ではない)
 */
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::rating::{EntityKind, Ratable};

#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    #[sqlx(rename = "sessionId")]
    pub session_id: i64,
    pub title: String,
    #[sqlx(rename = "startsAt")]
    pub starts_at: DateTime<Utc>,
}

/// One player in a session roster. Identity is (session, user).
#[derive(Debug, Clone, FromRow)]
pub struct RosterEntryRow {
    #[sqlx(rename = "sessionId")]
    pub session_id: i64,
    #[sqlx(rename = "userId")]
    pub user_id: Uuid,
    #[sqlx(rename = "userName")]
    pub user_name: String,
    pub rating: Decimal,
    #[sqlx(rename = "joinedAt")]
    pub joined_at: DateTime<Utc>,
}

impl Ratable for RosterEntryRow {
    fn kind(&self) -> EntityKind {
        EntityKind::RosterEntry
    }

    fn entity_key(&self) -> String {
        format!("{}:{}", self.session_id, self.user_id)
    }

    fn rating(&self) -> Decimal {
        self.rating
    }
}

pub async fn get(db: &PgPool, session_id: i64) -> Result<Option<SessionRow>, RepoError> {
    let row = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT "sessionId", title, "startsAt"
        FROM sessions
        WHERE "sessionId" = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn roster(db: &PgPool, session_id: i64) -> Result<Vec<RosterEntryRow>, RepoError> {
    let rows = sqlx::query_as::<_, RosterEntryRow>(
        r#"
        SELECT
            sp."sessionId", sp."userId", u."userName", u.rating, sp."joinedAt"
        FROM session_players sp
        JOIN users u ON u."userId" = sp."userId"
        WHERE sp."sessionId" = $1
        ORDER BY sp."joinedAt" ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}
