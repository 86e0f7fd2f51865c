/*
 * Responsibility
 * - users テーブル向け SQLx 操作 (read + rating 更新)
 * - PgPool を受け取り、DB エラーは RepoError で返す
 * - UserRow は raw rating を持つ。外に出す時は SecureRatingService を通すこと
 */
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;
use crate::services::rating::{EntityKind, Ratable};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    #[sqlx(rename = "userName")]
    pub user_name: String,
    #[sqlx(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub rating: Decimal,
}

impl Ratable for UserRow {
    fn kind(&self) -> EntityKind {
        EntityKind::UserProfile
    }

    fn entity_key(&self) -> String {
        self.id.to_string()
    }

    fn rating(&self) -> Decimal {
        self.rating
    }
}

pub async fn list(db: &PgPool) -> Result<Vec<UserRow>, RepoError> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT "userId", "userName", "imageUrl", rating
        FROM users
        ORDER BY "createdAt" DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, user_id: Uuid) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT "userId", "userName", "imageUrl", rating
        FROM users
        WHERE "userId" = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn update_rating(
    db: &PgPool,
    user_id: Uuid,
    rating: Decimal,
) -> Result<Option<UserRow>, RepoError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET rating = $2
        WHERE "userId" = $1
        RETURNING "userId", "userName", "imageUrl", rating
        "#,
    )
    .bind(user_id)
    .bind(rating)
    .fetch_optional(db)
    .await?;

    Ok(row)
}
