/*
 * Responsibility
 * - Users の request/response DTO
 * - rating は必ず SecureRatingService を通した値を入れる (raw を直接入れない)
 */
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UpdateRatingRequest {
    pub rating: Decimal,
}

impl UpdateRatingRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.rating < Decimal::ZERO {
            return Err("rating must be >= 0");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub user_name: String,
    pub image_url: Option<String>,
    pub rating: Decimal,
}

/// `/me`: the caller's profile plus the roles their token carries.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub roles: Vec<String>,
}
