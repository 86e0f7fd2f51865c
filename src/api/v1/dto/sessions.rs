use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct RosterEntryResponse {
    pub user_id: Uuid,
    pub user_name: String,
    pub rating: Decimal,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    // public (sqids) id
    pub session_id: String,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub players: Vec<RosterEntryResponse>,
}
