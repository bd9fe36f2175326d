use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// A logged portion of food. Created or deleted, never updated.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConsumptionEvent {
    pub id: i64,
    pub user_id: Uuid,
    pub food_id: i64,
    pub grams: f64,
    #[serde(with = "crate::dates")]
    pub consumed_on: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}
