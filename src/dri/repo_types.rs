use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog nutrient with the user's target, if one is set.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JoinedDri {
    pub nutrient_id: i64,
    pub name: String,
    pub unit: String,
    pub dri: Option<f64>,
}

/// One (nutrient, daily recommended intake) pair to store for a user.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DriUpdate {
    pub nutrient_id: i64,
    pub dri: f64,
}
