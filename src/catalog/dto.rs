use serde::{Deserialize, Serialize};

use super::repo_types::Food;

pub const DEFAULT_SERVING_GRAMS: f64 = 100.0;

#[derive(Debug, Deserialize)]
pub struct FoodSearch {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServingQuery {
    #[serde(default = "default_serving")]
    pub serving_amount: f64,
}
fn default_serving() -> f64 { DEFAULT_SERVING_GRAMS }

/// Nutrient amount scaled to a serving.
#[derive(Debug, Serialize)]
pub struct ServingNutrient {
    pub nutrient_id: i64,
    pub name: String,
    pub unit: String,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct FoodDetails {
    #[serde(flatten)]
    pub food: Food,
    pub serving_amount: f64,
    pub nutrients: Vec<ServingNutrient>,
}
