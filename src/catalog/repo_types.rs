use serde::Serialize;
use sqlx::FromRow;

/// Reference row from `nutrient_name`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Nutrient {
    pub nutrient_id: i64,
    pub code: Option<i64>,
    pub symbol: Option<String>,
    pub unit: String,
    pub name: String,
    pub name_fr: Option<String>,
    pub tag_name: Option<String>,
    pub decimals: i64,
}

/// Round `value` to `decimals` places; the catalog publishes 0..=9.
pub fn round_to(value: f64, decimals: i64) -> f64 {
    let factor = 10f64.powi(decimals.clamp(0, 9) as i32);
    (value * factor).round() / factor
}

/// Reference row from `food_name`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Food {
    pub food_id: i64,
    pub description: String,
    pub description_fr: Option<String>,
}

impl Food {
    /// Case-insensitive substring test; `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.description.to_lowercase().contains(needle)
            || self
                .description_fr
                .as_deref()
                .is_some_and(|fr| fr.to_lowercase().contains(needle))
    }
}

/// One nutrient amount of a food, joined with its catalog entry.
#[derive(Debug, Clone, FromRow)]
pub struct FoodNutrientRow {
    pub nutrient_id: i64,
    pub name: String,
    pub unit: String,
    pub decimals: i64,
    pub value_per_100g: f64,
}

impl FoodNutrientRow {
    /// Amount in a serving of `grams`, rounded to the nutrient's precision.
    pub fn per_serving(&self, grams: f64) -> f64 {
        round_to(self.value_per_100g * grams / 100.0, self.decimals)
    }
}
