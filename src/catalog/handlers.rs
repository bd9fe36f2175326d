use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument, warn};

use super::dto::{FoodDetails, FoodSearch, ServingNutrient, ServingQuery};
use super::repo;
use super::repo_types::{Food, Nutrient};
use crate::{error::NutritionError, state::AppState};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrients", get(list_nutrients))
        .route("/foods", get(list_foods))
        .route("/foods/:id", get(get_food))
}

#[instrument(skip(state))]
pub async fn list_nutrients(
    State(state): State<AppState>,
) -> Result<Json<Vec<Nutrient>>, NutritionError> {
    Ok(Json(repo::list_nutrients(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    Query(search): Query<FoodSearch>,
) -> Result<Json<Vec<Food>>, NutritionError> {
    let q = search.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let foods = repo::list_foods(&state.db, q).await?;
    debug!(count = foods.len(), "foods listed");
    Ok(Json(foods))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(serving): Query<ServingQuery>,
) -> Result<Json<FoodDetails>, NutritionError> {
    let grams = serving.serving_amount;
    if !grams.is_finite() || grams <= 0.0 {
        warn!(%grams, "invalid serving amount");
        return Err(NutritionError::invalid("serving_amount must be a positive number"));
    }

    let food = repo::find_food(&state.db, id)
        .await?
        .ok_or(NutritionError::NotFound("Food"))?;

    let nutrients = repo::food_nutrients(&state.db, id)
        .await?
        .into_iter()
        .map(|row| ServingNutrient {
            amount: row.per_serving(grams),
            nutrient_id: row.nutrient_id,
            name: row.name,
            unit: row.unit,
        })
        .collect();

    Ok(Json(FoodDetails {
        food,
        serving_amount: grams,
        nutrients,
    }))
}
