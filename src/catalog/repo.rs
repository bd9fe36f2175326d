use sqlx::SqlitePool;

use super::repo_types::{Food, FoodNutrientRow, Nutrient};

pub async fn list_nutrients(db: &SqlitePool) -> Result<Vec<Nutrient>, sqlx::Error> {
    sqlx::query_as::<_, Nutrient>(
        r#"
        SELECT nutrient_id, code, symbol, unit, name, name_fr, tag_name, decimals
          FROM nutrient_name
         ORDER BY nutrient_id
        "#,
    )
    .fetch_all(db)
    .await
}

/// All foods, or those whose English or French description contains `search`.
///
/// SQLite's `LIKE` folds ASCII only and treats `%`/`_` as wildcards, so the
/// match runs here on Unicode-lowercased text.
pub async fn list_foods(db: &SqlitePool, search: Option<&str>) -> Result<Vec<Food>, sqlx::Error> {
    let foods = sqlx::query_as::<_, Food>(
        r#"
        SELECT food_id, description, description_fr
          FROM food_name
         ORDER BY food_id
        "#,
    )
    .fetch_all(db)
    .await?;

    let Some(needle) = search.map(str::to_lowercase) else {
        return Ok(foods);
    };
    Ok(foods
        .into_iter()
        .filter(|food| food.matches(&needle))
        .collect())
}

pub async fn find_food(db: &SqlitePool, food_id: i64) -> Result<Option<Food>, sqlx::Error> {
    sqlx::query_as::<_, Food>(
        r#"
        SELECT food_id, description, description_fr
          FROM food_name
         WHERE food_id = ?1
        "#,
    )
    .bind(food_id)
    .fetch_optional(db)
    .await
}

pub async fn food_nutrients(db: &SqlitePool, food_id: i64) -> Result<Vec<FoodNutrientRow>, sqlx::Error> {
    sqlx::query_as::<_, FoodNutrientRow>(
        r#"
        SELECT na.nutrient_id, n.name, n.unit, n.decimals, na.value_per_100g
          FROM nutrient_amount na
          JOIN nutrient_name n ON n.nutrient_id = na.nutrient_id
         WHERE na.food_id = ?1
         ORDER BY na.nutrient_id
        "#,
    )
    .bind(food_id)
    .fetch_all(db)
    .await
}
