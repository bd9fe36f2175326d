//! Pivoted per-event nutrient query.
//!
//! The generated SQL has one row per consumption event and one column per
//! requested nutrient. Nutrient ids are server-controlled catalog integers and
//! are rendered into the column expressions; the user id and the optional day
//! are always bound parameters (`?1`, `?2`).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Encode, Row, Sqlite, SqlitePool, Type};
use time::Date;

use crate::error::NutritionError;

/// Amount of one nutrient in one event, or the explicit "no data" marker
/// when the food has no value for that nutrient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NutrientValue {
    Amount(f64),
    NoData,
}

impl NutrientValue {
    pub fn amount_or_zero(self) -> f64 {
        match self {
            NutrientValue::Amount(v) => v,
            NutrientValue::NoData => 0.0,
        }
    }
}

impl From<Option<f64>> for NutrientValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(NutrientValue::NoData, NutrientValue::Amount)
    }
}

/// One consumption event with its per-nutrient amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub event_id: i64,
    pub food_id: i64,
    pub food_description: String,
    pub grams: f64,
    #[serde(with = "crate::dates")]
    pub consumed_on: Date,
    /// Exactly the requested nutrient ids.
    pub nutrients: BTreeMap<i64, NutrientValue>,
}

impl PivotRow {
    fn from_row(row: &SqliteRow, nutrient_ids: &[i64]) -> Result<Self, sqlx::Error> {
        let mut nutrients = BTreeMap::new();
        for &id in nutrient_ids {
            let value: Option<f64> = row.try_get(nutrient_column(id).as_str())?;
            nutrients.insert(id, NutrientValue::from(value));
        }
        Ok(Self {
            event_id: row.try_get("event_id")?,
            food_id: row.try_get("food_id")?,
            food_description: row.try_get("food_description")?,
            grams: row.try_get("grams")?,
            consumed_on: row.try_get("consumed_on")?,
            nutrients,
        })
    }
}

/// Alias of the computed column for `nutrient_id`.
pub fn nutrient_column(nutrient_id: i64) -> String {
    format!("n_{}", nutrient_id)
}

/// A ready-to-run pivot query: SQL text plus the values it binds.
#[derive(Debug, Clone)]
pub struct PivotQuery<U> {
    sql: String,
    nutrient_ids: Vec<i64>,
    user_id: U,
    day: Option<Date>,
}

impl<U> PivotQuery<U> {
    /// Build the query for `nutrient_ids` (column order follows the slice)
    /// restricted to events owned by `user_id`.
    pub fn build(nutrient_ids: &[i64], user_id: U) -> Result<Self, NutritionError> {
        validate_ids(nutrient_ids)?;
        Ok(Self {
            sql: render_sql(nutrient_ids),
            nutrient_ids: nutrient_ids.to_vec(),
            user_id,
            day: None,
        })
    }

    /// Restrict to events consumed on `day`.
    pub fn on_day(mut self, day: Date) -> Self {
        self.day = Some(day);
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn nutrient_ids(&self) -> &[i64] {
        &self.nutrient_ids
    }

    pub fn day(&self) -> Option<Date> {
        self.day
    }
}

impl<U> PivotQuery<U>
where
    U: for<'q> Encode<'q, Sqlite> + Type<Sqlite> + Sync,
{
    pub async fn fetch(&self, db: &SqlitePool) -> Result<Vec<PivotRow>, NutritionError> {
        let rows = sqlx::query(&self.sql)
            .bind(&self.user_id)
            .bind(self.day)
            .fetch_all(db)
            .await?;
        let pivoted = rows
            .iter()
            .map(|row| PivotRow::from_row(row, &self.nutrient_ids))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pivoted)
    }
}

fn validate_ids(nutrient_ids: &[i64]) -> Result<(), NutritionError> {
    if nutrient_ids.is_empty() {
        return Err(NutritionError::invalid("at least one nutrient id is required"));
    }
    let mut seen = BTreeSet::new();
    for &id in nutrient_ids {
        if id <= 0 {
            return Err(NutritionError::invalid(format!("nutrient id {} is not positive", id)));
        }
        if !seen.insert(id) {
            return Err(NutritionError::invalid(format!("nutrient id {} is repeated", id)));
        }
    }
    Ok(())
}

// Only validated i64 values reach this point, so every rendered fragment is
// digits. Nothing caller-supplied is ever formatted into the text.
fn render_sql(nutrient_ids: &[i64]) -> String {
    let columns = nutrient_ids
        .iter()
        .map(|id| {
            format!(
                "MAX(CASE WHEN na.nutrient_id = {id} THEN ce.grams * na.value_per_100g / 100.0 END) AS {alias}",
                id = id,
                alias = nutrient_column(*id),
            )
        })
        .collect::<Vec<_>>()
        .join(",\n       ");
    let id_list = nutrient_ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"SELECT ce.id AS event_id,
       ce.food_id AS food_id,
       f.description AS food_description,
       ce.grams AS grams,
       ce.consumed_on AS consumed_on,
       {columns}
  FROM consumption_event ce
  JOIN food_name f ON f.food_id = ce.food_id
  LEFT JOIN nutrient_amount na
    ON na.food_id = ce.food_id
   AND na.nutrient_id IN ({id_list})
 WHERE ce.user_id = ?1
   AND (?2 IS NULL OR ce.consumed_on = ?2)
 GROUP BY ce.id
 ORDER BY ce.consumed_on, ce.id"#,
        columns = columns,
        id_list = id_list,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo_types::User, db, ledger};
    use time::macros::date;
    use uuid::Uuid;

    fn select_list(sql: &str) -> &str {
        let end = sql.find("\n  FROM").unwrap();
        &sql[..end]
    }

    #[test]
    fn one_column_per_id_in_input_order() {
        let ids = [401, 203, 301, 208];
        let q = PivotQuery::build(&ids, Uuid::nil()).unwrap();
        let select = select_list(q.sql());

        assert_eq!(select.matches("MAX(CASE").count(), ids.len());
        let positions: Vec<usize> = ids
            .iter()
            .map(|id| select.find(&format!("AS {}", nutrient_column(*id))).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(q.nutrient_ids(), &ids);
    }

    #[test]
    fn rejects_malformed_id_sets() {
        for bad in [&[][..], &[203, 204, 203][..], &[0][..], &[203, -7][..]] {
            let err = PivotQuery::build(bad, Uuid::nil()).unwrap_err();
            assert!(matches!(err, NutritionError::InvalidInput(_)), "{:?}", bad);
        }
    }

    #[test]
    fn user_id_is_bound_not_rendered() {
        let hostile = String::from("x' OR '1'='1'; DROP TABLE consumption_event; --");
        let q = PivotQuery::build(&[203], hostile.clone()).unwrap();
        assert!(!q.sql().contains(&hostile));
        assert!(!q.sql().contains("DROP"));
        assert!(q.sql().contains("ce.user_id = ?1"));
        assert_eq!(q.user_id, hostile);
    }

    #[test]
    fn building_twice_is_stable() {
        let user = Uuid::new_v4();
        let a = PivotQuery::build(&[203, 204], user).unwrap();
        let b = PivotQuery::build(&[203, 204], user).unwrap();
        assert_eq!(a.sql(), b.sql());
        assert_eq!(a.nutrient_ids(), b.nutrient_ids());
        assert_eq!(a.user_id, b.user_id);
    }

    #[tokio::test]
    async fn hostile_user_id_executes_safely() {
        let pool = db::memory().await.unwrap();
        let alice = User::create(&pool, "alice", "hash").await.unwrap();
        ledger::repo::insert_event(&pool, alice.id, 1, 50.0, date!(2024 - 01 - 01))
            .await
            .unwrap();

        let hostile = String::from("' OR 1=1; DROP TABLE consumption_event; --");
        let rows = PivotQuery::build(&[203], hostile).unwrap().fetch(&pool).await.unwrap();
        assert!(rows.is_empty());

        // The table survives and Alice's data is intact.
        let rows = PivotQuery::build(&[203], alice.id).unwrap().fetch(&pool).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn rows_carry_every_requested_nutrient() {
        let pool = db::memory().await.unwrap();
        let alice = User::create(&pool, "alice", "hash").await.unwrap();
        let bob = User::create(&pool, "bob", "hash").await.unwrap();

        // Blue cheese has protein and fat; orange juice has protein but no fat.
        ledger::repo::insert_event(&pool, alice.id, 1, 50.0, date!(2024 - 01 - 01)).await.unwrap();
        ledger::repo::insert_event(&pool, alice.id, 3183, 200.0, date!(2024 - 01 - 02)).await.unwrap();
        ledger::repo::insert_event(&pool, bob.id, 1, 999.0, date!(2024 - 01 - 01)).await.unwrap();

        let rows = PivotQuery::build(&[204, 203, 401], alice.id)
            .unwrap()
            .fetch(&pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let cheese = &rows[0];
        assert_eq!(cheese.food_description, "Cheese, blue");
        assert_eq!(cheese.consumed_on, date!(2024 - 01 - 01));
        assert_eq!(cheese.nutrients.len(), 3);
        assert!((cheese.nutrients[&203].amount_or_zero() - 10.7).abs() < 1e-9);
        assert!((cheese.nutrients[&204].amount_or_zero() - 14.37).abs() < 1e-9);
        assert_eq!(cheese.nutrients[&401], NutrientValue::NoData);

        let juice = &rows[1];
        assert_eq!(juice.nutrients[&204], NutrientValue::NoData);
        assert!((juice.nutrients[&401].amount_or_zero() - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn day_filter_is_applied() {
        let pool = db::memory().await.unwrap();
        let alice = User::create(&pool, "alice", "hash").await.unwrap();
        ledger::repo::insert_event(&pool, alice.id, 1, 50.0, date!(2024 - 01 - 01)).await.unwrap();
        ledger::repo::insert_event(&pool, alice.id, 2, 10.0, date!(2024 - 01 - 02)).await.unwrap();

        let rows = PivotQuery::build(&[203], alice.id)
            .unwrap()
            .on_day(date!(2024 - 01 - 02))
            .fetch(&pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].food_id, 2);
    }

    #[tokio::test]
    async fn food_without_any_amounts_still_yields_a_row() {
        let pool = db::memory().await.unwrap();
        let alice = User::create(&pool, "alice", "hash").await.unwrap();
        sqlx::query("INSERT INTO food_name (food_id, description) VALUES (77, 'Water, tap')")
            .execute(&pool)
            .await
            .unwrap();
        ledger::repo::insert_event(&pool, alice.id, 77, 250.0, date!(2024 - 01 - 01)).await.unwrap();

        let rows = PivotQuery::build(&[203, 208], alice.id).unwrap().fetch(&pool).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].nutrients.values().all(|v| *v == NutrientValue::NoData));
    }
}
