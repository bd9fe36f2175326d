use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use super::aggregate::DriPercent;
use super::pivot::PivotRow;
use crate::error::NutritionError;

#[derive(Debug, Default, Deserialize)]
pub struct TotalsQuery {
    #[serde(default, with = "crate::dates::option")]
    pub date: Option<Date>,
    /// Comma separated nutrient ids, e.g. `203,204`.
    pub nutrients: Option<String>,
}

impl TotalsQuery {
    pub fn nutrient_ids(&self) -> Result<Option<Vec<i64>>, NutritionError> {
        let Some(raw) = self.nutrients.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        raw.split(',')
            .map(|part| {
                part.trim()
                    .parse::<i64>()
                    .map_err(|_| NutritionError::invalid(format!("bad nutrient id {:?}", part.trim())))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    #[serde(with = "crate::dates::option")]
    pub date: Option<Date>,
    pub nutrient_ids: Vec<i64>,
    pub rows: Vec<PivotRow>,
    pub totals: BTreeMap<i64, f64>,
    pub percent_of_dri: BTreeMap<i64, DriPercent>,
}
