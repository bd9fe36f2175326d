use std::collections::BTreeMap;

use serde::Serialize;

use super::pivot::PivotRow;

/// Share of the daily target reached, as a fraction (1.0 = 100 %).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriPercent {
    Percent(f64),
    /// No target set, or a target of zero.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientTotals {
    pub totals: BTreeMap<i64, f64>,
    pub percent_of_dri: BTreeMap<i64, DriPercent>,
}

/// Sum every row per nutrient and compare against the targets.
///
/// Both result maps cover exactly the keys of `dri_by_nutrient`. "No data"
/// cells count as zero.
pub fn aggregate(rows: &[PivotRow], dri_by_nutrient: &BTreeMap<i64, Option<f64>>) -> NutrientTotals {
    let mut totals = BTreeMap::new();
    let mut percent_of_dri = BTreeMap::new();

    for (&nutrient_id, &dri) in dri_by_nutrient {
        let total: f64 = rows
            .iter()
            .filter_map(|row| row.nutrients.get(&nutrient_id))
            .map(|value| value.amount_or_zero())
            .sum();

        let percent = match dri {
            Some(target) if target != 0.0 && target.is_finite() => DriPercent::Percent(total / target),
            _ => DriPercent::Unavailable,
        };

        totals.insert(nutrient_id, total);
        percent_of_dri.insert(nutrient_id, percent);
    }

    NutrientTotals {
        totals,
        percent_of_dri,
    }
}
