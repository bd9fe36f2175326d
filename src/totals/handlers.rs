use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument, trace, warn};

use super::aggregate::{aggregate, DriPercent};
use super::dto::{TotalsQuery, TotalsResponse};
use super::pivot::PivotQuery;
use crate::{auth::AuthUser, dri, error::NutritionError, state::AppState};

pub fn totals_routes() -> Router<AppState> {
    Router::new().route("/totals", get(get_totals))
}

/// GET /totals?date=YYYY-MM-DD&nutrients=203,204
#[instrument(skip(state))]
pub async fn get_totals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<TotalsQuery>,
) -> Result<Json<TotalsResponse>, NutritionError> {
    let catalog_dri = dri::repo::dri_by_nutrient(&state.db, user_id).await?;

    let nutrient_ids = match params.nutrient_ids()? {
        Some(ids) => {
            if let Some(unknown) = ids.iter().find(|id| !catalog_dri.contains_key(*id)) {
                warn!(nutrient_id = unknown, "unknown nutrient requested");
                return Err(NutritionError::invalid(format!("unknown nutrient {}", unknown)));
            }
            ids
        }
        None => catalog_dri.keys().copied().collect(),
    };

    let mut query = PivotQuery::build(&nutrient_ids, user_id)?;
    if let Some(day) = params.date {
        query = query.on_day(day);
    }
    trace!(sql = query.sql(), "pivot query built");
    let rows = query.fetch(&state.db).await?;

    let dri_by_nutrient: BTreeMap<i64, Option<f64>> = nutrient_ids
        .iter()
        .map(|id| (*id, catalog_dri.get(id).copied().flatten()))
        .collect();
    let summary = aggregate(&rows, &dri_by_nutrient);

    let unavailable = summary
        .percent_of_dri
        .values()
        .filter(|p| matches!(p, DriPercent::Unavailable))
        .count();
    debug!(
        %user_id,
        day = ?query.day(),
        columns = query.nutrient_ids().len(),
        rows = rows.len(),
        unavailable,
        "totals computed"
    );

    Ok(Json(TotalsResponse {
        date: params.date,
        nutrient_ids,
        rows,
        totals: summary.totals,
        percent_of_dri: summary.percent_of_dri,
    }))
}
