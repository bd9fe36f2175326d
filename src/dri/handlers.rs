use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::PutDriRequest;
use super::repo;
use super::repo_types::JoinedDri;
use crate::{auth::AuthUser, catalog, error::NutritionError, state::AppState};

pub fn dri_routes() -> Router<AppState> {
    Router::new()
        .route("/dri", get(get_dri).put(put_dri))
        .route("/dri/:nutrient_id", delete(delete_dri))
}

#[instrument(skip(state))]
pub async fn get_dri(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<JoinedDri>>, NutritionError> {
    Ok(Json(repo::joined_dri(&state.db, user_id).await?))
}

/// PUT /dri { entries: [{ nutrient_id, dri }] }
#[instrument(skip(state, body))]
pub async fn put_dri(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<PutDriRequest>,
) -> Result<Json<Vec<JoinedDri>>, NutritionError> {
    if body.entries.is_empty() {
        return Err(NutritionError::invalid("entries must be non-empty"));
    }

    let known: BTreeSet<i64> = catalog::repo::list_nutrients(&state.db)
        .await?
        .into_iter()
        .map(|n| n.nutrient_id)
        .collect();

    for entry in &body.entries {
        if !known.contains(&entry.nutrient_id) {
            warn!(nutrient_id = entry.nutrient_id, "unknown nutrient");
            return Err(NutritionError::invalid(format!(
                "unknown nutrient {}",
                entry.nutrient_id
            )));
        }
        if !entry.dri.is_finite() || entry.dri < 0.0 {
            warn!(nutrient_id = entry.nutrient_id, dri = %entry.dri, "invalid dri");
            return Err(NutritionError::invalid(format!(
                "dri for nutrient {} must be a non-negative number",
                entry.nutrient_id
            )));
        }
    }

    repo::upsert_many(&state.db, user_id, &body.entries).await?;
    info!(%user_id, count = body.entries.len(), "dri updated");

    Ok(Json(repo::joined_dri(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn delete_dri(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(nutrient_id): Path<i64>,
) -> Result<StatusCode, NutritionError> {
    repo::delete(&state.db, user_id, nutrient_id).await?;
    info!(%user_id, nutrient_id, "dri cleared");
    Ok(StatusCode::NO_CONTENT)
}
