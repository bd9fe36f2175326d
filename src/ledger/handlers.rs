use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{DayQuery, LogConsumptionRequest};
use super::repo;
use super::repo_types::ConsumptionEvent;
use crate::{auth::AuthUser, catalog, dates, error::NutritionError, state::AppState};

pub fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/consumption", get(list_consumption).post(log_consumption))
        .route("/consumption/:id", delete(delete_consumption))
}

#[instrument(skip(state))]
pub async fn list_consumption(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(day): Query<DayQuery>,
) -> Result<Json<Vec<ConsumptionEvent>>, NutritionError> {
    Ok(Json(repo::list_events(&state.db, user_id, day.date).await?))
}

/// POST /consumption { food_id, grams, consumed_on? }
#[instrument(skip(state))]
pub async fn log_consumption(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<LogConsumptionRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<ConsumptionEvent>), NutritionError> {
    if !body.grams.is_finite() || body.grams <= 0.0 {
        warn!(grams = %body.grams, "invalid grams");
        return Err(NutritionError::invalid("grams must be a positive number"));
    }

    if catalog::repo::find_food(&state.db, body.food_id).await?.is_none() {
        return Err(NutritionError::NotFound("Food"));
    }

    let consumed_on = body.consumed_on.unwrap_or_else(dates::today);
    let event = repo::insert_event(&state.db, user_id, body.food_id, body.grams, consumed_on).await?;
    info!(%user_id, event_id = event.id, food_id = event.food_id, "consumption logged");

    let location = format!("/api/v1/consumption/{}", event.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(event)))
}

#[instrument(skip(state))]
pub async fn delete_consumption(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, NutritionError> {
    if !repo::delete_event(&state.db, user_id, id).await? {
        warn!(%user_id, event_id = id, "delete of missing or foreign event");
        return Err(NutritionError::NotFound("Consumption event"));
    }
    info!(%user_id, event_id = id, "consumption deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::User;
    use time::macros::date;

    async fn user(state: &AppState, name: &str) -> uuid::Uuid {
        User::create(&state.db, name, "hash").await.unwrap().id
    }

    fn body(food_id: i64, grams: f64) -> Json<LogConsumptionRequest> {
        Json(LogConsumptionRequest {
            food_id,
            grams,
            consumed_on: Some(date!(2024 - 02 - 29)),
        })
    }

    #[tokio::test]
    async fn log_then_delete() {
        let state = AppState::for_tests().await;
        let alice = user(&state, "alice").await;

        let (status, [(_, location)], Json(event)) =
            log_consumption(State(state.clone()), AuthUser(alice), body(1455, 120.0))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(location, format!("/api/v1/consumption/{}", event.id));
        assert_eq!(event.consumed_on, date!(2024 - 02 - 29));

        let Json(listed) = list_consumption(
            State(state.clone()),
            AuthUser(alice),
            Query(DayQuery { date: Some(date!(2024 - 02 - 29)) }),
        )
        .await
        .unwrap();
        assert_eq!(listed.len(), 1);

        let status = delete_consumption(State(state.clone()), AuthUser(alice), Path(event.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = delete_consumption(State(state), AuthUser(alice), Path(event.id))
            .await
            .unwrap_err();
        assert!(matches!(err, NutritionError::NotFound(_)));
    }

    #[tokio::test]
    async fn consumed_on_defaults_to_today() {
        let state = AppState::for_tests().await;
        let alice = user(&state, "alice").await;
        let (_, _, Json(event)) = log_consumption(
            State(state),
            AuthUser(alice),
            Json(LogConsumptionRequest {
                food_id: 1,
                grams: 10.0,
                consumed_on: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(event.consumed_on, dates::today());
    }

    #[tokio::test]
    async fn rejects_bad_grams_and_unknown_food() {
        let state = AppState::for_tests().await;
        let alice = user(&state, "alice").await;

        for grams in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = log_consumption(State(state.clone()), AuthUser(alice), body(1, grams))
                .await
                .unwrap_err();
            assert!(matches!(err, NutritionError::InvalidInput(_)));
        }

        let err = log_consumption(State(state), AuthUser(alice), body(31_337, 50.0))
            .await
            .unwrap_err();
        assert!(matches!(err, NutritionError::NotFound("Food")));
    }
}
