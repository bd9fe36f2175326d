//! Per-event nutrient pivot and daily totals against DRI targets.

use crate::state::AppState;
use axum::Router;

pub mod aggregate;
mod dto;
pub mod handlers;
pub mod pivot;

pub fn router() -> Router<AppState> {
    handlers::totals_routes()
}
