use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum NutritionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl NutritionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl IntoResponse for NutritionError {
    fn into_response(self) -> Response {
        let status = match self {
            NutritionError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            NutritionError::NotFound { .. } => StatusCode::NOT_FOUND,
            NutritionError::Store { .. } => {
                error!(error = %self, "store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let bad = NutritionError::invalid("grams must be positive").into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let missing = NutritionError::NotFound("Food").into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let store = NutritionError::from(sqlx::Error::RowNotFound).into_response();
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
