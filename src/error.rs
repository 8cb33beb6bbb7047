use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{generator::GeneratorError, models::ErrorBody};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please provide at least one ingredient.")]
    MissingIngredients,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Failed to generate recipes. Server error: {0}")]
    Generation(#[from] GeneratorError),

    #[error("Could not retrieve a valid recipe array from AI response.")]
    UnparseableOutput,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingIngredients | AppError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AppError::Generation(_) | AppError::UnparseableOutput => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
