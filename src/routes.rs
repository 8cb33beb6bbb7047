use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde_json::Value;
use std::{path::Path, sync::Arc};
use tower_http::{cors::{Any, CorsLayer}, services::ServeDir};

use crate::{
    error::AppError,
    generator::RecipeGenerator,
    models::{GenerationRequest, GenerationResponse},
    normalize::normalize_model_output,
    prompt::build_prompt,
};

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn RecipeGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn RecipeGenerator>) -> Self {
        Self { generator }
    }
}

/// API routes only.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-recipe", post(generate_recipe))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

/// API routes plus static assets served from `static_dir` for every other path.
pub fn app(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    api_router(state).fallback_service(ServeDir::new(static_dir))
}

fn optional_text(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validates the loosely-typed JSON body into a [`GenerationRequest`].
pub fn parse_request(body: &Value) -> Result<GenerationRequest, AppError> {
    let ingredients = match body.get("ingredients") {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => return Err(AppError::MissingIngredients),
    };

    Ok(GenerationRequest {
        ingredients,
        cuisine: optional_text(body, "cuisine"),
        meal_type: optional_text(body, "mealType"),
        course: optional_text(body, "course"),
        difficulty: optional_text(body, "difficulty"),
    })
}

pub async fn generate_recipe(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let Json(body) = body.map_err(|e| AppError::MalformedBody(e.body_text()))?;
    let request = parse_request(&body)?;

    tracing::info!("🍳 Generating recipes for: {} (model: {})", request.ingredients.join(", "), state.generator.model_name());
    let prompt = build_prompt(&request);

    let raw = state.generator.generate(&prompt).await.map_err(|e| {
        tracing::error!("❌ Error in /api/generate-recipe: {}", e);
        AppError::from(e)
    })?;

    let recipes = normalize_model_output(&raw).ok_or_else(|| {
        tracing::error!("❌ Could not coerce model output into a recipe array ({} chars)", raw.len());
        AppError::UnparseableOutput
    })?;

    tracing::info!("✅ Generated {} recipes", recipes.len());
    Ok(Json(GenerationResponse::new(recipes)))
}
