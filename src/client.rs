//! Client side of the recipe flow: pantry + preferences in, view state out.
//!
//! [`Session`] owns everything the UI needs to render. A submission is split
//! into `begin_submit` (view becomes `Loading`) and `finish`, so a renderer
//! can draw the loading state while the request is in flight; `submit` runs
//! both around the HTTP call.

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    models::{ErrorBody, GenerationRequest, GenerationResponse, RecipeRecord},
    pantry::PantryState,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

pub const EMPTY_PANTRY_MESSAGE: &str = "Please add at least one ingredient to your pantry to generate a recipe.";
pub const NO_RECIPES_MESSAGE: &str =
    "The AI could not generate any recipes with your inputs. Please try different ingredients or preferences.";
pub const WELCOME_MESSAGE: &str = "Add ingredients to your pantry to get started!";
const UNKNOWN_SERVER_ERROR: &str = "Unknown server error.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Please add at least one ingredient to your pantry to generate a recipe.")]
    EmptyPantry,
    #[error("{0}")]
    Server(String),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

pub struct RecipeClient {
    http: Client,
    base_url: String,
}

impl RecipeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self { http: Client::new(), base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ClientError> {
        let response = self.http
            .post(format!("{}/api/generate-recipe", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = server_error_message(status, &text);
            warn!("Recipe request failed with status {}: {}", status, message);
            return Err(ClientError::Server(message));
        }

        Ok(response.json::<GenerationResponse>().await?)
    }
}

/// Message for a non-2xx reply: the body's `error` string, the status when the
/// JSON body has none, or a generic message when the body isn't JSON.
fn server_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => serde_json::from_value::<ErrorBody>(value)
            .ok()
            .map(|b| b.error)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16())),
        Err(_) => UNKNOWN_SERVER_ERROR.to_string(),
    }
}

impl Default for RecipeClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Optional preferences; blank values are sent as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preferences {
    pub cuisine: Option<String>,
    pub meal_type: Option<String>,
    pub course: Option<String>,
    pub difficulty: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl Preferences {
    fn to_request(&self, pantry: &PantryState) -> GenerationRequest {
        GenerationRequest {
            ingredients: pantry.items().to_vec(),
            cuisine: non_blank(&self.cuisine),
            meal_type: non_blank(&self.meal_type),
            course: non_blank(&self.course),
            difficulty: non_blank(&self.difficulty),
        }
    }
}

/// Summary shown for one recipe in the result list.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeCard {
    pub recipe: RecipeRecord,
}

impl RecipeCard {
    pub fn id(&self) -> &str {
        &self.recipe.id
    }

    pub fn title(&self) -> &str {
        self.recipe.name.as_deref().unwrap_or_default()
    }

    /// Ingredients as a single comma-separated line.
    pub fn ingredient_summary(&self) -> String {
        if self.recipe.ingredients.is_empty() {
            "Not specified.".to_string()
        } else {
            self.recipe.ingredients.join(", ")
        }
    }

    pub fn detail(&self) -> RecipeDetail {
        let r = &self.recipe;
        let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
        RecipeDetail {
            id: r.id.clone(),
            name: self.title().to_string(),
            cuisine: or_na(&r.cuisine),
            course: or_na(&r.course),
            diet: or_na(&r.diet),
            prep_time: or_na(&r.prep_time),
            cook_time: or_na(&r.cook_time),
            difficulty: or_na(&r.difficulty),
            servings: or_na(&r.servings),
            ingredients: r.ingredients.clone(),
            steps: r.instructions.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect(),
        }
    }
}

/// Everything the detail overlay shows for one recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDetail {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub course: String,
    pub diet: String,
    pub prep_time: String,
    pub cook_time: String,
    pub difficulty: String,
    pub servings: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Info(String),
    Loading,
    Results(Vec<RecipeCard>),
    Error(String),
}

/// Keeps only records that can be shown; the rest are skipped quietly.
pub fn displayable_cards(records: Vec<RecipeRecord>) -> Vec<RecipeCard> {
    records
        .into_iter()
        .filter_map(|recipe| {
            if recipe.is_displayable() {
                Some(RecipeCard { recipe })
            } else {
                warn!("Skipping an invalid recipe object from the AI response (id: {}).", recipe.id);
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Session {
    pub pantry: PantryState,
    pub preferences: Preferences,
    view: View,
    detail: Option<RecipeDetail>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            pantry: PantryState::new(),
            preferences: Preferences::default(),
            view: View::Info(WELCOME_MESSAGE.to_string()),
            detail: None,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.view, View::Loading)
    }

    pub fn detail(&self) -> Option<&RecipeDetail> {
        self.detail.as_ref()
    }

    pub fn cards(&self) -> &[RecipeCard] {
        match &self.view {
            View::Results(cards) => cards.as_slice(),
            _ => &[],
        }
    }

    /// Packages the pantry and preferences and asks the server for recipes.
    pub async fn submit(&mut self, client: &RecipeClient) -> &View {
        match self.begin_submit() {
            Some(request) => {
                let result = client.generate(&request).await;
                self.finish(result)
            }
            None => &self.view,
        }
    }

    /// Starts a submission. Returns the request to send and switches the view
    /// to `Loading`, or returns `None` with a validation error for an empty pantry.
    pub fn begin_submit(&mut self) -> Option<GenerationRequest> {
        self.detail = None;
        if self.pantry.is_empty() {
            self.view = View::Error(ClientError::EmptyPantry.to_string());
            return None;
        }

        let request = self.preferences.to_request(&self.pantry);
        self.view = View::Loading;
        info!("Requesting recipes for {} ingredients", request.ingredients.len());
        Some(request)
    }

    /// Applies the outcome of a request started with `begin_submit`.
    pub fn finish(&mut self, result: Result<GenerationResponse, ClientError>) -> &View {
        self.view = match result {
            Ok(response) => {
                let cards = displayable_cards(response.results);
                if cards.is_empty() {
                    View::Info(NO_RECIPES_MESSAGE.to_string())
                } else {
                    View::Results(cards)
                }
            }
            Err(e) => {
                warn!("Error generating recipe: {}", e);
                View::Error(format!("Failed to generate recipe: {}. Please try again.", e))
            }
        };
        &self.view
    }

    /// Opens the detail overlay for a displayed card. Returns `false` for unknown ids.
    pub fn open_detail(&mut self, recipe_id: &str) -> bool {
        let detail = self.cards().iter().find(|c| c.id() == recipe_id).map(RecipeCard::detail);
        let found = detail.is_some();
        if found {
            self.detail = detail;
        }
        found
    }

    /// Dismisses the overlay (close button or click outside).
    pub fn close_detail(&mut self) {
        self.detail = None;
    }
}
