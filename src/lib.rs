pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod runtime;
pub mod uniffi_bindings;
pub mod view;

// Re-export main types for convenience
pub use api::{HttpRecipeApi, HttpRecipeApiBuilder, RecipeApi};
pub use auth::{AuthProvider, Session, StaticAuth, UserContext};
pub use config::Settings;
pub use error::SearchError;
pub use model::{Panel, RecipeSummary, SearchCriteria};
pub use orchestrator::{
    Orchestrator, PanelState, PendingSearch, RequestState, RequestToken, SearchCompletion,
    SearchRequest, ViewState,
};
pub use runtime::OrchestratorHandle;
pub use view::{render, AddRecipeView, PanelView, View};

/// Search recipes by ingredients and cuisine against the configured backend.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), recipe_search::SearchError> {
/// let recipes = recipe_search::search_recipes(["tomato", "onion"], "Indian").await?;
/// for recipe in &recipes {
///     println!("{}", recipe);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_recipes<I, S>(
    ingredients: I,
    cuisine: &str,
) -> Result<Vec<RecipeSummary>, SearchError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let settings = Settings::load()?;
    let api = HttpRecipeApi::from_settings(&settings)?;
    api.recipes_by_criteria(&SearchCriteria::new(ingredients, cuisine))
        .await
}

/// Search recipes by name against the configured backend.
pub async fn search_recipes_by_name(name: &str) -> Result<Vec<RecipeSummary>, SearchError> {
    let settings = Settings::load()?;
    let api = HttpRecipeApi::from_settings(&settings)?;
    api.recipes_by_name(name).await
}
