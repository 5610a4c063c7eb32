use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use crate::config::Settings;
use crate::model::{RecipeListResponse, RecipeSummary, SearchCriteria};
use crate::SearchError;

pub const RECIPES_PATH: &str = "/recipes";
pub const RECIPES_BY_NAME_PATH: &str = "/recipes/getRecipeByName";

/// The backend calls the orchestrator depends on
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// Recipes matching a set of ingredients and a cuisine
    async fn recipes_by_criteria(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<RecipeSummary>, SearchError>;

    /// Recipes matching a free-text name
    async fn recipes_by_name(&self, name: &str) -> Result<Vec<RecipeSummary>, SearchError>;
}

/// `RecipeApi` over HTTP
#[derive(Debug, Clone)]
pub struct HttpRecipeApi {
    client: Client,
    base_url: String,
}

impl HttpRecipeApi {
    pub fn builder() -> HttpRecipeApiBuilder {
        HttpRecipeApiBuilder::default()
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, SearchError> {
        Self::builder()
            .base_url(&settings.base_url)
            .timeout(settings.timeout())
            .user_agent(&settings.user_agent)
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_recipes(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<RecipeSummary>, SearchError> {
        let url = self.endpoint(path);
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::StatusError {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: RecipeListResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::DecodeError(e.to_string()))?;
        debug!("{} returned {} recipes", path, parsed.recipes.len());
        Ok(parsed.recipes)
    }
}

#[async_trait]
impl RecipeApi for HttpRecipeApi {
    async fn recipes_by_criteria(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<RecipeSummary>, SearchError> {
        // Arrays go out bracket style, one pair per element
        let mut query: Vec<(&str, &str)> = criteria
            .ingredients
            .iter()
            .map(|ingredient| ("CleanedIngredients[]", ingredient.as_str()))
            .collect();
        query.push(("Cuisine", criteria.cuisine.as_str()));

        self.get_recipes(RECIPES_PATH, &query).await
    }

    async fn recipes_by_name(&self, name: &str) -> Result<Vec<RecipeSummary>, SearchError> {
        self.get_recipes(RECIPES_BY_NAME_PATH, &[("recipeName", name)])
            .await
    }
}

/// Builder for [`HttpRecipeApi`]
#[derive(Debug, Default)]
pub struct HttpRecipeApiBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpRecipeApiBuilder {
    /// Set the backend base URL
    ///
    /// # Example
    /// ```
    /// use recipe_search::HttpRecipeApi;
    ///
    /// let api = HttpRecipeApi::builder()
    ///     .base_url("http://localhost:5000/")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(api.base_url(), "http://localhost:5000");
    /// ```
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set a timeout for HTTP requests
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns `SearchError::BuilderError` if no base URL was set or it is not
    /// an http(s) URL, and `SearchError::RequestError` if the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<HttpRecipeApi, SearchError> {
        let base_url = self
            .base_url
            .ok_or_else(|| SearchError::BuilderError("No base URL specified".to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(SearchError::BuilderError(format!(
                "Base URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let settings = Settings::default();
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or_else(|| settings.timeout()))
            .user_agent(self.user_agent.unwrap_or(settings.user_agent))
            .build()?;

        Ok(HttpRecipeApi { client, base_url })
    }
}
