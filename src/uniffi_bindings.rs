//! UniFFI bindings for recipe-search
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! It wraps the async Rust API with synchronous functions that manage their own tokio runtime.

use std::fmt;
use std::time::Duration;

use crate::{HttpRecipeApi, RecipeApi, RecipeSummary, SearchCriteria, SearchError, Settings};

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible recipe record
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipe {
    /// Display title (empty string if the record has none)
    pub title: String,
    /// The record exactly as the backend returned it, as JSON
    pub json: String,
}

impl From<RecipeSummary> for FfiRecipe {
    fn from(recipe: RecipeSummary) -> Self {
        FfiRecipe {
            title: recipe.title().unwrap_or_default().to_string(),
            json: recipe.as_value().to_string(),
        }
    }
}

/// FFI-compatible error type
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiSearchError {
    /// The backend could not be reached or answered with an error
    NetworkError { message: String },
    /// Client or configuration error
    ConfigError { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiSearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiSearchError::NetworkError { message } => write!(f, "Network error: {}", message),
            FfiSearchError::ConfigError { message } => write!(f, "Config error: {}", message),
            FfiSearchError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiSearchError {}

impl From<SearchError> for FfiSearchError {
    fn from(err: SearchError) -> Self {
        if err.is_network_or_server() {
            FfiSearchError::NetworkError {
                message: err.to_string(),
            }
        } else {
            FfiSearchError::ConfigError {
                message: err.to_string(),
            }
        }
    }
}

/// Connection settings for FFI callers
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiSearchConfig {
    /// Backend base URL (uses configuration file / environment if not specified)
    pub base_url: Option<String>,
    /// Optional timeout in seconds (uses default if not specified)
    pub timeout_seconds: Option<u64>,
}

impl FfiSearchConfig {
    fn client(&self) -> Result<HttpRecipeApi, SearchError> {
        let mut settings = if self.base_url.is_some() {
            Settings::default()
        } else {
            Settings::load()?
        };
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout = timeout;
        }
        HttpRecipeApi::builder()
            .base_url(settings.base_url)
            .timeout(Duration::from_secs(settings.timeout))
            .user_agent(settings.user_agent)
            .build()
    }
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiSearchError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiSearchError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

/// Search recipes by ingredients and cuisine
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn search_recipes(
    config: Option<FfiSearchConfig>,
    ingredients: Vec<String>,
    cuisine: String,
) -> Result<Vec<FfiRecipe>, FfiSearchError> {
    let api = config.unwrap_or_default().client()?;
    let criteria = SearchCriteria::new(ingredients, cuisine);
    let rt = create_runtime()?;
    let recipes = rt.block_on(async { api.recipes_by_criteria(&criteria).await })?;
    Ok(recipes.into_iter().map(FfiRecipe::from).collect())
}

/// Search recipes by name
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn search_recipes_by_name(
    config: Option<FfiSearchConfig>,
    name: String,
) -> Result<Vec<FfiRecipe>, FfiSearchError> {
    let api = config.unwrap_or_default().client()?;
    let rt = create_runtime()?;
    let recipes = rt.block_on(async { api.recipes_by_name(&name).await })?;
    Ok(recipes.into_iter().map(FfiRecipe::from).collect())
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
