use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Criteria for the search-by-attributes panel.
///
/// Ingredients form a set: duplicates collapse and order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub cuisine: String,
    pub ingredients: BTreeSet<String>,
}

impl SearchCriteria {
    pub fn new<I, S>(ingredients: I, cuisine: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cuisine: cuisine.into(),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
        }
    }

    /// Ingredients in the order they are sent to the backend
    pub fn ingredient_list(&self) -> Vec<&str> {
        self.ingredients.iter().map(String::as_str).collect()
    }
}

/// A recipe record as returned by the backend.
///
/// The shape is owned by the backend, so the record is kept verbatim and
/// handed to the renderer unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeSummary(pub Value);

const TITLE_FIELDS: [&str; 4] = ["TranslatedRecipeName", "RecipeName", "name", "title"];

impl RecipeSummary {
    /// Best-effort display title taken from the usual name fields
    pub fn title(&self) -> Option<&str> {
        TITLE_FIELDS
            .iter()
            .find_map(|field| self.0.get(field).and_then(Value::as_str))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RecipeSummary {
    fn from(value: Value) -> Self {
        RecipeSummary(value)
    }
}

impl fmt::Display for RecipeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.title() {
            Some(title) => write!(f, "{}", title),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Body of both search endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<RecipeSummary>,
}

/// The three tabbed sub-views of the main screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Panel {
    #[default]
    ByAttributes,
    AddRecipe,
    ByName,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::ByAttributes, Panel::AddRecipe, Panel::ByName];

    pub fn label(&self) -> &'static str {
        match self {
            Panel::ByAttributes => "Search Recipe",
            Panel::AddRecipe => "Add Recipe",
            Panel::ByName => "Search Recipe By Name",
        }
    }
}
