//! State and handlers of the root view.
//!
//! Every handler is split in two halves: a synchronous `begin_*` that records
//! the submission and marks the panel pending, and [`Orchestrator::complete`]
//! which applies the backend response. The network call in between
//! ([`PendingSearch::run`]) does not borrow the orchestrator, so several
//! searches can be in flight while state stays single-owner.

use log::{debug, error, info};

use crate::api::RecipeApi;
use crate::model::{Panel, RecipeSummary, SearchCriteria};
use crate::SearchError;

/// Sequence number of a search issued from one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Lifecycle of the latest search of a panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Ready,
    Failed(String),
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }
}

/// One search panel: its request status and its last successful results
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    request: RequestState,
    recipes: Vec<RecipeSummary>,
    issued: u64,
}

impl PanelState {
    pub fn request(&self) -> &RequestState {
        &self.request
    }

    /// Results of the last successful search; kept across failures
    pub fn recipes(&self) -> &[RecipeSummary] {
        &self.recipes
    }

    /// Token of the most recently issued search, if any
    pub fn latest_token(&self) -> Option<RequestToken> {
        (self.issued > 0).then_some(RequestToken(self.issued))
    }

    fn begin(&mut self) -> RequestToken {
        self.issued += 1;
        self.request = RequestState::Pending;
        RequestToken(self.issued)
    }

    /// Returns false when `token` has been superseded by a newer search
    fn finish(&mut self, token: RequestToken, result: Result<Vec<RecipeSummary>, String>) -> bool {
        if token.0 != self.issued {
            return false;
        }
        match result {
            Ok(recipes) => {
                self.recipes = recipes;
                self.request = RequestState::Ready;
            }
            Err(message) => self.request = RequestState::Failed(message),
        }
        true
    }
}

/// Everything the root view renders from
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    by_attributes: PanelState,
    by_name: PanelState,
    is_profile_view: bool,
    active_panel: Panel,
    criteria: SearchCriteria,
    recipe_name: String,
}

impl ViewState {
    pub fn recipe_list(&self) -> &[RecipeSummary] {
        self.by_attributes.recipes()
    }

    pub fn recipe_by_name_list(&self) -> &[RecipeSummary] {
        self.by_name.recipes()
    }

    /// True while any search is pending
    pub fn is_loading(&self) -> bool {
        self.by_attributes.request.is_pending() || self.by_name.request.is_pending()
    }

    pub fn is_profile_view(&self) -> bool {
        self.is_profile_view
    }

    pub fn active_panel(&self) -> Panel {
        self.active_panel
    }

    /// Criteria of the latest attribute search
    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn cuisine(&self) -> &str {
        &self.criteria.cuisine
    }

    pub fn recipe_name(&self) -> &str {
        &self.recipe_name
    }

    /// State of a search panel; `None` for the add-recipe panel
    pub fn panel(&self, panel: Panel) -> Option<&PanelState> {
        match panel {
            Panel::ByAttributes => Some(&self.by_attributes),
            Panel::ByName => Some(&self.by_name),
            Panel::AddRecipe => None,
        }
    }

    fn panel_mut(&mut self, panel: Panel) -> Option<&mut PanelState> {
        match panel {
            Panel::ByAttributes => Some(&mut self.by_attributes),
            Panel::ByName => Some(&mut self.by_name),
            Panel::AddRecipe => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRequest {
    Criteria(SearchCriteria),
    Name(String),
}

impl SearchRequest {
    pub fn panel(&self) -> Panel {
        match self {
            SearchRequest::Criteria(_) => Panel::ByAttributes,
            SearchRequest::Name(_) => Panel::ByName,
        }
    }
}

/// A search that has been recorded but not yet sent
#[derive(Debug, Clone)]
pub struct PendingSearch {
    pub token: RequestToken,
    pub request: SearchRequest,
}

impl PendingSearch {
    pub fn panel(&self) -> Panel {
        self.request.panel()
    }

    /// Perform the backend call
    pub async fn run(self, api: &dyn RecipeApi) -> SearchCompletion {
        let panel = self.panel();
        let result = match &self.request {
            SearchRequest::Criteria(criteria) => api.recipes_by_criteria(criteria).await,
            SearchRequest::Name(name) => api.recipes_by_name(name).await,
        };
        SearchCompletion {
            panel,
            token: self.token,
            result,
        }
    }
}

/// Outcome of a [`PendingSearch`], to be fed back into [`Orchestrator::complete`]
#[derive(Debug)]
pub struct SearchCompletion {
    pub panel: Panel,
    pub token: RequestToken,
    pub result: Result<Vec<RecipeSummary>, SearchError>,
}

/// Owner of the [`ViewState`] of one session
#[derive(Debug, Default)]
pub struct Orchestrator {
    state: ViewState,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Navigation asked for the profile/bookmarks view
    pub fn handle_bookmarks(&mut self) {
        self.state.is_profile_view = true;
    }

    /// The profile view asked to go back to the main view
    pub fn handle_profile_view(&mut self) {
        self.state.is_profile_view = false;
    }

    pub fn select_panel(&mut self, panel: Panel) {
        self.state.active_panel = panel;
    }

    /// Record an attribute search and mark its panel pending
    pub fn begin_submit(&mut self, criteria: SearchCriteria) -> PendingSearch {
        self.state.criteria = criteria.clone();
        let token = self.state.by_attributes.begin();
        debug!(
            "Attribute search #{} issued: {:?} / '{}'",
            token.0,
            criteria.ingredient_list(),
            criteria.cuisine
        );
        PendingSearch {
            token,
            request: SearchRequest::Criteria(criteria),
        }
    }

    /// Record a name search and mark its panel pending
    pub fn begin_search_by_name(&mut self, name: impl Into<String>) -> PendingSearch {
        let name = name.into();
        self.state.recipe_name = name.clone();
        let token = self.state.by_name.begin();
        debug!("Name search #{} issued: '{}'", token.0, name);
        PendingSearch {
            token,
            request: SearchRequest::Name(name),
        }
    }

    /// Apply a finished search.
    ///
    /// Returns false if the completion was stale and has been discarded.
    pub fn complete(&mut self, completion: SearchCompletion) -> bool {
        let SearchCompletion {
            panel,
            token,
            result,
        } = completion;

        let result = match result {
            Ok(recipes) => Ok(recipes),
            Err(e) => {
                error!("{} search #{} failed: {}", panel.label(), token.0, e);
                Err(e.to_string())
            }
        };

        let Some(state) = self.state.panel_mut(panel) else {
            debug!("Ignoring completion for panel without searches: {:?}", panel);
            return false;
        };

        let count = result.as_ref().map(Vec::len).ok();
        if !state.finish(token, result) {
            debug!(
                "Discarding stale {} result #{} (latest is #{})",
                panel.label(),
                token.0,
                state.issued
            );
            return false;
        }

        if let Some(count) = count {
            info!("{} search #{} returned {} recipes", panel.label(), token.0, count);
        }
        true
    }

    /// Attribute search: record, fetch, apply
    pub async fn handle_submit(&mut self, api: &dyn RecipeApi, criteria: SearchCriteria) -> bool {
        let pending = self.begin_submit(criteria);
        let completion = pending.run(api).await;
        self.complete(completion)
    }

    /// Name search: record, fetch, apply
    pub async fn handle_recipes_by_name(&mut self, api: &dyn RecipeApi, name: &str) -> bool {
        let pending = self.begin_search_by_name(name);
        let completion = pending.run(api).await;
        self.complete(completion)
    }
}
