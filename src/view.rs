//! Which screen to show for a given state and session.

use std::fmt;

use crate::auth::{Session, UserContext};
use crate::model::{Panel, RecipeSummary};
use crate::orchestrator::{PanelState, RequestState, ViewState};

#[derive(Debug, Clone, PartialEq)]
pub enum View<'a> {
    /// Signed out: only the sign-in affordance
    SignIn,
    Profile { user: &'a UserContext },
    Tabs(TabsView<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabsView<'a> {
    pub active: Panel,
    pub by_attributes: PanelView<'a>,
    pub by_name: PanelView<'a>,
    pub add_recipe: AddRecipeView,
    pub user: &'a UserContext,
}

/// The add-recipe tab; it carries no orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddRecipeView;

/// Content shown next to a search form
#[derive(Debug, Clone, PartialEq)]
pub enum PanelView<'a> {
    Loading,
    Results(&'a [RecipeSummary]),
    Failed {
        message: &'a str,
        previous: &'a [RecipeSummary],
    },
}

impl<'a> PanelView<'a> {
    fn from_state(panel: &'a PanelState) -> Self {
        match panel.request() {
            RequestState::Pending => PanelView::Loading,
            RequestState::Failed(message) => PanelView::Failed {
                message,
                previous: panel.recipes(),
            },
            RequestState::Idle | RequestState::Ready => PanelView::Results(panel.recipes()),
        }
    }
}

/// Select the screen for `state`; has no side effects
pub fn render<'a>(state: &'a ViewState, session: &'a Session) -> View<'a> {
    let Some(user) = session.user() else {
        return View::SignIn;
    };

    if state.is_profile_view() {
        return View::Profile { user };
    }

    let panel_view = move |panel: Panel| match state.panel(panel) {
        Some(panel_state) => PanelView::from_state(panel_state),
        None => PanelView::Results(&[]),
    };

    View::Tabs(TabsView {
        active: state.active_panel(),
        by_attributes: panel_view(Panel::ByAttributes),
        by_name: panel_view(Panel::ByName),
        add_recipe: AddRecipeView,
        user,
    })
}

impl fmt::Display for PanelView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelView::Loading => writeln!(f, "  Loading recipes..."),
            PanelView::Results(recipes) => write_recipes(f, recipes),
            PanelView::Failed { message, previous } => {
                writeln!(f, "  Search failed: {}", message)?;
                write_recipes(f, previous)
            }
        }
    }
}

impl fmt::Display for AddRecipeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Add a recipe through the web form.")
    }
}

fn write_recipes(f: &mut fmt::Formatter<'_>, recipes: &[RecipeSummary]) -> fmt::Result {
    if recipes.is_empty() {
        return writeln!(f, "  No recipes.");
    }
    for (i, recipe) in recipes.iter().enumerate() {
        writeln!(f, "  {:>3}. {}", i + 1, recipe)?;
    }
    Ok(())
}

impl fmt::Display for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::SignIn => writeln!(f, "Please sign in to search recipes."),
            View::Profile { user } => {
                writeln!(f, "Profile: {}", user.label())?;
                writeln!(f, "  (type 'back' to return to search)")
            }
            View::Tabs(tabs) => {
                let labels: Vec<String> = Panel::ALL
                    .iter()
                    .map(|panel| {
                        if *panel == tabs.active {
                            format!("[{}]", panel.label())
                        } else {
                            panel.label().to_string()
                        }
                    })
                    .collect();
                writeln!(f, "{}    ({})", labels.join(" | "), tabs.user.label())?;
                match tabs.active {
                    Panel::ByAttributes => write!(f, "{}", tabs.by_attributes),
                    Panel::AddRecipe => write!(f, "{}", tabs.add_recipe),
                    Panel::ByName => write!(f, "{}", tabs.by_name),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SearchCriteria;
    use crate::orchestrator::{Orchestrator, SearchCompletion};
    use crate::SearchError;
    use serde_json::json;

    fn signed_in() -> Session {
        Session::SignedIn(UserContext::new("alice"))
    }

    #[test]
    fn test_signed_out_renders_only_sign_in() {
        let mut orchestrator = Orchestrator::new();
        let pending = orchestrator.begin_submit(SearchCriteria::new(["egg"], ""));
        orchestrator.complete(SearchCompletion {
            panel: pending.panel(),
            token: pending.token,
            result: Ok(vec![RecipeSummary(json!({"name": "Omelette"}))]),
        });

        let view = render(orchestrator.state(), &Session::SignedOut);
        assert_eq!(view, View::SignIn);
        assert!(!view.to_string().contains("Omelette"));
    }

    #[test]
    fn test_profile_view_hides_tabs() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.handle_bookmarks();
        let session = signed_in();

        let view = render(orchestrator.state(), &session);
        assert!(matches!(view, View::Profile { user } if user.user_id == "alice"));
    }

    #[test]
    fn test_loading_only_on_pending_panel() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.begin_search_by_name("pie");
        let session = signed_in();

        match render(orchestrator.state(), &session) {
            View::Tabs(tabs) => {
                assert_eq!(tabs.by_name, PanelView::Loading);
                assert_eq!(tabs.by_attributes, PanelView::Results(&[]));
                assert_eq!(tabs.active, Panel::ByAttributes);
            }
            other => panic!("Expected tabs, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_panel_keeps_previous_results() {
        let mut orchestrator = Orchestrator::new();
        let first = orchestrator.begin_search_by_name("pie");
        orchestrator.complete(SearchCompletion {
            panel: first.panel(),
            token: first.token,
            result: Ok(vec![RecipeSummary(json!({"name": "Apple Pie"}))]),
        });
        let second = orchestrator.begin_search_by_name("cake");
        orchestrator.complete(SearchCompletion {
            panel: second.panel(),
            token: second.token,
            result: Err(SearchError::DecodeError("oops".to_string())),
        });
        orchestrator.select_panel(Panel::ByName);
        let session = signed_in();

        let view = render(orchestrator.state(), &session);
        let text = view.to_string();
        assert!(text.contains("Search failed"));
        assert!(text.contains("Apple Pie"));
        assert!(text.contains("[Search Recipe By Name]"));
    }

    #[test]
    fn test_add_recipe_tab_text() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.select_panel(Panel::AddRecipe);
        let session = signed_in();

        let text = render(orchestrator.state(), &session).to_string();
        assert!(text.contains("[Add Recipe]"));
        assert!(text.contains("(alice)"));
    }

    #[test]
    fn test_tabs_carry_add_recipe_panel() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.begin_submit(SearchCriteria::new(["egg"], ""));
        orchestrator.select_panel(Panel::AddRecipe);
        let session = signed_in();

        match render(orchestrator.state(), &session) {
            View::Tabs(tabs) => {
                assert_eq!(tabs.active, Panel::AddRecipe);
                assert_eq!(tabs.add_recipe, AddRecipeView);
                // A pending search elsewhere does not leak into the add tab
                assert_eq!(tabs.by_attributes, PanelView::Loading);
                let text = View::Tabs(tabs).to_string();
                assert!(text.contains("Add a recipe through the web form."));
                assert!(!text.contains("Loading recipes"));
            }
            other => panic!("Expected tabs, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_results_text() {
        let orchestrator = Orchestrator::new();
        let session = signed_in();
        let text = render(orchestrator.state(), &session).to_string();
        assert!(text.contains("No recipes."));
    }
}
