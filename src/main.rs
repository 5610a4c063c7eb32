use clap::{Parser, Subcommand};
use log::debug;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use recipe_search::{
    render, AuthProvider, HttpRecipeApi, Orchestrator, OrchestratorHandle, Panel, RecipeApi,
    RecipeSummary, RequestState, SearchCriteria, SearchRequest, Session, Settings, StaticAuth,
    UserContext, View,
};

#[derive(Parser)]
#[command(author, version, about = "Search recipes by ingredients, cuisine or name", long_about = None)]
struct Cli {
    /// Base URL of the recipe backend
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Signed-in user id (overrides configuration)
    #[arg(long, global = true, env = "RECIPE_SEARCH_USER")]
    user: Option<String>,

    /// Print raw recipe records as JSON instead of titles
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search recipes by ingredients and cuisine
    Search {
        /// Ingredient to include (repeatable)
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,

        /// Cuisine to filter by
        #[arg(short, long, default_value = "")]
        cuisine: String,
    },
    /// Search recipes by name
    ByName {
        /// Recipe name or part of it
        name: String,
    },
    /// Interactive session
    Shell,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(timeout) = cli.timeout {
        settings.timeout = timeout;
    }
    if cli.user.is_some() {
        settings.user = cli.user;
    }
    debug!("Using settings: {:?}", settings);

    let api = HttpRecipeApi::from_settings(&settings)?;
    let auth = StaticAuth::new(Session::from(settings.user.clone()));

    match cli.command {
        Command::Search {
            ingredients,
            cuisine,
        } => {
            let request = SearchRequest::Criteria(SearchCriteria::new(ingredients, cuisine));
            single_search(&api, &auth.session(), request, cli.json).await?;
        }
        Command::ByName { name } => {
            single_search(&api, &auth.session(), SearchRequest::Name(name), cli.json).await?;
        }
        Command::Shell => run_shell(api, auth).await?,
    }

    Ok(())
}

/// Run one search and print its panel; signed-out sessions never reach the backend
async fn single_search(
    api: &dyn RecipeApi,
    session: &Session,
    request: SearchRequest,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !session.is_signed_in() {
        print!("{}", View::SignIn);
        return Ok(());
    }

    let panel = request.panel();
    let mut orchestrator = Orchestrator::new();
    orchestrator.select_panel(panel);
    match request {
        SearchRequest::Criteria(criteria) => orchestrator.handle_submit(api, criteria).await,
        SearchRequest::Name(name) => orchestrator.handle_recipes_by_name(api, &name).await,
    };
    print_outcome(&orchestrator, session, json, panel)?;

    match orchestrator.state().panel(panel).map(|p| p.request()) {
        Some(RequestState::Failed(message)) => Err(format!("Search failed: {}", message).into()),
        _ => Ok(()),
    }
}

fn print_outcome(
    orchestrator: &Orchestrator,
    session: &Session,
    json: bool,
    panel: Panel,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = orchestrator.state();
    let view = render(state, session);
    if json && matches!(view, View::Tabs(_)) {
        let recipes: &[RecipeSummary] = state.panel(panel).map(|p| p.recipes()).unwrap_or(&[]);
        println!("{}", serde_json::to_string_pretty(recipes)?);
    } else {
        print!("{}", view);
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
enum ShellCommand {
    Search(SearchCriteria),
    Name(String),
    Tab(Panel),
    Profile,
    Back,
    Login(String),
    Logout,
    Show,
    Wait,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match word {
            "search" => {
                // search tomato, onion in Indian
                let (ingredients, cuisine) = match rest.rsplit_once(" in ") {
                    Some((ingredients, cuisine)) => (ingredients, cuisine.trim()),
                    None => (rest, ""),
                };
                let ingredients = ingredients
                    .split(',')
                    .map(str::trim)
                    .filter(|i| !i.is_empty());
                Ok(ShellCommand::Search(SearchCriteria::new(ingredients, cuisine)))
            }
            "name" if !rest.is_empty() => Ok(ShellCommand::Name(rest.to_string())),
            "name" => Err("usage: name <recipe name>".to_string()),
            "tab" => match rest {
                "search" | "attributes" | "1" => Ok(ShellCommand::Tab(Panel::ByAttributes)),
                "add" | "2" => Ok(ShellCommand::Tab(Panel::AddRecipe)),
                "name" | "3" => Ok(ShellCommand::Tab(Panel::ByName)),
                _ => Err("usage: tab search|add|name".to_string()),
            },
            "profile" | "bookmarks" => Ok(ShellCommand::Profile),
            "back" => Ok(ShellCommand::Back),
            "login" if !rest.is_empty() => Ok(ShellCommand::Login(rest.to_string())),
            "login" => Err("usage: login <user>".to_string()),
            "logout" => Ok(ShellCommand::Logout),
            "show" | "" => Ok(ShellCommand::Show),
            "wait" => Ok(ShellCommand::Wait),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(format!("unknown command '{}', try 'help'", other)),
        }
    }
}

const SHELL_HELP: &str = "\
commands:
  search <ingredient>, <ingredient> [in <cuisine>]
  name <recipe name>
  tab search|add|name
  profile | back
  login <user> | logout
  show | wait | help | quit";

async fn run_shell(api: HttpRecipeApi, auth: StaticAuth) -> Result<(), Box<dyn std::error::Error>> {
    let handle = OrchestratorHandle::spawn(Arc::new(api));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", SHELL_HELP);
    print!("{}", render(&handle.snapshot(), &auth.session()));

    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<ShellCommand>() {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            ShellCommand::Search(criteria) => {
                handle.select_panel(Panel::ByAttributes).await?;
                handle.submit(criteria).await?;
            }
            ShellCommand::Name(name) => {
                handle.select_panel(Panel::ByName).await?;
                handle.search_by_name(name).await?;
            }
            ShellCommand::Tab(panel) => handle.select_panel(panel).await?,
            ShellCommand::Profile => handle.bookmarks().await?,
            ShellCommand::Back => handle.close_profile().await?,
            ShellCommand::Login(user) => auth.sign_in(UserContext::new(user)),
            ShellCommand::Logout => auth.sign_out(),
            ShellCommand::Show => {}
            ShellCommand::Wait => {
                handle.wait_idle().await?;
            }
            ShellCommand::Help => {
                println!("{}", SHELL_HELP);
                continue;
            }
            ShellCommand::Quit => break,
        }

        print!("{}", render(&handle.snapshot(), &auth.session()));
    }

    handle.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use recipe_search::SearchError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls; names containing "broken" fail
    #[derive(Default)]
    struct CountingApi {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecipeApi for CountingApi {
        async fn recipes_by_criteria(
            &self,
            _criteria: &SearchCriteria,
        ) -> Result<Vec<RecipeSummary>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![RecipeSummary(json!({"name": "Omelette"}))])
        }

        async fn recipes_by_name(&self, name: &str) -> Result<Vec<RecipeSummary>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if name.contains("broken") {
                return Err(SearchError::StatusError {
                    status: 500,
                    endpoint: "/recipes/getRecipeByName".to_string(),
                });
            }
            Ok(vec![RecipeSummary(json!({"name": "Apple Pie"}))])
        }
    }

    fn signed_in() -> Session {
        Session::SignedIn(UserContext::new("alice"))
    }

    #[tokio::test]
    async fn test_single_search_signed_out_skips_backend() {
        let api = CountingApi::default();
        let request = SearchRequest::Criteria(SearchCriteria::new(["egg"], ""));

        let result = single_search(&api, &Session::SignedOut, request, false).await;
        assert!(result.is_ok());
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_search_success() {
        let api = CountingApi::default();
        let request = SearchRequest::Name("pie".to_string());

        let result = single_search(&api, &signed_in(), request, true).await;
        assert!(result.is_ok());
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_search_failure_is_an_error() {
        let api = CountingApi::default();
        let request = SearchRequest::Name("broken soup".to_string());

        let err = single_search(&api, &signed_in(), request, false)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Search failed"));
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_search_with_cuisine() {
        let command: ShellCommand = "search tomato, onion in Indian".parse().unwrap();
        assert_eq!(
            command,
            ShellCommand::Search(SearchCriteria::new(["onion", "tomato"], "Indian"))
        );
    }

    #[test]
    fn test_parse_search_without_cuisine() {
        let command: ShellCommand = "search  egg ,, flour ".parse().unwrap();
        assert_eq!(
            command,
            ShellCommand::Search(SearchCriteria::new(["egg", "flour"], ""))
        );
    }

    #[test]
    fn test_parse_name_and_tabs() {
        assert_eq!(
            "name paneer tikka".parse::<ShellCommand>().unwrap(),
            ShellCommand::Name("paneer tikka".to_string())
        );
        assert!("name".parse::<ShellCommand>().is_err());
        assert_eq!(
            "tab add".parse::<ShellCommand>().unwrap(),
            ShellCommand::Tab(Panel::AddRecipe)
        );
        assert!("tab nowhere".parse::<ShellCommand>().is_err());
    }

    #[test]
    fn test_parse_misc_commands() {
        assert_eq!("".parse::<ShellCommand>().unwrap(), ShellCommand::Show);
        assert_eq!("bookmarks".parse::<ShellCommand>().unwrap(), ShellCommand::Profile);
        assert_eq!(
            "login alice".parse::<ShellCommand>().unwrap(),
            ShellCommand::Login("alice".to_string())
        );
        assert_eq!("exit".parse::<ShellCommand>().unwrap(), ShellCommand::Quit);
        assert!("dance".parse::<ShellCommand>().is_err());
    }

    #[test]
    fn test_cli_parses_repeated_ingredients() {
        let cli = Cli::parse_from([
            "recipe-search",
            "--user",
            "alice",
            "search",
            "-i",
            "egg",
            "--ingredient",
            "flour",
            "--cuisine",
            "French",
        ]);
        assert_eq!(cli.user.as_deref(), Some("alice"));
        match cli.command {
            Command::Search {
                ingredients,
                cuisine,
            } => {
                assert_eq!(ingredients, vec!["egg", "flour"]);
                assert_eq!(cuisine, "French");
            }
            _ => panic!("Expected search command"),
        }
    }
}
