//! Event loop that owns an [`Orchestrator`] for the lifetime of a session.
//!
//! User actions and finished fetches arrive on one channel and are applied in
//! order by a single task. Fetches run as separate tasks and never touch the
//! state directly. Every processed event publishes a fresh [`ViewState`]
//! snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::api::RecipeApi;
use crate::model::{Panel, SearchCriteria};
use crate::orchestrator::{Orchestrator, PendingSearch, RequestToken, SearchCompletion, ViewState};
use crate::SearchError;

enum Event {
    Bookmarks(oneshot::Sender<()>),
    CloseProfile(oneshot::Sender<()>),
    SelectPanel(Panel, oneshot::Sender<()>),
    Submit(SearchCriteria, oneshot::Sender<RequestToken>),
    SearchByName(String, oneshot::Sender<RequestToken>),
    Completed(SearchCompletion),
    Shutdown,
}

/// Handle to a running orchestrator loop
pub struct OrchestratorHandle {
    events: mpsc::UnboundedSender<Event>,
    snapshots: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl OrchestratorHandle {
    /// Start the loop on the current tokio runtime
    pub fn spawn(api: Arc<dyn RecipeApi>) -> Self {
        let (events, receiver) = mpsc::unbounded_channel();
        let (publisher, snapshots) = watch::channel(ViewState::default());
        let task = tokio::spawn(run_loop(api, events.downgrade(), receiver, publisher));

        Self {
            events,
            snapshots,
            task,
        }
    }

    fn send(&self, event: Event) -> Result<(), SearchError> {
        self.events.send(event).map_err(|_| SearchError::Closed)
    }

    async fn request<T>(
        &self,
        event: impl FnOnce(oneshot::Sender<T>) -> Event,
    ) -> Result<T, SearchError> {
        let (reply, response) = oneshot::channel();
        self.send(event(reply))?;
        response.await.map_err(|_| SearchError::Closed)
    }

    /// Switch to the profile view
    pub async fn bookmarks(&self) -> Result<(), SearchError> {
        self.request(Event::Bookmarks).await
    }

    /// Return from the profile view
    pub async fn close_profile(&self) -> Result<(), SearchError> {
        self.request(Event::CloseProfile).await
    }

    pub async fn select_panel(&self, panel: Panel) -> Result<(), SearchError> {
        self.request(|reply| Event::SelectPanel(panel, reply)).await
    }

    /// Issue an attribute search. Returns once the pending state is visible
    /// in [`snapshot`](Self::snapshot).
    pub async fn submit(&self, criteria: SearchCriteria) -> Result<RequestToken, SearchError> {
        self.request(|reply| Event::Submit(criteria, reply)).await
    }

    /// Issue a name search. Returns once the pending state is visible.
    pub async fn search_by_name(&self, name: impl Into<String>) -> Result<RequestToken, SearchError> {
        let name = name.into();
        self.request(|reply| Event::SearchByName(name, reply)).await
    }

    /// Latest published state
    pub fn snapshot(&self) -> ViewState {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.snapshots.clone()
    }

    /// Wait until no search is pending and return that state
    pub async fn wait_idle(&self) -> Result<ViewState, SearchError> {
        let mut snapshots = self.snapshots.clone();
        let state = snapshots
            .wait_for(|state| !state.is_loading())
            .await
            .map_err(|_| SearchError::Closed)?;
        Ok(state.clone())
    }

    /// Stop the loop; in-flight fetches are dropped with it. Dropping the
    /// handle has the same effect once running fetches have finished.
    pub async fn shutdown(self) {
        let _ = self.events.send(Event::Shutdown);
        if let Err(e) = self.task.await {
            warn!("Orchestrator loop ended abnormally: {}", e);
        }
    }
}

async fn run_loop(
    api: Arc<dyn RecipeApi>,
    events: mpsc::WeakUnboundedSender<Event>,
    mut receiver: mpsc::UnboundedReceiver<Event>,
    publisher: watch::Sender<ViewState>,
) {
    let mut orchestrator = Orchestrator::new();
    let mut in_flight = InFlight::default();

    while let Some(event) = receiver.recv().await {
        match event {
            Event::Bookmarks(reply) => {
                orchestrator.handle_bookmarks();
                acknowledge(&publisher, &orchestrator, reply, ());
            }
            Event::CloseProfile(reply) => {
                orchestrator.handle_profile_view();
                acknowledge(&publisher, &orchestrator, reply, ());
            }
            Event::SelectPanel(panel, reply) => {
                orchestrator.select_panel(panel);
                acknowledge(&publisher, &orchestrator, reply, ());
            }
            Event::Submit(criteria, reply) => {
                let pending = orchestrator.begin_submit(criteria);
                let key = (pending.panel(), pending.token);
                if let Some(task) = dispatch(&api, &events, &publisher, &orchestrator, pending, reply) {
                    in_flight.track(key, task);
                }
            }
            Event::SearchByName(name, reply) => {
                let pending = orchestrator.begin_search_by_name(name);
                let key = (pending.panel(), pending.token);
                if let Some(task) = dispatch(&api, &events, &publisher, &orchestrator, pending, reply) {
                    in_flight.track(key, task);
                }
            }
            Event::Completed(completion) => {
                in_flight.finished(completion.panel, completion.token);
                orchestrator.complete(completion);
                publisher.send_replace(orchestrator.state().clone());
            }
            Event::Shutdown => break,
        }
    }

    debug!("Orchestrator loop stopping, aborting {} fetches", in_flight.len());
    in_flight.abort_all();
}

/// Fetch tasks keyed by the request they serve
#[derive(Default)]
struct InFlight {
    tasks: HashMap<(Panel, RequestToken), JoinHandle<()>>,
}

impl InFlight {
    fn track(&mut self, key: (Panel, RequestToken), task: JoinHandle<()>) {
        self.tasks.insert(key, task);
    }

    /// Forget the task whose completion was just delivered
    fn finished(&mut self, panel: Panel, token: RequestToken) {
        self.tasks.remove(&(panel, token));
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }

    fn abort_all(self) {
        for task in self.tasks.into_values() {
            task.abort();
        }
    }
}

/// Publish the new state, then let the caller continue
fn acknowledge<T>(
    publisher: &watch::Sender<ViewState>,
    orchestrator: &Orchestrator,
    reply: oneshot::Sender<T>,
    value: T,
) {
    publisher.send_replace(orchestrator.state().clone());
    let _ = reply.send(value);
}

/// Publish the pending state, acknowledge the caller, then start the fetch
fn dispatch(
    api: &Arc<dyn RecipeApi>,
    events: &mpsc::WeakUnboundedSender<Event>,
    publisher: &watch::Sender<ViewState>,
    orchestrator: &Orchestrator,
    pending: PendingSearch,
    reply: oneshot::Sender<RequestToken>,
) -> Option<JoinHandle<()>> {
    acknowledge(publisher, orchestrator, reply, pending.token);

    // Handle already dropped: nobody will see the result
    let events = events.upgrade()?;
    let api = Arc::clone(api);
    Some(tokio::spawn(async move {
        let completion = pending.run(api.as_ref()).await;
        // The loop may already be gone; nothing left to update then
        let _ = events.send(Event::Completed(completion));
    }))
}
