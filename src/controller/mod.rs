//! List-view controllers: load → mutate → reload.
//!
//! [`ResourceController`] drives one entity list. It never patches the list
//! locally: every successful mutation is followed by a full [`load`] so the
//! view always shows server-computed fields. A mutation's reload is issued
//! only after the mutation's own response has arrived.
//!
//! Controllers take `&self`; state lives behind short-lived `Mutex` locks
//! that are never held across an `.await`, so unrelated mutations can be in
//! flight at the same time. Row mutations are guarded per id.
//!
//! Results are dropped once the controller's [`ViewScope`] is no longer
//! active, and 401s are left to the API client's global teardown.
//!
//! [`load`]: ResourceController::load

pub mod create_issue;
pub mod dashboard;
pub mod resources;

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::router::ViewScope;
use crate::validate::ValidationError;

pub use create_issue::CreateIssueForm;
pub use dashboard::{Dashboard, DashboardStats};
pub use resources::{Issues, IssuesController, Projects, ProjectsController, Users, UsersController};

/// How a controller operation ended. Failures are already reflected in the
/// view's inline error; nothing here is meant to be propagated with `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Local validation failed; no request was sent.
    Rejected,
    /// The backend or network failed; see the inline error.
    Failed,
    /// 401: the session is gone and navigation has moved to login.
    Expired,
    /// The user did not confirm a destructive action.
    Declined,
    /// The same row already has a mutation in flight.
    Busy,
    /// The view was unmounted before the response arrived, or a newer
    /// load already resolved.
    Stale,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Explicit confirmation step for destructive actions.
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirmation for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// An entity type that can be listed.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type Item: Clone + Send + Sync;

    /// Inline message when the list cannot be loaded.
    const LOAD_FAILED: &'static str;

    fn id(item: &Self::Item) -> i64;

    async fn fetch(api: &ApiClient) -> Result<Vec<Self::Item>, ApiError>;
}

/// An entity type that can be created and deleted from its list view.
#[async_trait]
pub trait Mutable: Resource {
    type Draft: Send + Sync;
    type Payload: Send + Sync;

    const CREATE_FAILED: &'static str;
    const DELETE_FAILED: &'static str;
    const DELETE_PROMPT: &'static str;

    fn validate(draft: &Self::Draft) -> Result<Self::Payload, ValidationError>;

    async fn create(api: &ApiClient, payload: &Self::Payload) -> Result<(), ApiError>;

    async fn delete(api: &ApiClient, id: i64) -> Result<(), ApiError>;
}

/// Snapshot of a list view for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub loaded: bool,
    pub error: Option<String>,
}

struct Inner<T> {
    items: Vec<T>,
    error: Option<String>,
    loaded: bool,
    pending_loads: usize,
    issued_loads: u64,
    resolved_load: u64,
}

pub struct ResourceController<R: Resource> {
    api: Arc<ApiClient>,
    scope: ViewScope,
    state: Mutex<Inner<R::Item>>,
    in_flight: Mutex<HashSet<i64>>,
}

impl<R: Resource> ResourceController<R> {
    pub fn new(api: Arc<ApiClient>, scope: ViewScope) -> Self {
        Self {
            api,
            scope,
            state: Mutex::new(Inner {
                items: Vec::new(),
                error: None,
                loaded: false,
                pending_loads: 0,
                issued_loads: 0,
                resolved_load: 0,
            }),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn snapshot(&self) -> ListState<R::Item> {
        let state = self.lock_state();
        ListState {
            items: state.items.clone(),
            loading: state.pending_loads > 0,
            loaded: state.loaded,
            error: state.error.clone(),
        }
    }

    pub fn items(&self) -> Vec<R::Item> {
        self.lock_state().items.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock_state().error.clone()
    }

    pub fn find(&self, id: i64) -> Option<R::Item> {
        self.lock_state()
            .items
            .iter()
            .find(|item| R::id(item) == id)
            .cloned()
    }

    /// Whether a mutation for this row is in flight (its controls are disabled).
    pub fn is_in_flight(&self, id: i64) -> bool {
        self.lock_in_flight().contains(&id)
    }

    /// Fetch the full list and replace the held one.
    ///
    /// On failure the previous list stays and the inline error is set. If
    /// loads overlap, only a response newer than the last one resolved is
    /// applied, whether it succeeded or failed; older ones return `Stale`.
    pub async fn load(&self) -> Outcome {
        if !self.scope.is_active() {
            return Outcome::Stale;
        }
        let ticket = {
            let mut state = self.lock_state();
            state.pending_loads += 1;
            state.issued_loads += 1;
            state.issued_loads
        };

        let result = R::fetch(&self.api).await;

        let mut state = self.lock_state();
        state.pending_loads = state.pending_loads.saturating_sub(1);
        if !self.scope.is_active() {
            tracing::debug!(route = %self.scope.route(), "dropping list response for unmounted view");
            return Outcome::Stale;
        }
        if let Err(e) = &result {
            if e.is_unauthorized() {
                return Outcome::Expired;
            }
        }
        if ticket <= state.resolved_load {
            tracing::debug!(ticket, resolved = state.resolved_load, "dropping superseded list response");
            return Outcome::Stale;
        }
        state.resolved_load = ticket;

        match result {
            Ok(items) => {
                state.items = items;
                state.loaded = true;
                // A newer successful load supersedes an older load failure,
                // but not a mutation error.
                if state.error.as_deref() == Some(R::LOAD_FAILED) {
                    state.error = None;
                }
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "list load failed");
                state.error = Some(R::LOAD_FAILED.to_string());
                Outcome::Failed
            }
        }
    }

    fn set_error(&self, message: impl Into<String>) {
        self.lock_state().error = Some(message.into());
    }

    fn clear_error(&self) {
        self.lock_state().error = None;
    }

    /// Run a mutation for one row under the per-id guard, then reload.
    async fn mutate_row<F, Fut>(&self, id: i64, failure: &str, op: F) -> Outcome
    where
        F: FnOnce(Arc<ApiClient>) -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        if !self.scope.is_active() {
            return Outcome::Stale;
        }
        let Some(guard) = self.begin_row(id) else {
            tracing::debug!(id, "row mutation already in flight");
            return Outcome::Busy;
        };
        self.clear_error();

        let result = op(self.api.clone()).await;
        drop(guard);

        self.finish_mutation(result, |_| failure.to_string()).await
    }

    /// Shared tail of every mutation: stale check, then reload or inline error.
    async fn finish_mutation(
        &self,
        result: Result<(), ApiError>,
        message: impl FnOnce(&ApiError) -> String,
    ) -> Outcome {
        if !self.scope.is_active() {
            tracing::debug!(route = %self.scope.route(), "dropping mutation response for unmounted view");
            return Outcome::Stale;
        }
        match result {
            Ok(()) => {
                self.load().await;
                Outcome::Applied
            }
            Err(e) if e.is_unauthorized() => Outcome::Expired,
            Err(e) => {
                tracing::warn!(error = %e, "mutation failed");
                self.set_error(message(&e));
                Outcome::Failed
            }
        }
    }

    fn begin_row(&self, id: i64) -> Option<RowGuard<'_>> {
        self.lock_in_flight()
            .insert(id)
            .then_some(RowGuard {
                set: &self.in_flight,
                id,
            })
    }

    fn lock_state(&self) -> MutexGuard<'_, Inner<R::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashSet<i64>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: Mutable> ResourceController<R> {
    /// Validate `draft` and create the entity. The draft is only borrowed, so
    /// a failed attempt leaves the form input with the caller.
    pub async fn create(&self, draft: &R::Draft) -> Outcome {
        if !self.scope.is_active() {
            return Outcome::Stale;
        }
        let payload = match R::validate(draft) {
            Ok(payload) => payload,
            Err(e) => {
                self.set_error(e.to_string());
                return Outcome::Rejected;
            }
        };
        self.clear_error();

        let result = R::create(&self.api, &payload).await;
        self.finish_mutation(result, |e| e.inline_message(R::CREATE_FAILED))
            .await
    }

    /// Delete after explicit confirmation. On failure the row stays.
    pub async fn delete(&self, id: i64, confirmation: &dyn Confirmation) -> Outcome {
        if !self.scope.is_active() {
            return Outcome::Stale;
        }
        if !confirmation.confirm(R::DELETE_PROMPT) {
            return Outcome::Declined;
        }
        self.mutate_row(id, R::DELETE_FAILED, |api| async move {
            R::delete(&api, id).await
        })
        .await
    }
}

struct RowGuard<'a> {
    set: &'a Mutex<HashSet<i64>>,
    id: i64,
}

impl Drop for RowGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
