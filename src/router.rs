//! Routes, the route guard, and the top-level navigator.
//!
//! The guard is a pure function of the requested [`Route`] and the
//! [`SessionStore`]; it never calls the backend. The [`Navigator`] applies it
//! on every navigation, owns the [`ViewScope`] of the mounted view, and is the
//! single subscriber that turns [`SessionEvent::Expired`] into a forced move
//! to the login view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::api::SessionEvent;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Projects,
    Issues,
    CreateIssue,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::Projects,
        Route::Issues,
        Route::CreateIssue,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Projects => "/projects",
            Self::Issues => "/issues",
            Self::CreateIssue => "/create-issue",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Register => "Create account",
            Self::Dashboard => "Dashboard",
            Self::Projects => "Projects",
            Self::Issues => "Issues",
            Self::CreateIssue => "Create Issue",
        }
    }

    /// Resolve a path. Query strings and trailing slashes are ignored;
    /// anything unmatched lands on the login view.
    pub fn from_path(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };
        Self::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .unwrap_or(Route::Login)
    }

    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Self::Dashboard | Self::Projects | Self::Issues | Self::CreateIssue
        )
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render(Route),
    Redirect { from: Route, to: Route },
}

/// Decide whether `route` may render given the current session.
pub fn guard(route: Route, session: &SessionStore) -> GuardDecision {
    if route.is_protected() && !session.is_authenticated() {
        GuardDecision::Redirect {
            from: route,
            to: Route::Login,
        }
    } else {
        GuardDecision::Render(route)
    }
}

/// Liveness handle for a mounted view.
///
/// Responses that arrive after the scope is deactivated must be dropped.
#[derive(Debug, Clone)]
pub struct ViewScope {
    route: Route,
    active: Arc<AtomicBool>,
}

impl ViewScope {
    /// A scope not tracked by any navigator; stays active until dropped.
    pub fn detached(route: Route) -> Self {
        Self {
            route,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Result of a navigation attempt.
#[derive(Debug, Clone)]
pub enum Navigation {
    Rendered(ViewScope),
    Redirected { from: Route, to: Route },
}

#[derive(Debug)]
struct NavState {
    route: Route,
    mounted: Option<ViewScope>,
    expired_at: Option<String>,
}

/// Top-level navigation controller.
pub struct Navigator {
    session: Arc<SessionStore>,
    events: Mutex<broadcast::Receiver<SessionEvent>>,
    state: Mutex<NavState>,
}

impl Navigator {
    pub fn new(session: Arc<SessionStore>, events: broadcast::Receiver<SessionEvent>) -> Self {
        Self {
            session,
            events: Mutex::new(events),
            state: Mutex::new(NavState {
                route: Route::Login,
                mounted: None,
                expired_at: None,
            }),
        }
    }

    /// Navigate to `route`, unmounting the current view.
    pub fn navigate(&self, route: Route) -> Navigation {
        self.pump_events();
        let mut state = self.lock_state();
        if let Some(scope) = state.mounted.take() {
            scope.deactivate();
        }

        match guard(route, &self.session) {
            GuardDecision::Render(route) => {
                tracing::debug!(%route, "rendering view");
                let scope = ViewScope::detached(route);
                state.route = route;
                state.mounted = Some(scope.clone());
                Navigation::Rendered(scope)
            }
            GuardDecision::Redirect { from, to } => {
                tracing::debug!(%from, %to, "route guard redirect");
                state.route = to;
                Navigation::Redirected { from, to }
            }
        }
    }

    pub fn navigate_path(&self, path: &str) -> Navigation {
        self.navigate(Route::from_path(path))
    }

    /// Current route, after applying any pending session events.
    pub fn current(&self) -> Route {
        self.pump_events();
        self.lock_state().route
    }

    /// Endpoint whose 401 forced the last redirect to login, if any.
    /// Cleared by reading it.
    pub fn take_expired(&self) -> Option<String> {
        self.pump_events();
        self.lock_state().expired_at.take()
    }

    fn pump_events(&self) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match events.try_recv() {
                Ok(SessionEvent::Expired { endpoint }) => self.force_login(endpoint),
                // Every event is an expiry, so missed ones still mean "go to login".
                Err(TryRecvError::Lagged(skipped)) => {
                    self.force_login(format!("{} missed events", skipped))
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn force_login(&self, endpoint: String) {
        let mut state = self.lock_state();
        if let Some(scope) = state.mounted.take() {
            scope.deactivate();
        }
        tracing::info!(%endpoint, "session expired, redirecting to login");
        state.route = Route::Login;
        state.expired_at = Some(endpoint);
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, NavState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
