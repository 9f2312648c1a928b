//! Dashboard view: greeting plus entity counts.

use std::sync::Arc;

use super::Outcome;
use crate::api::ApiClient;
use crate::router::ViewScope;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub projects: usize,
    pub issues: usize,
    pub users: usize,
}

pub struct Dashboard {
    api: Arc<ApiClient>,
    scope: ViewScope,
    stats: DashboardStats,
}

impl Dashboard {
    pub fn new(api: Arc<ApiClient>, scope: ViewScope) -> Self {
        Self {
            api,
            scope,
            stats: DashboardStats::default(),
        }
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats
    }

    /// Name shown in the greeting; token-only sessions get "User".
    pub fn display_name(session: &SessionStore) -> String {
        session
            .current_user()
            .map(|u| u.display_name().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "User".to_string())
    }

    /// Count projects, issues and users. Counts are decorative: a failure
    /// leaves them at zero without an inline error.
    pub async fn load(&mut self) -> Outcome {
        if !self.scope.is_active() {
            return Outcome::Stale;
        }
        let result = tokio::try_join!(
            self.api.list_projects(),
            self.api.list_issues(),
            self.api.list_users()
        );
        if !self.scope.is_active() {
            return Outcome::Stale;
        }

        match result {
            Ok((projects, issues, users)) => {
                self.stats = DashboardStats {
                    projects: projects.len(),
                    issues: issues.len(),
                    users: users.len(),
                };
                Outcome::Applied
            }
            Err(e) if e.is_unauthorized() => Outcome::Expired,
            Err(e) => {
                tracing::debug!(error = %e, "dashboard counts unavailable");
                Outcome::Failed
            }
        }
    }
}
