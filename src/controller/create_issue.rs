//! Create-issue form: reference data, default selections, submit.

use std::sync::Arc;

use super::{Mutable, Outcome};
use super::resources::Issues;
use crate::api::{ApiClient, Project, User};
use crate::router::ViewScope;
use crate::validate::IssueDraft;

pub const MISSING_REFERENCES: &str =
    "You need at least one project and one user to create issues.";
const REFERENCE_LOAD_FAILED: &str = "Failed to load projects or users";

pub struct CreateIssueForm {
    api: Arc<ApiClient>,
    scope: ViewScope,
    pub draft: IssueDraft,
    projects: Vec<Project>,
    users: Vec<User>,
    loading: bool,
    submitting: bool,
    error: Option<String>,
}

impl CreateIssueForm {
    pub fn new(api: Arc<ApiClient>, scope: ViewScope, draft: IssueDraft) -> Self {
        Self {
            api,
            scope,
            draft,
            projects: Vec::new(),
            users: Vec::new(),
            loading: false,
            submitting: false,
            error: None,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Both reference lists are needed before an issue can be filed.
    pub fn can_create(&self) -> bool {
        !self.projects.is_empty() && !self.users.is_empty()
    }

    /// Load projects and users together. Selections left empty by the user
    /// default to the first entry of each list.
    pub async fn load(&mut self) -> Outcome {
        if !self.scope.is_active() {
            return Outcome::Stale;
        }
        self.loading = true;
        let result = tokio::try_join!(self.api.list_projects(), self.api.list_users());
        if !self.scope.is_active() {
            return Outcome::Stale;
        }
        self.loading = false;

        match result {
            Ok((projects, users)) => {
                if self.draft.project_id.is_none() {
                    self.draft.project_id = projects.first().map(|p| p.id);
                }
                if self.draft.assignee_id.is_none() {
                    self.draft.assignee_id = users.first().map(|u| u.id);
                }
                self.projects = projects;
                self.users = users;
                Outcome::Applied
            }
            Err(e) if e.is_unauthorized() => Outcome::Expired,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load issue form references");
                self.error = Some(REFERENCE_LOAD_FAILED.to_string());
                Outcome::Failed
            }
        }
    }

    /// Validate and submit. On success the caller navigates to the issues
    /// view, which reloads the list; on failure the draft is kept.
    pub async fn submit(&mut self) -> Outcome {
        if !self.scope.is_active() {
            return Outcome::Stale;
        }
        let payload = match Issues::validate(&self.draft) {
            Ok(payload) => payload,
            Err(e) => {
                self.error = Some(e.to_string());
                return Outcome::Rejected;
            }
        };
        self.submitting = true;
        self.error = None;

        let result = Issues::create(&self.api, &payload).await;
        if !self.scope.is_active() {
            return Outcome::Stale;
        }
        self.submitting = false;

        match result {
            Ok(()) => Outcome::Applied,
            Err(e) if e.is_unauthorized() => Outcome::Expired,
            Err(e) => {
                tracing::warn!(error = %e, "issue creation failed");
                self.error = Some(e.inline_message(Issues::CREATE_FAILED));
                Outcome::Failed
            }
        }
    }
}
