//! Resource bindings for projects, issues and users.

use async_trait::async_trait;

use super::{Mutable, Outcome, Resource, ResourceController};
use crate::api::{ApiClient, Issue, IssueStatus, NewIssue, NewProject, Project, User};
use crate::errors::ApiError;
use crate::validate::{self, IssueDraft, ProjectDraft, ValidationError};

pub struct Projects;
pub struct Issues;
/// Reference data for assignee selection; read-only.
pub struct Users;

pub type ProjectsController = ResourceController<Projects>;
pub type IssuesController = ResourceController<Issues>;
pub type UsersController = ResourceController<Users>;

#[async_trait]
impl Resource for Projects {
    type Item = Project;

    const LOAD_FAILED: &'static str = "Failed to load projects. Are you authenticated?";

    fn id(item: &Project) -> i64 {
        item.id
    }

    async fn fetch(api: &ApiClient) -> Result<Vec<Project>, ApiError> {
        api.list_projects().await
    }
}

#[async_trait]
impl Mutable for Projects {
    type Draft = ProjectDraft;
    type Payload = NewProject;

    const CREATE_FAILED: &'static str = "Failed to create project";
    const DELETE_FAILED: &'static str = "Failed to delete project";
    const DELETE_PROMPT: &'static str = "Delete this project? This may affect related issues.";

    fn validate(draft: &ProjectDraft) -> Result<NewProject, ValidationError> {
        validate::validate_project(draft)
    }

    async fn create(api: &ApiClient, payload: &NewProject) -> Result<(), ApiError> {
        api.create_project(payload).await
    }

    async fn delete(api: &ApiClient, id: i64) -> Result<(), ApiError> {
        api.delete_project(id).await
    }
}

#[async_trait]
impl Resource for Issues {
    type Item = Issue;

    const LOAD_FAILED: &'static str = "Failed to load issues. Are you authenticated?";

    fn id(item: &Issue) -> i64 {
        item.id
    }

    async fn fetch(api: &ApiClient) -> Result<Vec<Issue>, ApiError> {
        api.list_issues().await
    }
}

#[async_trait]
impl Mutable for Issues {
    type Draft = IssueDraft;
    type Payload = NewIssue;

    const CREATE_FAILED: &'static str = "Failed to create issue";
    const DELETE_FAILED: &'static str = "Failed to delete issue";
    const DELETE_PROMPT: &'static str = "Delete this issue?";

    fn validate(draft: &IssueDraft) -> Result<NewIssue, ValidationError> {
        validate::validate_issue(draft)
    }

    async fn create(api: &ApiClient, payload: &NewIssue) -> Result<(), ApiError> {
        api.create_issue(payload).await
    }

    async fn delete(api: &ApiClient, id: i64) -> Result<(), ApiError> {
        api.delete_issue(id).await
    }
}

#[async_trait]
impl Resource for Users {
    type Item = User;

    const LOAD_FAILED: &'static str = "Failed to load users. Are you authenticated?";

    fn id(item: &User) -> i64 {
        item.id
    }

    async fn fetch(api: &ApiClient) -> Result<Vec<User>, ApiError> {
        api.list_users().await
    }
}

impl ResourceController<Issues> {
    /// Change one issue's status. A second call for the same id while the
    /// first is in flight returns [`Outcome::Busy`] without a request.
    pub async fn update_status(&self, id: i64, status: IssueStatus) -> Outcome {
        self.mutate_row(id, "Failed to update status", |api| async move {
            api.update_issue_status(id, status).await
        })
        .await
    }
}
