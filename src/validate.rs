//! Client-side form validation.
//!
//! Each validator turns a raw form draft into the request payload the API
//! client sends, trimming text on the way. A failed validation is returned as
//! a [`ValidationError`] whose `Display` is the inline banner text; nothing
//! here touches the network.

use thiserror::Error;

use crate::api::{LoginRequest, NewIssue, NewProject, Priority, RegisterRequest, Role};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in title, project, and assignee.")]
    IncompleteIssue { missing: Vec<&'static str> },

    #[error("Project name is required.")]
    ProjectNameRequired,

    #[error("Email is required.")]
    EmailRequired,

    #[error("Password is required.")]
    PasswordRequired,

    #[error("Name is required.")]
    NameRequired,

    #[error("Please select a role: DEVELOPER, TESTER, MANAGER, or ADMIN.")]
    RoleRequired,
}

/// Raw input of the create-project form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
}

/// Raw input of the create-issue form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub project_id: Option<i64>,
    pub assignee_id: Option<i64>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

pub fn validate_project(draft: &ProjectDraft) -> Result<NewProject, ValidationError> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ValidationError::ProjectNameRequired);
    }
    Ok(NewProject {
        name: name.to_string(),
        description: draft.description.trim().to_string(),
    })
}

pub fn validate_issue(draft: &IssueDraft) -> Result<NewIssue, ValidationError> {
    let title = draft.title.trim();
    match (title.is_empty(), draft.project_id, draft.assignee_id) {
        (false, Some(project_id), Some(user_id)) => Ok(NewIssue {
            title: title.to_string(),
            description: draft.description.trim().to_string(),
            priority: draft.priority.unwrap_or_default(),
            project_id,
            user_id,
        }),
        (title_missing, project, assignee) => {
            let missing = [
                (title_missing, "title"),
                (project.is_none(), "project"),
                (assignee.is_none(), "assignee"),
            ]
            .into_iter()
            .filter_map(|(is_missing, field)| is_missing.then_some(field))
            .collect();
            Err(ValidationError::IncompleteIssue { missing })
        }
    }
}

/// Passwords are sent as typed; only emptiness is checked.
pub fn validate_login(credentials: &Credentials) -> Result<LoginRequest, ValidationError> {
    let email = credentials.email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if credentials.password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    Ok(LoginRequest {
        email: email.to_string(),
        password: credentials.password.clone(),
    })
}

pub fn validate_registration(form: &Registration) -> Result<RegisterRequest, ValidationError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    let login = validate_login(&Credentials {
        email: form.email.clone(),
        password: form.password.clone(),
    })?;
    let role = form.role.ok_or(ValidationError::RoleRequired)?;
    Ok(RegisterRequest {
        name: name.to_string(),
        email: login.email,
        password: login.password,
        role,
    })
}
