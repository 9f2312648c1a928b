use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use super::models::{
    Issue, IssueStatus, LoginRequest, LoginResponse, NewIssue, NewProject, Project,
    RegisterRequest, User,
};
use crate::errors::ApiError;
use crate::session::SessionStore;

/// Default backend location, matching the stock server configuration.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Session lifecycle events published by the API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend answered 401; the session store has already been cleared.
    Expired { endpoint: String },
}

/// The only egress point for backend calls.
///
/// Every request reads the token from the session store at dispatch time and
/// carries `Authorization: Bearer <token>` when, and only when, one exists.
/// Every 401 clears the session and publishes [`SessionEvent::Expired`]
/// before the error reaches the caller.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            events,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Subscribe to session events. Receivers only see events sent after
    /// they subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // ── Auth ──────────────────────────────────────────────────────────

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let endpoint = "POST /auth/login";
        let body = self
            .execute(endpoint, self.request(Method::POST, "/auth/login").json(request))
            .await?;
        LoginResponse::from_body(&body).ok_or_else(|| ApiError::UnexpectedShape {
            endpoint: endpoint.to_string(),
            message: "No token returned".to_string(),
        })
    }

    /// Returns the backend's confirmation text.
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        self.execute(
            "POST /auth/register",
            self.request(Method::POST, "/auth/register").json(request),
        )
        .await
    }

    // ── Projects ──────────────────────────────────────────────────────

    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.fetch_list("/projects").await
    }

    pub async fn create_project(&self, project: &NewProject) -> Result<(), ApiError> {
        self.execute(
            "POST /projects",
            self.request(Method::POST, "/projects").json(project),
        )
        .await
        .map(drop)
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("/projects/{}", id);
        self.execute(&format!("DELETE {}", path), self.request(Method::DELETE, &path))
            .await
            .map(drop)
    }

    // ── Issues ────────────────────────────────────────────────────────

    pub async fn list_issues(&self) -> Result<Vec<Issue>, ApiError> {
        self.fetch_list("/issues").await
    }

    pub async fn create_issue(&self, issue: &NewIssue) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "/issues")
            .query(&[("projectId", issue.project_id), ("userId", issue.user_id)])
            .json(issue);
        self.execute("POST /issues", builder).await.map(drop)
    }

    pub async fn update_issue_status(&self, id: i64, status: IssueStatus) -> Result<(), ApiError> {
        let path = format!("/issues/{}", id);
        let builder = self
            .request(Method::PUT, &path)
            .query(&[("status", status.as_str())]);
        self.execute(&format!("PUT {}", path), builder).await.map(drop)
    }

    pub async fn delete_issue(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("/issues/{}", id);
        self.execute(&format!("DELETE {}", path), self.request(Method::DELETE, &path))
            .await
            .map(drop)
    }

    // ── Users ─────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.fetch_list("/users").await
    }

    // ── Plumbing ──────────────────────────────────────────────────────

    /// Build a request with credentials attached from the current session.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        self.authorize(builder)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let endpoint = format!("GET {}", path);
        let body = self
            .execute(&endpoint, self.request(Method::GET, path))
            .await?;
        decode_list(&endpoint, &body)
    }

    /// Send the request and apply the response-phase rules.
    async fn execute(&self, endpoint: &str, builder: RequestBuilder) -> Result<String, ApiError> {
        let network = |source| ApiError::Network {
            endpoint: endpoint.to_string(),
            source,
        };

        let response = builder.send().await.map_err(network)?;
        let status = response.status();
        let body = response.text().await.map_err(network)?;
        tracing::debug!(endpoint, status = status.as_u16(), "backend response");

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session(endpoint);
            return Err(ApiError::Unauthorized {
                endpoint: endpoint.to_string(),
                body,
            });
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn expire_session(&self, endpoint: &str) {
        tracing::warn!(endpoint, "backend rejected credentials, ending session");
        if let Err(e) = self.session.clear_session() {
            tracing::error!(error = %e, "failed to clear session after 401");
        }
        // No subscribers is fine: nothing is mounted that needs redirecting.
        let _ = self.events.send(SessionEvent::Expired {
            endpoint: endpoint.to_string(),
        });
    }
}

/// Empty and `null` bodies decode to an empty list.
fn decode_list<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<Vec<T>, ApiError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Option<Vec<T>>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
}
