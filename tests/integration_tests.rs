//! Integration tests for the BugTracker client
//!
//! Library-level tests drive the controllers against an in-process mock
//! backend; CLI tests run the built binary.

use std::sync::Arc;
use std::time::Duration;

use bugtracker::api::{ApiClient, IssueStatus, NewIssue, NewProject, Priority};
use bugtracker::controller::{
    CreateIssueForm, Dashboard, IssuesController, Outcome, ProjectsController,
};
use bugtracker::errors::ApiError;
use bugtracker::router::{Navigation, Navigator, Route, ViewScope};
use bugtracker::session::{MemoryStore, SessionStore, UserProfile};
use bugtracker::validate::{Credentials, IssueDraft, ProjectDraft};

// =============================================================================
// Mock backend
// =============================================================================

mod mock {
    use axum::extract::{Path, Query, Request, State};
    use axum::http::{StatusCode, header::AUTHORIZATION};
    use axum::middleware::{self, Next};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{delete, get, post, put};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    pub type Shared = Arc<Mutex<Backend>>;

    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub method: String,
        pub path: String,
        pub query: Option<String>,
        pub authorization: Option<String>,
    }

    pub struct Backend {
        pub projects: Vec<Value>,
        pub issues: Vec<Value>,
        pub users: Vec<Value>,
        pub next_id: i64,
        pub login_body: String,
        pub accepted_token: String,
        pub delay: Duration,
        pub requests: Vec<Recorded>,
    }

    impl Backend {
        /// Two users, one project, one open issue; accepts token `t1`.
        pub fn seeded() -> Self {
            Self {
                projects: vec![json!({"id": 10, "name": "Core", "description": "Main app"})],
                issues: vec![json!({
                    "id": 100,
                    "title": "Crash on save",
                    "description": "Stack trace attached",
                    "status": "OPEN",
                    "priority": "HIGH",
                    "project": {"id": 10, "name": "Core"},
                    "assignedUser": {"id": 2, "name": "Bob", "email": "bob@example.com"},
                    "createdAt": "2024-05-01T10:00:00"
                })],
                users: vec![
                    json!({"id": 1, "name": "A", "email": "a@b.com"}),
                    json!({"id": 2, "name": "Bob", "email": "bob@example.com"}),
                ],
                next_id: 1000,
                login_body: json!({"token": "t1", "name": "A", "email": "a@b.com", "role": "USER"})
                    .to_string(),
                accepted_token: "t1".to_string(),
                delay: Duration::ZERO,
                requests: Vec::new(),
            }
        }

        pub fn count(&self, method: &str, path: &str) -> usize {
            self.requests
                .iter()
                .filter(|r| r.method == method && r.path == path)
                .count()
        }
    }

    pub async fn spawn(backend: Backend) -> (String, Shared) {
        let state: Shared = Arc::new(Mutex::new(backend));
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/projects", get(list_projects).post(create_project))
            .route("/api/projects/{id}", delete(delete_project))
            .route("/api/issues", get(list_issues).post(create_issue))
            .route("/api/issues/{id}", put(update_status).delete(delete_issue))
            .route("/api/users", get(list_users))
            .layer(middleware::from_fn_with_state(state.clone(), gate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/api", addr), state)
    }

    /// Records every request, applies the configured delay, and rejects
    /// non-auth routes without the accepted bearer token.
    async fn gate(State(state): State<Shared>, request: Request, next: Next) -> Response {
        let authorization = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let path = request.uri().path().to_string();
        let (delay, expected) = {
            let mut backend = state.lock().unwrap();
            backend.requests.push(Recorded {
                method: request.method().to_string(),
                path: path.clone(),
                query: request.uri().query().map(str::to_string),
                authorization: authorization.clone(),
            });
            (backend.delay, format!("Bearer {}", backend.accepted_token))
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if !path.starts_with("/api/auth/") && authorization.as_deref() != Some(expected.as_str()) {
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
        next.run(request).await
    }

    async fn login(State(state): State<Shared>) -> String {
        state.lock().unwrap().login_body.clone()
    }

    async fn register() -> &'static str {
        "User registered successfully"
    }

    async fn list_projects(State(state): State<Shared>) -> Json<Value> {
        Json(Value::Array(state.lock().unwrap().projects.clone()))
    }

    async fn create_project(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
        let mut backend = state.lock().unwrap();
        backend.next_id += 1;
        let project = json!({
            "id": backend.next_id,
            "name": body["name"],
            "description": body["description"],
        });
        backend.projects.push(project.clone());
        Json(project)
    }

    async fn delete_project(State(state): State<Shared>, Path(id): Path<i64>) -> StatusCode {
        let mut backend = state.lock().unwrap();
        match backend.projects.iter().position(|p| p["id"] == id) {
            Some(index) => {
                backend.projects.remove(index);
                StatusCode::OK
            }
            None => StatusCode::NOT_FOUND,
        }
    }

    async fn list_issues(State(state): State<Shared>) -> Json<Value> {
        Json(Value::Array(state.lock().unwrap().issues.clone()))
    }

    async fn create_issue(
        State(state): State<Shared>,
        Query(query): Query<HashMap<String, i64>>,
        Json(body): Json<Value>,
    ) -> Response {
        let mut backend = state.lock().unwrap();
        let find = |list: &[Value], id: Option<&i64>| {
            id.and_then(|id| list.iter().find(|v| v["id"] == *id).cloned())
        };
        let Some(project) = find(&backend.projects, query.get("projectId")) else {
            return (StatusCode::BAD_REQUEST, "Project not found").into_response();
        };
        let Some(user) = find(&backend.users, query.get("userId")) else {
            return (StatusCode::BAD_REQUEST, "User not found").into_response();
        };
        backend.next_id += 1;
        let issue = json!({
            "id": backend.next_id,
            "title": body["title"],
            "description": body["description"],
            "status": "OPEN",
            "priority": body["priority"],
            "project": {"id": project["id"], "name": project["name"]},
            "assignedUser": user,
            "createdAt": "2024-05-02T09:30:00.123456"
        });
        backend.issues.push(issue.clone());
        Json(issue).into_response()
    }

    async fn update_status(
        State(state): State<Shared>,
        Path(id): Path<i64>,
        Query(query): Query<HashMap<String, String>>,
    ) -> StatusCode {
        let mut backend = state.lock().unwrap();
        let Some(status) = query.get("status") else {
            return StatusCode::BAD_REQUEST;
        };
        match backend.issues.iter_mut().find(|i| i["id"] == id) {
            Some(issue) => {
                issue["status"] = Value::String(status.clone());
                StatusCode::OK
            }
            None => StatusCode::NOT_FOUND,
        }
    }

    async fn delete_issue(State(state): State<Shared>, Path(id): Path<i64>) -> StatusCode {
        let mut backend = state.lock().unwrap();
        match backend.issues.iter().position(|i| i["id"] == id) {
            Some(index) => {
                backend.issues.remove(index);
                StatusCode::OK
            }
            None => StatusCode::NOT_FOUND,
        }
    }

    async fn list_users(State(state): State<Shared>) -> Json<Value> {
        Json(Value::Array(state.lock().unwrap().users.clone()))
    }
}

// =============================================================================
// Helpers
// =============================================================================

struct Client {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    navigator: Navigator,
}

fn client(base_url: &str) -> Client {
    let session = Arc::new(SessionStore::open(MemoryStore::new()).unwrap());
    let api = Arc::new(ApiClient::new(base_url, session.clone()));
    let navigator = Navigator::new(session.clone(), api.subscribe());
    Client {
        api,
        session,
        navigator,
    }
}

fn profile_a() -> UserProfile {
    UserProfile {
        id: Some(1),
        name: "A".into(),
        email: "a@b.com".into(),
        role: "USER".into(),
    }
}

fn logged_in(base_url: &str) -> Client {
    let client = client(base_url);
    client.session.set_session("t1", Some(profile_a())).unwrap();
    client
}

fn mount(client: &Client, route: Route) -> ViewScope {
    let Navigation::Rendered(scope) = client.navigator.navigate(route) else {
        panic!("expected {} to render", route);
    };
    scope
}

fn yes(_: &str) -> bool {
    true
}

// =============================================================================
// Authentication and routing
// =============================================================================

mod auth_flow {
    use super::*;

    #[tokio::test]
    async fn test_login_stores_session_and_unlocks_dashboard() {
        let (base, backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = client(&base);

        assert!(matches!(
            c.navigator.navigate(Route::Dashboard),
            Navigation::Redirected {
                to: Route::Login,
                ..
            }
        ));

        let credentials = Credentials {
            email: "a@b.com".into(),
            password: "secret".into(),
        };
        let session = bugtracker::auth::login(&c.api, &credentials).await.unwrap();
        assert_eq!(session.token, "t1");
        assert_eq!(c.session.current_user(), Some(profile_a()));

        let scope = mount(&c, Route::Dashboard);
        let mut dashboard = Dashboard::new(c.api.clone(), scope);
        assert_eq!(dashboard.load().await, Outcome::Applied);
        assert_eq!(Dashboard::display_name(&c.session), "A");
        let stats = dashboard.stats();
        assert_eq!((stats.projects, stats.issues, stats.users), (1, 1, 2));

        let backend = backend.lock().unwrap();
        let login = &backend.requests[0];
        assert_eq!(login.path, "/api/auth/login");
        assert_eq!(login.authorization, None);
        assert!(
            backend.requests[1..]
                .iter()
                .all(|r| r.authorization.as_deref() == Some("Bearer t1"))
        );
    }

    #[tokio::test]
    async fn test_token_only_login_greets_generic_user() {
        let mut seeded = mock::Backend::seeded();
        seeded.login_body = "t1".to_string();
        let (base, _backend) = mock::spawn(seeded).await;
        let c = client(&base);

        let credentials = Credentials {
            email: "a@b.com".into(),
            password: "secret".into(),
        };
        bugtracker::auth::login(&c.api, &credentials).await.unwrap();

        assert!(c.session.is_authenticated());
        assert_eq!(c.session.current_user(), None);
        assert_eq!(Dashboard::display_name(&c.session), "User");
        assert!(matches!(
            c.navigator.navigate(Route::Issues),
            Navigation::Rendered(_)
        ));
    }

    #[tokio::test]
    async fn test_login_without_token_is_rejected() {
        let mut seeded = mock::Backend::seeded();
        seeded.login_body = r#"{"name": "A"}"#.to_string();
        let (base, _backend) = mock::spawn(seeded).await;
        let c = client(&base);

        let credentials = Credentials {
            email: "a@b.com".into(),
            password: "secret".into(),
        };
        let err = bugtracker::auth::login(&c.api, &credentials)
            .await
            .unwrap_err();
        assert!(!c.session.is_authenticated());
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_login_against_unreachable_backend() {
        let c = client("http://127.0.0.1:9/api");
        let credentials = Credentials {
            email: "a@b.com".into(),
            password: "secret".into(),
        };
        let err = bugtracker::auth::login(&c.api, &credentials)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), bugtracker::auth::LOGIN_UNREACHABLE);
        assert!(!c.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_requests_without_session_carry_no_authorization() {
        let (base, backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = client(&base);

        let err = c.api.list_projects().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(backend.lock().unwrap().requests[0].authorization, None);
    }

    async fn call(api: &ApiClient, endpoint: usize) -> Result<(), ApiError> {
        let issue = NewIssue {
            title: "t".into(),
            description: String::new(),
            priority: Priority::Low,
            project_id: 10,
            user_id: 1,
        };
        let project = NewProject {
            name: "p".into(),
            description: String::new(),
        };
        match endpoint {
            0 => api.list_projects().await.map(drop),
            1 => api.create_project(&project).await,
            2 => api.delete_project(10).await,
            3 => api.list_issues().await.map(drop),
            4 => api.create_issue(&issue).await,
            5 => api.update_issue_status(100, IssueStatus::Closed).await,
            6 => api.delete_issue(100).await,
            _ => api.list_users().await.map(drop),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_on_any_endpoint_ends_session() {
        let mut seeded = mock::Backend::seeded();
        seeded.accepted_token = "rotated".to_string();
        let (base, backend) = mock::spawn(seeded).await;

        for endpoint in 0..8 {
            let c = logged_in(&base);
            let scope = mount(&c, Route::Projects);

            let err = call(&c.api, endpoint).await.unwrap_err();
            assert!(err.is_unauthorized(), "endpoint {endpoint}");
            assert!(!c.session.is_authenticated(), "endpoint {endpoint}");
            assert_eq!(c.navigator.current(), Route::Login, "endpoint {endpoint}");
            assert!(!scope.is_active());
            assert!(c.navigator.take_expired().is_some());
        }

        // Nothing was mutated server-side.
        let backend = backend.lock().unwrap();
        assert_eq!(backend.projects.len(), 1);
        assert_eq!(backend.issues.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_list_load_leaves_no_inline_error() {
        let mut seeded = mock::Backend::seeded();
        seeded.accepted_token = "rotated".to_string();
        let (base, _backend) = mock::spawn(seeded).await;
        let c = logged_in(&base);

        let issues = IssuesController::new(c.api.clone(), mount(&c, Route::Issues));
        assert_eq!(issues.load().await, Outcome::Expired);
        assert_eq!(issues.error(), None);
        assert_eq!(c.navigator.current(), Route::Login);
    }
}

// =============================================================================
// Projects
// =============================================================================

mod projects {
    use super::*;

    #[tokio::test]
    async fn test_created_project_appears_with_server_id() {
        let (base, backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = logged_in(&base);
        let projects = ProjectsController::new(c.api.clone(), mount(&c, Route::Projects));
        assert_eq!(projects.load().await, Outcome::Applied);

        let draft = ProjectDraft {
            name: "  Alpha ".into(),
            description: "First".into(),
        };
        assert_eq!(projects.create(&draft).await, Outcome::Applied);

        let alpha = projects
            .items()
            .into_iter()
            .find(|p| p.name == "Alpha")
            .expect("Alpha listed after reload");
        assert_eq!(alpha.id, 1001);
        assert_eq!(alpha.description.as_deref(), Some("First"));
        assert_eq!(backend.lock().unwrap().count("GET", "/api/projects"), 2);
    }

    #[tokio::test]
    async fn test_blank_project_name_sends_nothing() {
        let (base, backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = logged_in(&base);
        let projects = ProjectsController::new(c.api.clone(), mount(&c, Route::Projects));

        let draft = ProjectDraft {
            name: "   ".into(),
            description: String::new(),
        };
        assert_eq!(projects.create(&draft).await, Outcome::Rejected);
        assert_eq!(projects.error().as_deref(), Some("Project name is required."));
        assert_eq!(backend.lock().unwrap().count("POST", "/api/projects"), 0);
    }

    #[tokio::test]
    async fn test_second_delete_fails_and_list_stays_coherent() {
        let (base, backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = logged_in(&base);
        let projects = ProjectsController::new(c.api.clone(), mount(&c, Route::Projects));
        projects.load().await;

        assert_eq!(projects.delete(10, &yes).await, Outcome::Applied);
        assert!(projects.items().is_empty());

        assert_eq!(projects.delete(10, &yes).await, Outcome::Failed);
        assert_eq!(projects.error().as_deref(), Some("Failed to delete project"));
        assert!(projects.items().is_empty());
        assert!(!projects.is_in_flight(10));
        assert_eq!(backend.lock().unwrap().count("DELETE", "/api/projects/10"), 2);
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let (base, backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = logged_in(&base);
        let projects = ProjectsController::new(c.api.clone(), mount(&c, Route::Projects));
        projects.load().await;

        let no = |_: &str| false;
        assert_eq!(projects.delete(10, &no).await, Outcome::Declined);
        assert_eq!(projects.items().len(), 1);
        assert_eq!(backend.lock().unwrap().count("DELETE", "/api/projects/10"), 0);
    }

    #[tokio::test]
    async fn test_response_after_unmount_is_dropped() {
        let mut seeded = mock::Backend::seeded();
        seeded.delay = Duration::from_millis(200);
        let (base, _backend) = mock::spawn(seeded).await;
        let c = logged_in(&base);
        let projects = ProjectsController::new(c.api.clone(), mount(&c, Route::Projects));

        let (outcome, _) = tokio::join!(projects.load(), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            c.navigator.navigate(Route::Dashboard)
        });

        assert_eq!(outcome, Outcome::Stale);
        assert!(projects.items().is_empty());
        assert_eq!(projects.error(), None);
    }
}

// =============================================================================
// Issues
// =============================================================================

mod issues {
    use super::*;

    #[tokio::test]
    async fn test_status_change_round_trips() {
        let (base, backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = logged_in(&base);
        let issues = IssuesController::new(c.api.clone(), mount(&c, Route::Issues));
        issues.load().await;
        assert_eq!(issues.find(100).unwrap().status, IssueStatus::Open);

        assert_eq!(
            issues.update_status(100, IssueStatus::Resolved).await,
            Outcome::Applied
        );
        assert_eq!(issues.find(100).unwrap().status, IssueStatus::Resolved);

        let backend = backend.lock().unwrap();
        let put = backend
            .requests
            .iter()
            .find(|r| r.method == "PUT")
            .unwrap();
        assert_eq!(put.path, "/api/issues/100");
        assert_eq!(put.query.as_deref(), Some("status=RESOLVED"));
    }

    #[tokio::test]
    async fn test_status_change_on_missing_issue_keeps_list() {
        let (base, _backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = logged_in(&base);
        let issues = IssuesController::new(c.api.clone(), mount(&c, Route::Issues));
        issues.load().await;

        assert_eq!(
            issues.update_status(999, IssueStatus::Closed).await,
            Outcome::Failed
        );
        assert_eq!(issues.error().as_deref(), Some("Failed to update status"));
        assert_eq!(issues.items().len(), 1);
    }

    #[tokio::test]
    async fn test_row_mutations_are_serialized_per_issue() {
        let mut seeded = mock::Backend::seeded();
        seeded.delay = Duration::from_millis(50);
        let (base, backend) = mock::spawn(seeded).await;
        let c = logged_in(&base);
        let issues = IssuesController::new(c.api.clone(), mount(&c, Route::Issues));

        let (first, second) = tokio::join!(
            issues.update_status(100, IssueStatus::InProgress),
            issues.update_status(100, IssueStatus::Closed)
        );

        assert_eq!(first, Outcome::Applied);
        assert_eq!(second, Outcome::Busy);
        assert!(!issues.is_in_flight(100));
        assert_eq!(issues.find(100).unwrap().status, IssueStatus::InProgress);
        assert_eq!(backend.lock().unwrap().count("PUT", "/api/issues/100"), 1);
    }

    #[tokio::test]
    async fn test_mutations_on_different_issues_overlap() {
        let mut seeded = mock::Backend::seeded();
        seeded.issues.push(serde_json::json!({
            "id": 101,
            "title": "Typo in footer",
            "status": "OPEN",
            "priority": "LOW",
            "project": {"id": 10, "name": "Core"},
            "assignedUser": null
        }));
        seeded.delay = Duration::from_millis(50);
        let (base, backend) = mock::spawn(seeded).await;
        let c = logged_in(&base);
        let issues = IssuesController::new(c.api.clone(), mount(&c, Route::Issues));
        issues.load().await;

        let (status, deleted, both_in_flight) = tokio::join!(
            issues.update_status(100, IssueStatus::Resolved),
            issues.delete(101, &yes),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                issues.is_in_flight(100) && issues.is_in_flight(101)
            }
        );

        assert_eq!(status, Outcome::Applied);
        assert_eq!(deleted, Outcome::Applied);
        assert!(both_in_flight);
        assert_eq!(issues.error(), None);
        assert!(issues.find(101).is_none());
        assert_eq!(issues.find(100).unwrap().status, IssueStatus::Resolved);

        let backend = backend.lock().unwrap();
        assert_eq!(backend.count("PUT", "/api/issues/100"), 1);
        assert_eq!(backend.count("DELETE", "/api/issues/101"), 1);
    }

    #[tokio::test]
    async fn test_incomplete_issue_sends_nothing() {
        let (base, backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = logged_in(&base);
        let issues = IssuesController::new(c.api.clone(), mount(&c, Route::Issues));

        let draft = IssueDraft {
            title: "No assignee".into(),
            project_id: Some(10),
            ..IssueDraft::default()
        };
        assert_eq!(issues.create(&draft).await, Outcome::Rejected);
        assert_eq!(
            issues.error().as_deref(),
            Some("Please fill in title, project, and assignee.")
        );
        assert_eq!(backend.lock().unwrap().count("POST", "/api/issues"), 0);
    }

    #[tokio::test]
    async fn test_create_form_defaults_and_submits() {
        let (base, backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = logged_in(&base);

        let draft = IssueDraft {
            title: "Login button misaligned".into(),
            description: "On mobile".into(),
            priority: Some(Priority::Low),
            ..IssueDraft::default()
        };
        let mut form = CreateIssueForm::new(c.api.clone(), mount(&c, Route::CreateIssue), draft);
        assert_eq!(form.load().await, Outcome::Applied);
        assert!(form.can_create());
        assert_eq!(form.draft.project_id, Some(10));
        assert_eq!(form.draft.assignee_id, Some(1));

        assert_eq!(form.submit().await, Outcome::Applied);

        let issues = IssuesController::new(c.api.clone(), mount(&c, Route::Issues));
        issues.load().await;
        let created = issues.find(1001).unwrap();
        assert_eq!(created.title, "Login button misaligned");
        assert_eq!(created.priority, Priority::Low);
        assert_eq!(created.status, IssueStatus::Open);
        assert_eq!(created.project.unwrap().name, "Core");
        assert!(created.created_at.is_some());

        let backend = backend.lock().unwrap();
        let post = backend
            .requests
            .iter()
            .find(|r| r.method == "POST" && r.path == "/api/issues")
            .unwrap();
        assert_eq!(post.query.as_deref(), Some("projectId=10&userId=1"));
    }

    #[tokio::test]
    async fn test_create_form_surfaces_backend_message() {
        let (base, _backend) = mock::spawn(mock::Backend::seeded()).await;
        let c = logged_in(&base);

        let draft = IssueDraft {
            title: "Orphan".into(),
            project_id: Some(404),
            assignee_id: Some(1),
            ..IssueDraft::default()
        };
        let mut form = CreateIssueForm::new(c.api.clone(), mount(&c, Route::CreateIssue), draft);
        form.load().await;
        assert_eq!(form.submit().await, Outcome::Failed);
        assert_eq!(form.error(), Some("Project not found"));
        assert_eq!(form.draft.title, "Orphan");
    }

    #[tokio::test]
    async fn test_create_form_without_references() {
        let mut seeded = mock::Backend::seeded();
        seeded.projects.clear();
        let (base, _backend) = mock::spawn(seeded).await;
        let c = logged_in(&base);

        let mut form = CreateIssueForm::new(
            c.api.clone(),
            mount(&c, Route::CreateIssue),
            IssueDraft::default(),
        );
        assert_eq!(form.load().await, Outcome::Applied);
        assert!(!form.can_create());
        assert_eq!(form.draft.project_id, None);
    }
}

// =============================================================================
// CLI
// =============================================================================

mod cli {
    use assert_cmd::Command;
    use assert_cmd::cargo::cargo_bin_cmd;
    use predicates::prelude::*;
    use tempfile::TempDir;

    use super::mock;

    /// A `bugtracker` command isolated from the user's config and session.
    fn bugtracker(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("bugtracker");
        cmd.current_dir(home.path())
            .env("BUGTRACKER_CONFIG", home.path().join("bugtracker.toml"))
            .env("BUGTRACKER_SESSION_DIR", home.path().join("session"))
            .env_remove("BUGTRACKER_API_URL")
            .env_remove("BUGTRACKER_LOG");
        cmd
    }

    #[test]
    fn test_help() {
        let home = TempDir::new().unwrap();
        bugtracker(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("issues"));
    }

    #[test]
    fn test_protected_command_without_session_redirects() {
        let home = TempDir::new().unwrap();
        bugtracker(&home)
            .arg("projects")
            .assert()
            .failure()
            .stderr(predicate::str::contains("requires a session"));
    }

    #[test]
    fn test_invalid_status_is_a_usage_error() {
        let home = TempDir::new().unwrap();
        bugtracker(&home)
            .args(["issues", "status", "1", "DONE"])
            .assert()
            .failure();
    }

    #[test]
    fn test_config_init_writes_file() {
        let home = TempDir::new().unwrap();
        bugtracker(&home)
            .args(["config", "init", "--api-url", "http://bugs.test/api"])
            .assert()
            .success();
        let written = std::fs::read_to_string(home.path().join("bugtracker.toml")).unwrap();
        assert!(written.contains("http://bugs.test/api"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_login_then_list_issues() {
        let (base, _backend) = mock::spawn(mock::Backend::seeded()).await;
        let home = TempDir::new().unwrap();

        let home = tokio::task::spawn_blocking(move || {
            bugtracker(&home)
                .args(["login", "--email", "a@b.com", "--password", "secret"])
                .args(["--api-url", base.as_str()])
                .assert()
                .success()
                .stdout(predicate::str::contains("Welcome back"));

            bugtracker(&home)
                .arg("whoami")
                .assert()
                .success()
                .stdout(predicate::str::contains("a@b.com"));

            bugtracker(&home)
                .args(["issues", "--api-url", base.as_str()])
                .assert()
                .success()
                .stdout(predicate::str::contains("Crash on save"));

            bugtracker(&home).arg("logout").assert().success();
            bugtracker(&home).arg("whoami").assert().failure();
            home
        })
        .await
        .unwrap();
        drop(home);
    }
}
