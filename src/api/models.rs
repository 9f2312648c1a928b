use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::session::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Open,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
        IssueStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }

    /// Human label, e.g. "IN PROGRESS".
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_enum_input(s).as_str() {
            "OPEN" => Ok(Self::Open),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "RESOLVED" => Ok(Self::Resolved),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(format!(
                "Invalid status: {}. Valid values: OPEN, IN_PROGRESS, RESOLVED, CLOSED",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_enum_input(s).as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(format!(
                "Invalid priority: {}. Valid values: LOW, MEDIUM, HIGH, CRITICAL",
                s
            )),
        }
    }
}

/// Roles offered by the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Developer,
    Tester,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Developer, Role::Tester, Role::Manager, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Developer => "DEVELOPER",
            Self::Tester => "TESTER",
            Self::Manager => "MANAGER",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_enum_input(s).as_str() {
            "DEVELOPER" => Ok(Self::Developer),
            "TESTER" => Ok(Self::Tester),
            "MANAGER" => Ok(Self::Manager),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!(
                "Invalid role: {}. Valid values: DEVELOPER, TESTER, MANAGER, ADMIN",
                s
            )),
        }
    }
}

/// Accept `in progress`, `in-progress` and `In_Progress` alike.
fn normalize_enum_input(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace([' ', '-'], "_")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Read-only project view embedded in an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Read-only user view embedded in an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserRef {
    pub fn display(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: IssueStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default)]
    pub assigned_user: Option<UserRef>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated_at: Option<NaiveDateTime>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamps are display-only; a format we cannot read becomes `None`
/// instead of failing the whole list.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse::<NaiveDateTime>().ok()))
}

// ── Request payloads ─────────────────────────────────────────────────
//
// Built by `crate::validate`; holding one means the form passed validation.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(skip)]
    pub project_id: i64,
    #[serde(skip)]
    pub user_id: i64,
}

// ── Login response ───────────────────────────────────────────────────

/// Token plus optional profile extracted from a login response.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub user: Option<UserProfile>,
}

impl LoginResponse {
    /// Extract the token from any of the shapes the backend has used:
    /// a bare token (JSON string or plain text), `{token}` or `{accessToken}`.
    /// Profile fields are taken only when `name` is present.
    ///
    /// Returns `None` when no non-empty token can be found.
    pub fn from_body(body: &str) -> Option<Self> {
        let value = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => value,
            Err(_) => {
                let token = body.trim();
                return (!token.is_empty() && !token.contains(char::is_whitespace)).then(|| Self {
                    token: token.to_string(),
                    user: None,
                });
            }
        };

        match value {
            serde_json::Value::String(token) if !token.trim().is_empty() => Some(Self {
                token,
                user: None,
            }),
            serde_json::Value::Object(map) => {
                let token = ["token", "accessToken"]
                    .iter()
                    .filter_map(|key| map.get(*key).and_then(serde_json::Value::as_str))
                    .find(|t| !t.trim().is_empty())?
                    .to_string();

                let text = |key: &str| {
                    map.get(key)
                        .and_then(serde_json::Value::as_str)
                        .map(str::to_string)
                };
                let user = map.contains_key("name").then(|| UserProfile {
                    id: map.get("id").and_then(serde_json::Value::as_i64),
                    name: text("name").unwrap_or_default(),
                    email: text("email").unwrap_or_default(),
                    role: text("role")
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(crate::session::default_role),
                });

                Some(Self { token, user })
            }
            _ => None,
        }
    }
}
