//! HTTP gateway to the BugTracker backend.
//!
//! | Module    | Responsibility                                              |
//! |-----------|-------------------------------------------------------------|
//! | `client`  | `ApiClient`: credential injection, 401 teardown, endpoints  |
//! | `models`  | Wire types: `Project`, `Issue`, `User`, request payloads    |

pub mod client;
pub mod models;

pub use client::{ApiClient, DEFAULT_BASE_URL, SessionEvent};
pub use models::{
    Issue, IssueStatus, LoginRequest, LoginResponse, NewIssue, NewProject, Priority, Project,
    ProjectRef, RegisterRequest, Role, User, UserRef,
};
