//! Plain-text renderings of each view.
//!
//! Functions return `String`s so commands decide where output goes and tests
//! can inspect it.

use console::style;

use crate::api::{Issue, Project, User};
use crate::controller::DashboardStats;
use crate::ui::icons::{BUG, CROSS, FOLDER, USERS};

const EMPTY_CELL: &str = "—";

/// Red inline banner for validation and request errors.
pub fn error_banner(message: &str) -> String {
    format!("{}{}", CROSS, style(message).red())
}

pub fn project_table(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects yet. Create one to get started.".to_string();
    }
    let mut out = format!("{:<6} {:<28} Description\n", "ID", "Name");
    out.push_str(&format!("{:<6} {:<28} -----------\n", "------", "-".repeat(28)));
    for p in projects {
        out.push_str(&format!(
            "{:<6} {:<28} {}\n",
            p.id,
            truncate(&p.name, 28),
            p.description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(EMPTY_CELL)
        ));
    }
    out
}

/// Issues table. Rows whose id is in flight are marked as updating.
pub fn issue_table(issues: &[Issue], in_flight: impl Fn(i64) -> bool) -> String {
    if issues.is_empty() {
        return "No issues yet. Create one with `bugtracker issues create`.".to_string();
    }
    let mut out = format!(
        "{:<6} {:<30} {:<13} {:<9} {:<18} Assignee\n",
        "ID", "Title", "Status", "Priority", "Project"
    );
    out.push_str(&format!(
        "{:<6} {:<30} {:<13} {:<9} {:<18} --------\n",
        "------",
        "-".repeat(30),
        "-".repeat(13),
        "-".repeat(9),
        "-".repeat(18)
    ));
    for issue in issues {
        let status = if in_flight(issue.id) {
            format!("{}…", issue.status.label())
        } else {
            issue.status.label()
        };
        out.push_str(&format!(
            "{:<6} {:<30} {:<13} {:<9} {:<18} {}\n",
            issue.id,
            truncate(&issue.title, 30),
            status,
            issue.priority.as_str(),
            truncate(
                issue
                    .project
                    .as_ref()
                    .map(|p| p.name.as_str())
                    .filter(|n| !n.is_empty())
                    .unwrap_or(EMPTY_CELL),
                18
            ),
            issue
                .assigned_user
                .as_ref()
                .and_then(|u| u.display())
                .unwrap_or(EMPTY_CELL)
        ));
    }
    out
}

pub fn user_table(users: &[User]) -> String {
    if users.is_empty() {
        return "No users yet.".to_string();
    }
    let mut out = format!("{:<6} {:<24} Email\n", "ID", "Name");
    out.push_str(&format!("{:<6} {:<24} -----\n", "------", "-".repeat(24)));
    for u in users {
        out.push_str(&format!("{:<6} {:<24} {}\n", u.id, truncate(&u.name, 24), u.email));
    }
    out
}

pub fn dashboard(display_name: &str, stats: DashboardStats) -> String {
    format!(
        "Welcome back, {}\n\n  {}{:>4}  Active Projects\n  {}{:>4}  Open Issues\n  {}{:>4}  Team Members\n",
        style(display_name).bold(),
        FOLDER,
        stats.projects,
        BUG,
        stats.issues,
        USERS,
        stats.users
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
