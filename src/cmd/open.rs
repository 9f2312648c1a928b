//! Route by path — `bugtracker open /projects`.

use std::process::ExitCode;

use bugtracker::router::Route;

use super::App;
use super::dashboard::show_dashboard;
use super::issues::{show_form, show_issues};
use super::projects::show_projects;

pub async fn cmd_open(app: &App, path: &str) -> ExitCode {
    let Some(scope) = app.mount_path(path) else {
        return ExitCode::FAILURE;
    };
    match scope.route() {
        Route::Dashboard => show_dashboard(app, scope).await,
        Route::Projects => show_projects(app, scope).await,
        Route::Issues => show_issues(app, scope).await,
        Route::CreateIssue => show_form(app, scope).await,
        Route::Login => {
            println!("Log in with `bugtracker login`.");
            ExitCode::SUCCESS
        }
        Route::Register => {
            println!("Create an account with `bugtracker register`.");
            ExitCode::SUCCESS
        }
    }
}
