//! Assignable users — `bugtracker users`.
//!
//! Users are reference data for the create-issue form, so the list is shown
//! under that view's route.

use std::process::ExitCode;

use bugtracker::controller::{Outcome, UsersController};
use bugtracker::router::{Route, ViewScope};
use bugtracker::ui::{LoadingIndicator, render};

use super::App;

pub async fn cmd_users(app: &App) -> ExitCode {
    match app.mount(Route::CreateIssue) {
        Some(scope) => show_users(app, scope).await,
        None => ExitCode::FAILURE,
    }
}

pub(crate) async fn show_users(app: &App, scope: ViewScope) -> ExitCode {
    let users = UsersController::new(app.api.clone(), scope);

    let spinner = LoadingIndicator::start("Loading users...");
    let outcome = users.load().await;
    spinner.finish();

    if outcome != Outcome::Applied {
        return app.finish(outcome, users.error().as_deref());
    }
    print!("{}", render::user_table(&users.items()));
    ExitCode::SUCCESS
}
