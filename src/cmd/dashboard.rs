//! Dashboard view — `bugtracker dashboard`.

use std::process::ExitCode;

use bugtracker::controller::{Dashboard, Outcome};
use bugtracker::router::{Route, ViewScope};
use bugtracker::ui::{LoadingIndicator, render};

use super::App;

pub async fn cmd_dashboard(app: &App) -> ExitCode {
    match app.mount(Route::Dashboard) {
        Some(scope) => show_dashboard(app, scope).await,
        None => ExitCode::FAILURE,
    }
}

pub(crate) async fn show_dashboard(app: &App, scope: ViewScope) -> ExitCode {
    let mut dashboard = Dashboard::new(app.api.clone(), scope);

    let spinner = LoadingIndicator::start("Loading dashboard...");
    let outcome = dashboard.load().await;
    spinner.finish();

    match outcome {
        // Counts stay at zero when loading fails; the greeting still renders.
        Outcome::Applied | Outcome::Failed => {
            let name = Dashboard::display_name(&app.session);
            println!("{}", render::dashboard(&name, dashboard.stats()));
            ExitCode::SUCCESS
        }
        other => app.finish(other, None),
    }
}
