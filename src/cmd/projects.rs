//! Projects view — `bugtracker projects`.

use std::process::ExitCode;

use bugtracker::controller::{Outcome, ProjectsController};
use bugtracker::router::{Route, ViewScope};
use bugtracker::ui::icons::CHECK;
use bugtracker::ui::{LoadingIndicator, render};
use bugtracker::validate::ProjectDraft;

use super::super::ProjectsCommands;
use super::App;

pub async fn cmd_projects(app: &App, command: Option<ProjectsCommands>) -> ExitCode {
    let Some(scope) = app.mount(Route::Projects) else {
        return ExitCode::FAILURE;
    };
    let projects = ProjectsController::new(app.api.clone(), scope);

    match command {
        None | Some(ProjectsCommands::List) => list(app, &projects).await,
        Some(ProjectsCommands::Create { name, description }) => {
            let draft = ProjectDraft { name, description };
            let outcome = projects.create(&draft).await;
            if !outcome.is_applied() {
                return app.finish(outcome, projects.error().as_deref());
            }
            println!("{}Project created", CHECK);
            print_projects(&projects);
            ExitCode::SUCCESS
        }
        Some(ProjectsCommands::Delete { id }) => {
            let loaded = load(&projects).await;
            if loaded == Outcome::Expired {
                return app.finish(loaded, None);
            }
            if let Some(project) = projects.find(id) {
                println!("Project #{}: {}", id, project.name);
            }

            let confirm = |prompt: &str| app.confirm(prompt);
            let outcome = projects.delete(id, &confirm).await;
            match outcome {
                Outcome::Applied => {
                    println!("{}Project #{} deleted", CHECK, id);
                    print_projects(&projects);
                    ExitCode::SUCCESS
                }
                Outcome::Failed => {
                    print_projects(&projects);
                    ExitCode::FAILURE
                }
                other => app.finish(other, projects.error().as_deref()),
            }
        }
    }
}

/// Render the projects view for `open /projects`.
pub(crate) async fn show_projects(app: &App, scope: ViewScope) -> ExitCode {
    list(app, &ProjectsController::new(app.api.clone(), scope)).await
}

async fn list(app: &App, projects: &ProjectsController) -> ExitCode {
    let outcome = load(projects).await;
    if outcome != Outcome::Applied {
        return app.finish(outcome, projects.error().as_deref());
    }
    print_projects(projects);
    ExitCode::SUCCESS
}

async fn load(projects: &ProjectsController) -> Outcome {
    let spinner = LoadingIndicator::start("Loading projects...");
    let outcome = projects.load().await;
    spinner.finish();
    outcome
}

fn print_projects(projects: &ProjectsController) {
    let state = projects.snapshot();
    if let Some(error) = &state.error {
        eprintln!("{}", render::error_banner(error));
    }
    print!("{}", render::project_table(&state.items));
}
