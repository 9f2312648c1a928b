//! Issues and create-issue views — `bugtracker issues`.

use std::process::ExitCode;

use bugtracker::controller::create_issue::MISSING_REFERENCES;
use bugtracker::controller::{CreateIssueForm, IssuesController, Outcome};
use bugtracker::router::{Route, ViewScope};
use bugtracker::ui::icons::CHECK;
use bugtracker::ui::{LoadingIndicator, render};
use bugtracker::validate::IssueDraft;

use super::super::IssuesCommands;
use super::App;

pub async fn cmd_issues(app: &App, command: Option<IssuesCommands>) -> ExitCode {
    if let Some(IssuesCommands::Create {
        title,
        description,
        project,
        assignee,
        priority,
    }) = command
    {
        let draft = IssueDraft {
            title,
            description,
            project_id: project,
            assignee_id: assignee,
            priority,
        };
        return match app.mount(Route::CreateIssue) {
            Some(scope) => create(app, scope, draft).await,
            None => ExitCode::FAILURE,
        };
    }

    let Some(scope) = app.mount(Route::Issues) else {
        return ExitCode::FAILURE;
    };
    let issues = IssuesController::new(app.api.clone(), scope);

    match command {
        None | Some(IssuesCommands::List) => list(app, &issues).await,
        Some(IssuesCommands::Status { id, status }) => {
            let loaded = load(&issues).await;
            if loaded == Outcome::Expired {
                return app.finish(loaded, None);
            }
            let outcome = issues.update_status(id, status).await;
            match outcome {
                Outcome::Applied => {
                    println!("{}Issue #{} is now {}", CHECK, id, status.label());
                    print_issues(&issues);
                    ExitCode::SUCCESS
                }
                Outcome::Failed => {
                    print_issues(&issues);
                    ExitCode::FAILURE
                }
                other => app.finish(other, issues.error().as_deref()),
            }
        }
        Some(IssuesCommands::Delete { id }) => {
            let loaded = load(&issues).await;
            if loaded == Outcome::Expired {
                return app.finish(loaded, None);
            }
            if let Some(issue) = issues.find(id) {
                println!("Issue #{}: {}", id, issue.title);
            }

            let confirm = |prompt: &str| app.confirm(prompt);
            let outcome = issues.delete(id, &confirm).await;
            match outcome {
                Outcome::Applied => {
                    println!("{}Issue #{} deleted", CHECK, id);
                    print_issues(&issues);
                    ExitCode::SUCCESS
                }
                Outcome::Failed => {
                    print_issues(&issues);
                    ExitCode::FAILURE
                }
                other => app.finish(other, issues.error().as_deref()),
            }
        }
        Some(IssuesCommands::Create { .. }) => unreachable!("handled above"),
    }
}

/// Render the issues view for `open /issues`.
pub(crate) async fn show_issues(app: &App, scope: ViewScope) -> ExitCode {
    list(app, &IssuesController::new(app.api.clone(), scope)).await
}

/// Render the create-issue form's reference data for `open /create-issue`.
pub(crate) async fn show_form(app: &App, scope: ViewScope) -> ExitCode {
    let mut form = CreateIssueForm::new(app.api.clone(), scope, IssueDraft::default());
    let outcome = load_form(&mut form).await;
    if outcome != Outcome::Applied {
        return app.finish(outcome, form.error());
    }
    if !form.can_create() {
        println!("{}", MISSING_REFERENCES);
        return ExitCode::SUCCESS;
    }
    println!("Projects:");
    print!("{}", render::project_table(form.projects()));
    println!();
    println!("Assignees:");
    print!("{}", render::user_table(form.users()));
    ExitCode::SUCCESS
}

async fn create(app: &App, scope: ViewScope, draft: IssueDraft) -> ExitCode {
    let mut form = CreateIssueForm::new(app.api.clone(), scope, draft);

    let outcome = load_form(&mut form).await;
    if outcome != Outcome::Applied {
        return app.finish(outcome, form.error());
    }
    if !form.can_create() {
        eprintln!("{}", render::error_banner(MISSING_REFERENCES));
        return ExitCode::FAILURE;
    }

    let outcome = form.submit().await;
    if !outcome.is_applied() {
        return app.finish(outcome, form.error());
    }

    let project = form
        .projects()
        .iter()
        .find(|p| Some(p.id) == form.draft.project_id)
        .map(|p| p.name.clone())
        .unwrap_or_default();
    let assignee = form
        .users()
        .iter()
        .find(|u| Some(u.id) == form.draft.assignee_id)
        .map(|u| u.name.clone())
        .unwrap_or_default();
    println!(
        "{}Issue \"{}\" created in {} for {}",
        CHECK,
        form.draft.title.trim(),
        project,
        assignee
    );

    match app.mount(Route::Issues) {
        Some(scope) => show_issues(app, scope).await,
        None => ExitCode::FAILURE,
    }
}

async fn load_form(form: &mut CreateIssueForm) -> Outcome {
    let spinner = LoadingIndicator::start("Loading projects and users...");
    let outcome = form.load().await;
    spinner.finish();
    outcome
}

async fn list(app: &App, issues: &IssuesController) -> ExitCode {
    let outcome = load(issues).await;
    if outcome != Outcome::Applied {
        return app.finish(outcome, issues.error().as_deref());
    }
    print_issues(issues);
    ExitCode::SUCCESS
}

async fn load(issues: &IssuesController) -> Outcome {
    let spinner = LoadingIndicator::start("Loading issues...");
    let outcome = issues.load().await;
    spinner.finish();
    outcome
}

fn print_issues(issues: &IssuesController) {
    let state = issues.snapshot();
    if let Some(error) = &state.error {
        eprintln!("{}", render::error_banner(error));
    }
    print!(
        "{}",
        render::issue_table(&state.items, |id| issues.is_in_flight(id))
    );
}
