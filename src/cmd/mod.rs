//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module      | Commands handled                              |
//! |-------------|-----------------------------------------------|
//! | `auth`      | `Login`, `Register`, `Logout`, `Whoami`       |
//! | `dashboard` | `Dashboard`                                   |
//! | `projects`  | `Projects`                                    |
//! | `issues`    | `Issues`                                      |
//! | `users`     | `Users`                                       |
//! | `open`      | `Open`                                        |
//! | `config`    | `Config`                                      |
//!
//! Every view goes through [`App::mount`], so protected commands hit the same
//! route guard and 401 handling whichever way they are reached.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod issues;
pub mod open;
pub mod projects;
pub mod users;

pub use auth::{cmd_login, cmd_logout, cmd_register, cmd_whoami};
pub use config::cmd_config;
pub use dashboard::cmd_dashboard;
pub use issues::cmd_issues;
pub use open::cmd_open;
pub use projects::cmd_projects;
pub use users::cmd_users;

use anyhow::{Context, Result};
use console::style;
use std::process::ExitCode;
use std::sync::Arc;

use bugtracker::api::ApiClient;
use bugtracker::config::{ClientConfig, CliOverrides};
use bugtracker::controller::Outcome;
use bugtracker::router::{Navigation, Navigator, Route, ViewScope};
use bugtracker::session::{FileStore, SessionStore};
use bugtracker::ui::icons::{LOCK, WARN};
use bugtracker::ui::render;

use super::Cli;

/// Everything a command needs: resolved config, the persisted session, the
/// API client bound to it and the navigator listening for expiries.
pub struct App {
    pub config: ClientConfig,
    pub session: Arc<SessionStore>,
    pub api: Arc<ApiClient>,
    pub navigator: Navigator,
    assume_yes: bool,
}

impl App {
    pub fn build(cli: &Cli) -> Result<Self> {
        let config = ClientConfig::load(&CliOverrides {
            api_url: cli.api_url.clone(),
            session_dir: cli.session_dir.clone(),
        })?;
        bugtracker::logging::init(cli.verbose, &config.log_level, config.log_json);
        tracing::debug!(api_url = %config.api_url, session_dir = %config.session_dir.display(), "configuration resolved");

        let store = FileStore::new(&config.session_dir);
        let session = Arc::new(SessionStore::open(store).with_context(|| {
            format!("Failed to open session in {}", config.session_dir.display())
        })?);
        let api = Arc::new(ApiClient::new(config.api_url.clone(), session.clone()));
        let navigator = Navigator::new(session.clone(), api.subscribe());

        Ok(Self {
            config,
            session,
            api,
            navigator,
            assume_yes: cli.yes,
        })
    }

    /// Navigate to `route`. Returns the view's scope, or `None` after printing
    /// the login hint when the guard redirected.
    pub fn mount(&self, route: Route) -> Option<ViewScope> {
        Self::rendered(self.navigator.navigate(route))
    }

    /// Like [`App::mount`], for a raw path such as `/projects`.
    pub fn mount_path(&self, path: &str) -> Option<ViewScope> {
        Self::rendered(self.navigator.navigate_path(path))
    }

    fn rendered(navigation: Navigation) -> Option<ViewScope> {
        match navigation {
            Navigation::Rendered(scope) => Some(scope),
            Navigation::Redirected { from, .. } => {
                eprintln!(
                    "{}{} requires a session. Run `bugtracker login` first.",
                    LOCK,
                    from.title()
                );
                None
            }
        }
    }

    /// Ask before a destructive action; `--yes` answers for the user.
    pub fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    /// Report how a view operation ended and pick the exit status.
    /// `error` is the view's inline error, printed for failed operations.
    pub fn finish(&self, outcome: Outcome, error: Option<&str>) -> ExitCode {
        match outcome {
            Outcome::Applied => ExitCode::SUCCESS,
            Outcome::Declined => {
                println!("Cancelled.");
                ExitCode::SUCCESS
            }
            Outcome::Rejected | Outcome::Failed => {
                if let Some(message) = error {
                    eprintln!("{}", render::error_banner(message));
                }
                ExitCode::FAILURE
            }
            Outcome::Expired => {
                self.report_expired();
                ExitCode::FAILURE
            }
            Outcome::Busy => {
                eprintln!("{}That row is already being updated.", WARN);
                ExitCode::FAILURE
            }
            Outcome::Stale => ExitCode::FAILURE,
        }
    }

    fn report_expired(&self) {
        let endpoint = self.navigator.take_expired();
        match endpoint {
            Some(endpoint) => eprintln!(
                "{}Session expired ({} returned 401). Run `bugtracker login` again.",
                LOCK,
                style(endpoint).dim()
            ),
            None => eprintln!("{}Session expired. Run `bugtracker login` again.", LOCK),
        }
    }
}
