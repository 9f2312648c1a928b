//! Session commands — `bugtracker login|register|logout|whoami`.

use anyhow::{Context, Result};
use console::style;
use std::process::ExitCode;

use bugtracker::api::Role;
use bugtracker::auth::{self, AuthError};
use bugtracker::router::Route;
use bugtracker::ui::icons::{CHECK, LOCK};
use bugtracker::ui::render;
use bugtracker::validate::{Credentials, Registration};

use super::App;
use super::dashboard::show_dashboard;

pub async fn cmd_login(
    app: &App,
    email: Option<String>,
    password: Option<String>,
) -> Result<ExitCode> {
    if app.mount(Route::Login).is_none() {
        return Ok(ExitCode::FAILURE);
    }

    let email = match email {
        Some(email) => email,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read email")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    match auth::login(&app.api, &Credentials { email, password }).await {
        Ok(session) => {
            let name = session
                .user
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_else(|| "User".to_string());
            println!("{}Logged in as {}", CHECK, style(name).bold());
            println!();
            match app.mount(Route::Dashboard) {
                Some(scope) => Ok(show_dashboard(app, scope).await),
                None => Ok(ExitCode::FAILURE),
            }
        }
        Err(e) => Ok(report(e)),
    }
}

pub async fn cmd_register(
    app: &App,
    name: &str,
    email: &str,
    password: Option<String>,
    role: Role,
) -> Result<ExitCode> {
    if app.mount(Route::Register).is_none() {
        return Ok(ExitCode::FAILURE);
    }
    let password = match password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let form = Registration {
        name: name.to_string(),
        email: email.to_string(),
        password,
        role: Some(role),
    };
    match auth::register(&app.api, &form).await {
        Ok(message) => {
            let message = message.trim();
            if message.is_empty() {
                println!("{}Account created for {}", CHECK, email);
            } else {
                println!("{}{}", CHECK, message);
            }
            app.mount(Route::Login);
            println!("Log in with `bugtracker login --email {}`", email);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report(e)),
    }
}

pub fn cmd_logout(app: &App) -> Result<ExitCode> {
    auth::logout(&app.session).context("Failed to clear stored session")?;
    app.mount(Route::Login);
    println!("{}Logged out", CHECK);
    Ok(ExitCode::SUCCESS)
}

pub fn cmd_whoami(app: &App) -> ExitCode {
    let Some(session) = app.session.session() else {
        println!("{}Not logged in", LOCK);
        return ExitCode::FAILURE;
    };
    match session.user {
        Some(user) => {
            println!("Name:  {}", user.display_name());
            if !user.email.is_empty() {
                println!("Email: {}", user.email);
            }
            println!("Role:  {}", user.role);
        }
        None => println!("Logged in (no profile stored)"),
    }
    println!("API:   {}", app.config.api_url);
    ExitCode::SUCCESS
}

fn prompt_password() -> Result<String> {
    dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")
}

fn report(error: AuthError) -> ExitCode {
    if let AuthError::Rejected { source, .. } = &error {
        tracing::debug!(error = %source, "auth request rejected");
    }
    eprintln!("{}", render::error_banner(&error.to_string()));
    ExitCode::FAILURE
}
