use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use bugtracker::api::{IssueStatus, Priority, Role};

mod cmd;

#[derive(Parser)]
#[command(name = "bugtracker")]
#[command(version, about = "Terminal client for the BugTracker issue tracker")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Answer yes to delete confirmations
    #[arg(long, global = true)]
    pub yes: bool,

    /// Backend base URL including /api (overrides BUGTRACKER_API_URL and the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the stored session (overrides BUGTRACKER_SESSION_DIR)
    #[arg(long, global = true)]
    pub session_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        email: Option<String>,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
        /// DEVELOPER, TESTER, MANAGER or ADMIN
        #[arg(short, long, default_value = "DEVELOPER")]
        role: Role,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Overview of projects, issues and team members
    Dashboard,
    /// List, create or delete projects
    Projects {
        #[command(subcommand)]
        command: Option<ProjectsCommands>,
    },
    /// List, create, update or delete issues
    Issues {
        #[command(subcommand)]
        command: Option<IssuesCommands>,
    },
    /// List users that issues can be assigned to
    Users,
    /// Open a view by path, e.g. /projects
    Open { path: String },
    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ProjectsCommands {
    /// List all projects
    List,
    /// Create a project
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete a project
    Delete { id: i64 },
}

#[derive(Subcommand, Clone)]
pub enum IssuesCommands {
    /// List all issues
    List,
    /// File a new issue
    Create {
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Project id (defaults to the first project)
        #[arg(long)]
        project: Option<i64>,
        /// Assignee user id (defaults to the first user)
        #[arg(long)]
        assignee: Option<i64>,
        /// LOW, MEDIUM, HIGH or CRITICAL
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Change an issue's status
    Status {
        id: i64,
        /// OPEN, IN_PROGRESS, RESOLVED or CLOSED
        status: IssueStatus,
    },
    /// Delete an issue
    Delete { id: i64 },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Write a default bugtracker.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Commands::Config { command } = &cli.command {
        return cmd::cmd_config(&cli, command.clone());
    }

    let app = cmd::App::build(&cli)?;

    let code = match &cli.command {
        Commands::Login { email, password } => {
            cmd::cmd_login(&app, email.clone(), password.clone()).await?
        }
        Commands::Register {
            name,
            email,
            password,
            role,
        } => cmd::cmd_register(&app, name, email, password.clone(), *role).await?,
        Commands::Logout => cmd::cmd_logout(&app)?,
        Commands::Whoami => cmd::cmd_whoami(&app),
        Commands::Dashboard => cmd::cmd_dashboard(&app).await,
        Commands::Projects { command } => cmd::cmd_projects(&app, command.clone()).await,
        Commands::Issues { command } => cmd::cmd_issues(&app, command.clone()).await,
        Commands::Users => cmd::cmd_users(&app).await,
        Commands::Open { path } => cmd::cmd_open(&app, path).await,
        Commands::Config { .. } => unreachable!("handled before the session is opened"),
    };

    Ok(code)
}
