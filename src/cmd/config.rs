//! Configuration view and setup — `bugtracker config`.

use anyhow::{Context, Result};
use std::process::ExitCode;

use super::super::{Cli, ConfigCommands};

pub fn cmd_config(cli: &Cli, command: Option<ConfigCommands>) -> Result<ExitCode> {
    use bugtracker::config::{CONFIG_FILE_NAME, ClientConfig, CliOverrides, ConfigFile};

    let overrides = CliOverrides {
        api_url: cli.api_url.clone(),
        session_dir: cli.session_dir.clone(),
    };

    match command {
        None | Some(ConfigCommands::Show) => {
            let config = ClientConfig::load(&overrides)?;
            bugtracker::logging::init(cli.verbose, &config.log_level, config.log_json);

            println!();
            println!("BugTracker Configuration");
            println!("========================");
            println!();
            match &config.config_path {
                Some(path) => println!("Config file: {}", path.display()),
                None => println!("No {} found, using defaults", CONFIG_FILE_NAME),
            }
            println!();
            println!("Effective values (with env/CLI overrides):");
            println!("  api.url       = \"{}\"", config.api_url);
            println!("  session.dir   = \"{}\"", config.session_dir.display());
            println!("  logging.level = \"{}\"", config.log_level);
            println!("  logging.json  = {}", config.log_json);
            println!();
            Ok(ExitCode::SUCCESS)
        }
        Some(ConfigCommands::Init) => {
            let path = ConfigFile::default_path()
                .context("Could not determine a config directory; set BUGTRACKER_CONFIG")?;
            if path.exists() {
                println!("Config already exists at {}", path.display());
                return Ok(ExitCode::SUCCESS);
            }

            let mut file = ConfigFile::default();
            file.api.url = Some(
                overrides
                    .api_url
                    .clone()
                    .unwrap_or_else(|| bugtracker::api::DEFAULT_BASE_URL.to_string()),
            );
            file.session.dir = overrides.session_dir.clone();
            file.save(&path)?;
            println!("Created {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}
