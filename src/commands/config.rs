use crate::core::{Config, Repository};
use anyhow::bail;
use colored::*;

pub enum ConfigAction {
    Set { key: String, value: String, global: bool },
    Get { key: String },
    List,
}

pub fn run(repo: Option<&Repository>, action: &ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Set { key, value, global } => {
            validate_config_key(key)?;
            if *global {
                let mut config = Config::load_global()?;
                config.set(key, value);
                config.save_global()?;
            } else {
                let Some(repo) = repo else {
                    bail!("not inside a repository; use --global");
                };
                let mut config = Config::load_repo(repo)?;
                config.set(key, value);
                config.save_repo(repo)?;
            }
            println!("{} {} = {}", "Set".green(), key.cyan(), value);
        }
        ConfigAction::Get { key } => match load(repo)?.get(key) {
            Some(value) => println!("{}", value),
            None => bail!("{} is not set", key),
        },
        ConfigAction::List => {
            let config = load(repo)?;
            if config.is_empty() {
                println!("{}", "No configuration set".yellow());
            }
            for (key, value) in config.iter() {
                println!("{} = {}", key.cyan(), value);
            }
        }
    }
    Ok(())
}

fn load(repo: Option<&Repository>) -> anyhow::Result<Config> {
    Ok(match repo {
        Some(repo) => Config::load_merged(repo)?,
        None => Config::load_global()?,
    })
}

fn validate_config_key(key: &str) -> anyhow::Result<()> {
    let allowed_keys = ["user.name", "user.email"];
    if !allowed_keys.contains(&key) {
        bail!("Invalid configuration key: {}", key);
    }
    Ok(())
}
