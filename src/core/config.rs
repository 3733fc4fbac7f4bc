use crate::core::{Repository, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const GLOBAL_CONFIG_FILE: &str = ".minigitconfig";
const AUTHOR_ENV: &str = "MINIGIT_AUTHOR";

/// Flat `section.key = value` settings stored as JSON.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    settings: BTreeMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(GLOBAL_CONFIG_FILE))
    }

    pub fn load_global() -> Result<Self> {
        match Self::global_path() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_repo(repo: &Repository) -> Result<Self> {
        Self::load_from_file(&repo.config_file())
    }

    /// Global settings overlaid with the repository's own.
    pub fn load_merged(repo: &Repository) -> Result<Self> {
        let mut config = Self::load_global()?;
        config.settings.extend(Self::load_repo(repo)?.settings);
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_global(&self) -> Result<()> {
        match Self::global_path() {
            Some(path) => self.save_to_file(&path),
            None => Err(crate::core::Error::InvalidInput(
                "cannot find home directory".to_string(),
            )),
        }
    }

    pub fn save_repo(&self, repo: &Repository) -> Result<()> {
        self.save_to_file(&repo.config_file())
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self)?;
        crate::utils::fs::write_atomic(path, content.as_bytes())?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.settings.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.settings.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.settings.iter()
    }

    pub fn get_user_name(&self) -> String {
        self.get("user.name")
            .cloned()
            .or_else(|| {
                std::env::var(AUTHOR_ENV)
                    .ok()
                    .and_then(|s| s.split('<').next().map(|n| n.trim().to_string()))
                    .filter(|n| !n.is_empty())
            })
            .unwrap_or_else(whoami::username)
    }

    pub fn get_user_email(&self) -> Option<String> {
        self.get("user.email").cloned().or_else(|| {
            std::env::var(AUTHOR_ENV).ok().and_then(|s| {
                s.split('<')
                    .nth(1)
                    .and_then(|e| e.split('>').next())
                    .map(|e| e.trim().to_string())
            })
        })
    }

    /// `name <email>` when an email is configured, otherwise just the name.
    pub fn get_author_string(&self) -> String {
        match self.get_user_email() {
            Some(email) if !email.is_empty() => format!("{} <{}>", self.get_user_name(), email),
            _ => self.get_user_name(),
        }
    }
}
