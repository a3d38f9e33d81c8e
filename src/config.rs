use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::domain::models::Credentials;

/// Portal configuration from `config.toml`. Empty credentials are a config
/// error reported before any network activity.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Override for the session blob location.
    #[serde(default)]
    pub session_path: Option<PathBuf>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("parse config {}", path.display()))?;

        if config.base_url.trim().is_empty() {
            bail!("config must set base_url");
        }
        if config.username.is_empty() || config.password.is_empty() {
            bail!("config must set username and password");
        }
        Ok(config)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    pub fn session_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.session_path {
            return Ok(path.clone());
        }
        let home = std::env::var("HOME").context("HOME not set")?;
        Ok(PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("vinlink")
            .join("session.json"))
    }
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home).join(".config/vinlink/config.toml"))
}
