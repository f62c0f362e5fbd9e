//! # mw-config
//!
//! Runtime settings. Sources, lowest precedence first: built-in defaults, a
//! `.env` file in the working directory, then `MOVEWIKI_*` environment
//! variables (e.g. `MOVEWIKI_PORT=3000`).

use config::{Config, Environment};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_PREFIX: &str = "MOVEWIKI";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// May carry credentials for non-file databases
    pub database_url: SecretString,
    /// Absolute origin used for links in the RSS feed
    pub public_url: String,
    pub static_dir: PathBuf,
    /// Default number of moves per index page
    pub page_size: i64,
    /// Number of moves in the RSS feed
    pub feed_size: i64,
}

impl Settings {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => log::info!("loaded environment from {}", path.display()),
            Err(e) if e.not_found() => log::debug!("no .env file"),
            Err(e) => log::warn!("ignoring unreadable .env file: {e}"),
        }
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    /// Builds settings from defaults overlaid with `env`.
    pub fn from_env(env: Environment) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("database_url", "sqlite:movewiki.db")?
            .set_default("public_url", "http://127.0.0.1:8080")?
            .set_default("static_dir", "./static")?
            .set_default("page_size", 20)?
            .set_default("feed_size", 20)?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.check()
    }

    fn check(mut self) -> Result<Self, ConfigError> {
        if !(1..=50).contains(&self.page_size) {
            return Err(ConfigError::Invalid {
                key: "page_size",
                reason: format!("{} is outside 1..=50", self.page_size),
            });
        }
        if self.feed_size < 1 {
            return Err(ConfigError::Invalid {
                key: "feed_size",
                reason: "must be at least 1".into(),
            });
        }
        self.public_url = self.public_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn defaults_apply() {
        let settings = Settings::from_env(env(&[])).unwrap();
        assert_eq!(settings.bind_addr(), ("127.0.0.1".to_string(), 8080));
        assert_eq!(settings.database_url.expose_secret(), "sqlite:movewiki.db");
        assert_eq!(settings.page_size, 20);
    }

    #[test]
    fn environment_overrides() {
        let settings = Settings::from_env(env(&[
            ("MOVEWIKI_PORT", "3000"),
            ("MOVEWIKI_DATABASE_URL", "sqlite::memory:"),
            ("MOVEWIKI_PUBLIC_URL", "https://moves.example/"),
        ]))
        .unwrap();
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.database_url.expose_secret(), "sqlite::memory:");
        assert_eq!(settings.public_url, "https://moves.example");
    }

    #[test]
    fn oversized_page_is_rejected() {
        let err = Settings::from_env(env(&[("MOVEWIKI_PAGE_SIZE", "500")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "page_size", .. }));
    }
}
