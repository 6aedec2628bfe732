use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::db::error::DbError;

const DEFAULT_CONFIG_FILE_LOCATION_FROM_HOME: &str = ".config/bookstore/bookstore.toml";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USER: &str = "postgres";
const DEFAULT_PASSWORD: &str = "postgres";
const DEFAULT_DBNAME: &str = "bookstore";
const DEFAULT_MIN_CONNECTIONS: u32 = 5;
const DEFAULT_MAX_CONNECTIONS: u32 = 20;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub dbname: Option<String>,
    pub min_connections: Option<u32>,
    pub max_connections: Option<u32>,
}

/// Effective database settings. Connection parameters are passed through
/// to the pool unmodified; the sizing bounds are validated by
/// [`DatabaseSettings::validate`] before any connection attempt.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn validate(&self) -> Result<(), DbError> {
        if self.min_connections == 0 {
            return Err(DbError::Configuration(
                "min_connections must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(DbError::Configuration(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(DbError::Configuration(format!(
                "min_connections ({}) must not exceed max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }
}

pub struct ConfigManager;

impl ConfigManager {
    fn get_config_path() -> Option<PathBuf> {
        let path = homedir::get_my_home();

        match path {
            Ok(Some(path)) => {
                let path = path.join(DEFAULT_CONFIG_FILE_LOCATION_FROM_HOME);
                Some(path)
            }
            _ => None,
        }
    }

    fn load_settings_from_file(path: &PathBuf) -> Result<DatabaseSettings> {
        let config = std::fs::read_to_string(path)?;
        let config: ConfigFile = toml::from_str(&config)?;

        Ok(DatabaseSettings {
            host: config.host.unwrap_or(DEFAULT_HOST.to_string()),
            port: config.port.unwrap_or(DEFAULT_PORT),
            user: config.user.unwrap_or(DEFAULT_USER.to_string()),
            password: config.password.unwrap_or(DEFAULT_PASSWORD.to_string()),
            dbname: config.dbname.unwrap_or(DEFAULT_DBNAME.to_string()),
            min_connections: config.min_connections.unwrap_or(DEFAULT_MIN_CONNECTIONS),
            max_connections: config.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
        })
    }

    pub fn load_default_settings() -> DatabaseSettings {
        DatabaseSettings {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            dbname: DEFAULT_DBNAME.to_string(),
            min_connections: DEFAULT_MIN_CONNECTIONS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Loads settings from the config file if present, then applies
    /// environment overrides on top.
    pub fn load_settings() -> DatabaseSettings {
        let config_file_location = ConfigManager::get_config_path();

        let mut settings = if let Some(path) = config_file_location {
            let loaded = ConfigManager::load_settings_from_file(&path);
            if loaded.is_err() {
                println!(
                    "\nFailed to load config from {:?}, using default settings.\n",
                    path
                )
            }
            loaded.unwrap_or_else(|_| ConfigManager::load_default_settings())
        } else {
            ConfigManager::load_default_settings()
        };

        if let Ok(host) = std::env::var("BOOKSTORE_DB_HOST") {
            settings.host = host;
        }
        if let Ok(user) = std::env::var("BOOKSTORE_DB_USER") {
            settings.user = user;
        }
        if let Ok(password) = std::env::var("BOOKSTORE_DB_PASSWORD") {
            settings.password = password;
        }
        if let Ok(dbname) = std::env::var("BOOKSTORE_DB_NAME") {
            settings.dbname = dbname;
        }
        if let Ok(port) = std::env::var("BOOKSTORE_DB_PORT") {
            match port.parse() {
                Ok(port) => settings.port = port,
                Err(_) => log::warn!("ignoring unparseable BOOKSTORE_DB_PORT {port:?}"),
            }
        }
        if let Ok(min) = std::env::var("BOOKSTORE_DB_MIN_CONNECTIONS") {
            match min.parse() {
                Ok(min) => settings.min_connections = min,
                Err(_) => log::warn!("ignoring unparseable BOOKSTORE_DB_MIN_CONNECTIONS {min:?}"),
            }
        }
        if let Ok(max) = std::env::var("BOOKSTORE_DB_MAX_CONNECTIONS") {
            match max.parse() {
                Ok(max) => settings.max_connections = max,
                Err(_) => log::warn!("ignoring unparseable BOOKSTORE_DB_MAX_CONNECTIONS {max:?}"),
            }
        }

        settings
    }

    pub fn save_settings(settings: &DatabaseSettings) -> Result<()> {
        let config_file_location = ConfigManager::get_config_path()
            .ok_or_else(|| anyhow::anyhow!("could not resolve the home directory"))?;

        let config_out = ConfigFile {
            host: Some(settings.host.clone()),
            port: Some(settings.port),
            user: Some(settings.user.clone()),
            password: Some(settings.password.clone()),
            dbname: Some(settings.dbname.clone()),
            min_connections: Some(settings.min_connections),
            max_connections: Some(settings.max_connections),
        };

        if let Some(parent) = config_file_location.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let config = toml::to_string(&config_out)?;
        std::fs::write(config_file_location, config)?;
        Ok(())
    }
}
