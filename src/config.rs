//! Process configuration, read from the environment (and `.env` via `dotenvy`).

use reqwest::Url;
use sea_orm::ConnectOptions;
use std::env;

use crate::error::{SyncError, SyncResult};

pub const DEFAULT_BASE_URL: &str = "https://api.paynow.gg/v1";

const ENV_STORE_ID: &str = "STORE_ID";
const ENV_API_KEY: &str = "PAYNOW_API_KEY";
const ENV_BASE_URL: &str = "PAYNOW_BASE_URL";
const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_SQL_HOST: &str = "SQL_HOST";
const ENV_SQL_PORT: &str = "SQL_PORT";
const ENV_SQL_USER: &str = "SQL_USER";
const ENV_SQL_PASSWORD: &str = "SQL_PASSWORD";
const ENV_SQL_DATABASE: &str = "SQL_DATABASE";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub paynow: PayNowConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct PayNowConfig {
    pub store_id: String,
    pub api_key: String,
    pub base_url: String,
}

/// `paynow_orders.minecraft_uuid` is a native `UUID` column, bound as
/// `uuid::Uuid`, so only PostgreSQL URLs are accepted.
const POSTGRES_SCHEMES: [&str; 2] = ["postgres", "postgresql"];
const DEFAULT_PORT: u16 = 5432;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    /// Takes precedence over the individual fields when set.
    pub url: Option<String>,
}

impl DatabaseConfig {
    /// Connection URL handed to `sea_orm::Database::connect`.
    pub fn connection_url(&self) -> SyncResult<String> {
        if let Some(url) = &self.url {
            let scheme = Url::parse(url)
                .map_err(|e| SyncError::InvalidConfig {
                    name: ENV_DATABASE_URL,
                    reason: e.to_string(),
                })?
                .scheme()
                .to_string();
            if !POSTGRES_SCHEMES.contains(&scheme.as_str()) {
                return Err(SyncError::InvalidConfig {
                    name: ENV_DATABASE_URL,
                    reason: format!("unsupported scheme '{}', expected postgres", scheme),
                });
            }
            return Ok(url.clone());
        }

        let invalid = |reason: String| SyncError::InvalidConfig {
            name: ENV_SQL_HOST,
            reason,
        };

        let mut url = Url::parse(&format!(
            "{}://{}:{}",
            POSTGRES_SCHEMES[0],
            self.host,
            self.port
        ))
        .map_err(|e| invalid(e.to_string()))?;

        if let Some(user) = &self.user {
            url.set_username(user)
                .map_err(|_| invalid("cannot set username".to_string()))?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| invalid("cannot set password".to_string()))?;
        }
        if let Some(database) = &self.database {
            url.set_path(database);
        }

        Ok(url.to_string())
    }

    /// The job uses exactly one connection, serially.
    pub fn connect_options(&self) -> SyncResult<ConnectOptions> {
        let mut opt = ConnectOptions::new(self.connection_url()?);
        opt.max_connections(1).min_connections(1);
        Ok(opt)
    }
}

impl SyncConfig {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        // Credentials are checked before anything else is parsed
        let api_key = get(ENV_API_KEY).ok_or(SyncError::MissingConfig(ENV_API_KEY))?;
        let store_id = get(ENV_STORE_ID).ok_or(SyncError::MissingConfig(ENV_STORE_ID))?;

        let base_url = get(ENV_BASE_URL)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let port = match get(ENV_SQL_PORT) {
            Some(v) => v.parse::<u16>().map_err(|e| SyncError::InvalidConfig {
                name: ENV_SQL_PORT,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            paynow: PayNowConfig {
                store_id,
                api_key,
                base_url,
            },
            database: DatabaseConfig {
                host: get(ENV_SQL_HOST).unwrap_or_else(|| "localhost".to_string()),
                port,
                user: get(ENV_SQL_USER),
                password: get(ENV_SQL_PASSWORD),
                database: get(ENV_SQL_DATABASE),
                url: get(ENV_DATABASE_URL),
            },
        })
    }
}
