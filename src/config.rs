use crate::error::{OpenDatabaseSnafu, ParseMaxConnectionsSnafu, RosterResult};
use dotenvy::var;
use snafu::ResultExt;
use sqlx::sqlite::SqliteConnectOptions;
use std::{str::FromStr, sync::Arc};

const DEFAULT_DATABASE_URL: &str = "sqlite://database.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    server_ip: String,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Ok(Self {
            db_config: Arc::new(DbConfig::new()?),
            server_ip: var("ROSTER_SERVER_IP").unwrap_or_else(|_| DEFAULT_SERVER_IP.to_string()),
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }
}

#[derive(Debug)]
pub struct DbConfig {
    url: String,
    max_connections: u32,
}

impl DbConfig {
    pub fn new() -> RosterResult<Self> {
        let max_connections = match var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().context(ParseMaxConnectionsSnafu)?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            url: var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections,
        })
    }

    /// A private in-memory database, kept alive by a single connection that never idles out.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }

    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn connect_options(&self) -> RosterResult<SqliteConnectOptions> {
        Ok(SqliteConnectOptions::from_str(&self.url)
            .context(OpenDatabaseSnafu)?
            .create_if_missing(true))
    }
}
