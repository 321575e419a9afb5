//! Connection settings for the target PostgreSQL database

use postgres::config::Host;

use crate::error::{Result, SetupError};

pub const DEFAULT_SCHEMA: &str = "movies";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5432;

/// Where to connect, either as a full URL or as individual credentials.
///
/// When a URL is given the individual fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    /// Defaults to the user name
    pub dbname: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: None,
            password: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            dbname: None,
        }
    }
}

impl ConnectionConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Build the driver configuration
    pub fn pg_config(&self) -> Result<postgres::Config> {
        if let Some(url) = &self.url {
            return url
                .parse::<postgres::Config>()
                .map_err(|e| SetupError::Config(format!("invalid database url: {}", e)));
        }

        let user = self.user.as_deref().ok_or_else(|| {
            SetupError::Config("database user not set (--user or MOVIES_DB_USER)".to_string())
        })?;

        let mut config = postgres::Config::new();
        config
            .user(user)
            .host(&self.host)
            .port(self.port)
            .dbname(self.dbname.as_deref().unwrap_or(user));
        if let Some(password) = &self.password {
            config.password(password);
        }

        Ok(config)
    }

    /// `user@host:port/dbname`, never including the password
    pub fn describe(&self) -> String {
        let config = match self.pg_config() {
            Ok(config) => config,
            Err(_) => return "<unconfigured>".to_string(),
        };

        let host = config
            .get_hosts()
            .first()
            .map(|h| match h {
                Host::Tcp(name) => name.clone(),
                #[cfg(unix)]
                Host::Unix(path) => path.display().to_string(),
            })
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = config.get_ports().first().copied().unwrap_or(DEFAULT_PORT);

        format!(
            "{}@{}:{}/{}",
            config.get_user().unwrap_or("?"),
            host,
            port,
            config.get_dbname().unwrap_or("?")
        )
    }
}
