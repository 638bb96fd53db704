//! Connection configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    MySql,
    Postgres,
    Sqlite,
}

impl Driver {
    /// Resolve a driver from its configuration name.
    ///
    /// Unsupported names fail fast at connection-acquisition time.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "mysql" => Ok(Self::MySql),
            "pgsql" | "postgres" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(Error::config(format!("unsupported driver '{other}'"))),
        }
    }

    /// The configuration name of this driver.
    pub fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "pgsql",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Configuration for one named connection.
///
/// The core only needs the driver name to pick a grammar pair; everything
/// else is handed to the driver factory as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub driver: Driver,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    pub database: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Driver-specific options (charset, ssl mode, journal mode, ...).
    #[serde(default)]
    pub options: HashMap<String, String>,
}

impl ConnectionConfig {
    /// Minimal configuration for a driver and database name.
    pub fn new(driver: Driver, database: impl Into<String>) -> Self {
        Self {
            driver,
            host: None,
            port: None,
            database: database.into(),
            username: None,
            password: None,
            options: HashMap::new(),
        }
    }

    /// Build a configuration from a loose key/value map.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let driver_name = map
            .get("driver")
            .ok_or_else(|| Error::config("missing 'driver' key"))?;
        let mut config = Self::new(
            Driver::from_name(driver_name)?,
            map.get("database").cloned().unwrap_or_default(),
        );
        config.host = map.get("host").cloned();
        config.port = match map.get("port") {
            Some(p) => Some(
                p.parse()
                    .map_err(|_| Error::config(format!("invalid port '{p}'")))?,
            ),
            None => None,
        };
        config.username = map.get("username").cloned();
        config.password = map.get("password").cloned();
        for (k, v) in map {
            if !matches!(
                k.as_str(),
                "driver" | "database" | "host" | "port" | "username" | "password"
            ) {
                config.options.insert(k.clone(), v.clone());
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_driver_fails_fast() {
        let err = Driver::from_name("mongodb").unwrap_err();
        assert!(err.to_string().contains("unsupported driver"));
    }

    #[test]
    fn deserializes_from_json() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{"driver": "postgres", "database": "app", "host": "localhost", "port": 5432}"#,
        )
        .unwrap();
        assert_eq!(config.driver, Driver::Postgres);
        assert_eq!(config.port, Some(5432));
        assert!(config.options.is_empty());
    }

    #[test]
    fn from_map_splits_known_keys_from_options() {
        let mut map = HashMap::new();
        map.insert("driver".to_string(), "sqlite".to_string());
        map.insert("database".to_string(), ":memory:".to_string());
        map.insert("journal_mode".to_string(), "wal".to_string());

        let config = ConnectionConfig::from_map(&map).unwrap();
        assert_eq!(config.driver, Driver::Sqlite);
        assert_eq!(config.database, ":memory:");
        assert_eq!(config.options.get("journal_mode").map(String::as_str), Some("wal"));
    }
}
