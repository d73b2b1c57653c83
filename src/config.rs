use std::net::SocketAddr;

use envmnt::{ExpandOptions, ExpansionType};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub run_migrations: bool,
}

impl Config {
    /// Read the configuration from the environment.
    ///
    /// - `BIND_ADDRESS` address to listen on, `${VAR}` references are expanded
    /// - `RUN_MIGRATIONS` whether to migrate the database on startup, defaults to true
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_address = envmnt::get_or("BIND_ADDRESS", DEFAULT_BIND_ADDRESS);
        let run_migrations = envmnt::is_or("RUN_MIGRATIONS", true);
        Self::new(&expand(&bind_address), run_migrations)
    }

    pub fn new(bind_address: &str, run_migrations: bool) -> Result<Self, ConfigError> {
        let bind_address = bind_address
            .trim()
            .parse()
            .map_err(|source| ConfigError::BindAddress {
                value: bind_address.to_owned(),
                source,
            })?;
        Ok(Self {
            bind_address,
            run_migrations,
        })
    }
}

fn expand(value: &str) -> String {
    let options = ExpandOptions {
        expansion_type: Some(ExpansionType::All),
        default_to_empty: true,
    };
    envmnt::expand(value, Some(options))
}
