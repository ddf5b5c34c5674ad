//! Server configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable naming the listen address.
pub const ADDR_VAR: &str = "CELUSTOCK_ADDR";
/// Environment variable naming the CSV snapshot path.
pub const DATA_VAR: &str = "CELUSTOCK_DATA";
/// Environment variable naming the seed size for first boots.
pub const SEED_VAR: &str = "CELUSTOCK_SEED";

/// A configuration value that could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("invalid {var}=`{value}`: {reason}")]
pub struct ConfigError {
    /// The environment variable.
    pub var: &'static str,
    /// The raw value found.
    pub value: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Resolved server configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Socket the HTTP server binds.
    pub addr: SocketAddr,
    /// Where the inventory snapshot lives.
    pub data_path: PathBuf,
    /// How many records to generate when no snapshot exists yet.
    pub seed_count: usize,
}

impl Config {
    /// Reads configuration from process environment variables, with
    /// defaults matching the development setup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = match get(ADDR_VAR) {
            Some(raw) => raw.parse().map_err(|err| ConfigError {
                var: ADDR_VAR,
                value: raw,
                reason: format!("{err}"),
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 5000)),
        };

        let data_path = get(DATA_VAR)
            .map_or_else(|| PathBuf::from("datos/inventario.csv"), PathBuf::from);

        let seed_count = match get(SEED_VAR) {
            Some(raw) => raw.parse().map_err(|err| ConfigError {
                var: SEED_VAR,
                value: raw,
                reason: format!("{err}"),
            })?,
            None => 50,
        };

        Ok(Self {
            addr,
            data_path,
            seed_count,
        })
    }
}
