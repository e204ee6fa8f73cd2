use std::time::Duration;

use config::{Config, File};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8330";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Configuration for the notification service.
/// This struct is used to deserialize the configuration from a TOML file.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct NotifierConfig {
    #[serde(default)]
    pub server: Server,
    pub rpc: Rpc,
    #[serde(default)]
    pub cache: Cache,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Server {
    pub address: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Rpc {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Cache {
    pub ttl_secs: u64,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl Cache {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl NotifierConfig {
    /// Loads notifier configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Panics
    /// Will panic if the file cannot be read or if required configuration variables are missing
    pub fn from_toml(path: &str) -> Self {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .build()
            .unwrap_or_else(|_| {
                panic!("Failed to read configuration file at {path}");
            });

        Self::validated(config)
    }

    pub fn from_str(toml_str: &str) -> Self {
        let config = Config::builder()
            .add_source(File::from_str(toml_str, config::FileFormat::Toml))
            .build()
            .expect("Failed to build config from string");

        Self::validated(config)
    }

    fn validated(config: Config) -> Self {
        let parsed: Self = config.try_deserialize().expect("Deserialization failed");
        if parsed.cache.ttl_secs == 0 {
            panic!("cache.ttl_secs must be greater than zero");
        }
        parsed
    }
}
