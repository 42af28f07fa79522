use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration for the client directory
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL (`DATABASE_URL`)
    pub database_url: String,

    /// Default tracing level when `RUST_LOG` is not set (`LOG_LEVEL`)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    /// Build a configuration from explicit values, e.g. command line overrides
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            log_level: default_log_level(),
        }
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Load configuration, letting an explicit URL stand in for `DATABASE_URL`
pub fn init(database_url: Option<String>) -> Result<Config> {
    dotenv().ok();

    match database_url {
        Some(url) => {
            let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| default_log_level());
            Ok(Config {
                log_level,
                ..Config::with_database_url(url)
            })
        }
        None => Config::load(),
    }
}
