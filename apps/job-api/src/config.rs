use core_config::server::ServerConfig;
use core_config::{Environment, FromEnv};
use database::postgres::PostgresConfig;
use database::redis::RedisConfig;

/// Application-specific configuration, composed from the shared config
/// library pieces plus the database connection configs.
#[derive(Clone, Debug)]
pub struct Config {
    pub database: PostgresConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let redis = RedisConfig::from_env()?;

        Ok(Self {
            database,
            redis,
            server,
            environment,
        })
    }
}
