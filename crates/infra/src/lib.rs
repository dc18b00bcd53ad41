//! Infrastructure layer: database, configuration, external services.

pub mod config;
pub mod drinks;

/// External service clients/adapters.
pub mod external {
    pub mod jwks;

    pub use jwks::{JwksClient, JwksError};
}

pub use config::{AppConfig, ConfigError};
pub use drinks::{
    DrinkRepository, InMemoryDrinkRepository, RepositoryError, SqliteDrinkRepository,
};
