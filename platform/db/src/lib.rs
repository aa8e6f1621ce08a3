//! Database pool construction shared by the server binary and tests.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use serde::Deserialize;
use thiserror::Error;

/// Shared connection pool alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingUrl,
    #[error(transparent)]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven pool settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

impl DatabaseSettings {
    pub fn from_env() -> Self {
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(default_max_connections);
        Self {
            url: std::env::var("DATABASE_URL").ok(),
            max_connections,
        }
    }
}

/// Connect and verify the database answers before handing the pool out.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.url.as_deref().ok_or(DbError::MissingUrl)?;
    let mut options = ConnectOptions::new(url.to_owned());
    options
        .max_connections(settings.max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let pool = Database::connect(options).await?;
    pool.ping().await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_url_is_reported() {
        let settings = DatabaseSettings {
            url: None,
            max_connections: 1,
        };
        let err = connect(&settings).await.unwrap_err();
        assert!(matches!(err, DbError::MissingUrl));
    }
}
