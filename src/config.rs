use crate::error::WalletError;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection settings, read from the environment the way the surrounding
/// platform provisions them.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
}

impl Config {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// `DATABASE_URL` is required; `DATABASE_MAX_CONNECTIONS` is optional.
    pub fn from_env() -> Result<Self, WalletError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| WalletError::Config("DATABASE_URL not configured".to_string()))?;

        let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().map_err(|_| {
                WalletError::Config(format!("invalid DATABASE_MAX_CONNECTIONS: {}", raw))
            })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            max_connections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_pool_size() {
        let config = Config::new("postgres://localhost/wallet");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.database_url, "postgres://localhost/wallet");
    }
}
