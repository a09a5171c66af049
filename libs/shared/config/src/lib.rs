use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub database_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            bind_addr: env::var("EMR_BIND_ADDR")
                .unwrap_or_else(|_| {
                    warn!("EMR_BIND_ADDR not set, using default");
                    "0.0.0.0:3000".to_string()
                }),
            jwt_secret: env::var("EMR_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("EMR_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            database_url: env::var("EMR_DATABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("EMR_DATABASE_URL not set, using in-memory store");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.is_empty()
    }
}
