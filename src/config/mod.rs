use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. `None` selects the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    /// Take the client address from X-Forwarded-For / X-Real-IP.
    pub trust_proxy_headers: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    MissingInProduction(&'static str),

    #[error("invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
}

const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;
const DEFAULT_MAX_REQUEST_SIZE_BYTES: usize = 10 * 1024 * 1024; // 10MB

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs = v.parse().unwrap_or(self.api.rate_limit_window_secs);
        }
        if let Ok(v) = env::var("API_TRUST_PROXY_HEADERS") {
            self.api.trust_proxy_headers = v.parse().unwrap_or(self.api.trust_proxy_headers);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }

        // AI overrides
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            self.ai.api_key = Some(v).filter(|key| !key.trim().is_empty());
        }
        if let Ok(v) = env::var("OPENAI_BASE_URL") {
            self.ai.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("OPENAI_MODEL") {
            self.ai.model = v;
        }
        if let Ok(v) = env::var("OPENAI_TEMPERATURE") {
            self.ai.temperature = v.parse().unwrap_or(self.ai.temperature);
        }
        if let Ok(v) = env::var("OPENAI_MAX_TOKENS") {
            self.ai.max_tokens = v.parse().unwrap_or(self.ai.max_tokens);
        }

        self
    }

    /// Reject configurations the server must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment == Environment::Production {
            if self.security.jwt_secret.is_empty() {
                return Err(ConfigError::MissingInProduction("JWT_SECRET"));
            }
            if self.database.url.is_none() {
                return Err(ConfigError::MissingInProduction("DATABASE_URL"));
            }
        }

        for origin in &self.security.cors_origins {
            if url::Url::parse(origin).is_err() {
                return Err(ConfigError::InvalidCorsOrigin(origin.clone()));
            }
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
                rate_limit_window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
                trust_proxy_headers: false,
                max_request_size_bytes: DEFAULT_MAX_REQUEST_SIZE_BYTES,
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-secret-change-me".to_string(),
            },
            ai: AiConfig::defaults(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
                rate_limit_window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
                trust_proxy_headers: true,
                max_request_size_bytes: DEFAULT_MAX_REQUEST_SIZE_BYTES,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://family-finance-ui-staging.onrender.com".to_string()],
                jwt_secret: String::new(),
            },
            ai: AiConfig::defaults(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
                rate_limit_window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
                trust_proxy_headers: true,
                max_request_size_bytes: DEFAULT_MAX_REQUEST_SIZE_BYTES,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://family-finance-ui.onrender.com".to_string()],
                jwt_secret: String::new(),
            },
            ai: AiConfig::defaults(),
        }
    }
}

impl AiConfig {
    fn defaults() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 800,
            system_prompt: "You are a helpful financial assistant. Provide actionable and relevant advice."
                .to_string(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.is_development());
        assert!(config.database.url.is_none());
        assert_eq!(config.api.rate_limit_requests, 100);
        assert_eq!(config.api.rate_limit_window_secs, 900);
        assert_eq!(config.api.max_request_size_bytes, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.api.enable_rate_limiting);
        assert!(config.api.trust_proxy_headers);
        assert_eq!(config.security.cors_origins, vec!["https://family-finance-ui.onrender.com"]);
        assert_eq!(config.ai.model, "gpt-3.5-turbo");
        assert_eq!(config.ai.max_tokens, 800);
    }

    #[test]
    fn production_requires_secret_and_database() {
        let mut config = AppConfig::production();
        assert_eq!(config.validate(), Err(ConfigError::MissingInProduction("JWT_SECRET")));

        config.security.jwt_secret = "s3cret".to_string();
        assert_eq!(config.validate(), Err(ConfigError::MissingInProduction("DATABASE_URL")));

        config.database.url = Some("postgres://localhost/family_finance".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_cors_origin() {
        let mut config = AppConfig::development();
        config.security.cors_origins = vec!["not a url".to_string()];
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCorsOrigin(_))));
    }
}
