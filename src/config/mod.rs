use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

const DEV_SECRET_KEY: &str = "cafe-catalog-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub features: FeatureFlags,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки базы данных (SQLite, один файл)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Секрет для подписи CSRF токенов
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub secret_key: String,
    pub csrf_ttl_seconds: i64,
}

// Feature flags для включения/выключения функциональности
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Keep `GET /delete/{id}` for old bookmarks and links.
    pub legacy_get_delete: bool,
}

// Источник переменных: env в проде, HashMap в тестах
struct Vars<F: Fn(&str) -> Option<String>> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get_or(&self, name: &'static str, default: &str) -> String {
        (self.lookup)(name).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: FromStr>(&self, name: &'static str, default: &str) -> Result<T, ConfigError> {
        let value = self.get_or(name, default);
        let parsed = value.trim().parse::<T>();
        parsed.map_err(|_| ConfigError::Invalid { name, value })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };
        let environment = vars.get_or("ENVIRONMENT", "development");

        let secret_key = match (vars.lookup)("SECRET_KEY") {
            Some(key) if !key.trim().is_empty() => key,
            _ if environment == "development" => DEV_SECRET_KEY.to_string(),
            _ => return Err(ConfigError::Missing { name: "SECRET_KEY" }),
        };

        Ok(Config {
            app: AppConfig {
                host: vars.get_or("HOST", "0.0.0.0"),
                port: vars.parse("PORT", "5000")?,
                environment,
                rust_log: vars.get_or("RUST_LOG", "cafe_catalog=debug,tower_http=debug"),
            },
            database: DatabaseConfig {
                url: vars.get_or("DATABASE_URL", "sqlite://cafes.db"),
                pool_size: vars.parse("DB_POOL_SIZE", "5")?,
            },
            security: SecurityConfig {
                secret_key,
                csrf_ttl_seconds: vars.parse("CSRF_TTL_SECONDS", "3600")?,
            },
            features: FeatureFlags {
                legacy_get_delete: vars.parse("LEGACY_GET_DELETE", "false")?,
            },
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.security.secret_key == DEV_SECRET_KEY
    }

    /// Configuration for tests and local tooling: in-memory database, fixed secret.
    pub fn for_tests() -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: "test".to_string(),
                rust_log: "cafe_catalog=debug".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                pool_size: 1,
            },
            security: SecurityConfig {
                secret_key: "test-secret".to_string(),
                csrf_ttl_seconds: 3600,
            },
            features: FeatureFlags {
                legacy_get_delete: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_in_development() {
        let config = load(&[]).unwrap();
        assert_eq!(config.app.port, 5000);
        assert_eq!(config.database.url, "sqlite://cafes.db");
        assert_eq!(config.security.csrf_ttl_seconds, 3600);
        assert!(config.uses_dev_secret());
        assert!(!config.features.legacy_get_delete);
    }

    #[test]
    fn secret_key_required_outside_development() {
        let err = load(&[("ENVIRONMENT", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: "SECRET_KEY" }));

        let blank = load(&[("ENVIRONMENT", "production"), ("SECRET_KEY", "  ")]).unwrap_err();
        assert!(matches!(blank, ConfigError::Missing { name: "SECRET_KEY" }));

        let config = load(&[("ENVIRONMENT", "production"), ("SECRET_KEY", "s3cr3t")]).unwrap();
        assert_eq!(config.security.secret_key, "s3cr3t");
        assert!(!config.uses_dev_secret());
    }

    #[test]
    fn legacy_get_delete_can_be_enabled() {
        let config = load(&[("LEGACY_GET_DELETE", "true")]).unwrap();
        assert!(config.features.legacy_get_delete);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = load(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
