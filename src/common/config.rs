//! Process-wide configuration, read once at startup
//!
//! Every required variable must be present and non-empty. A missing or
//! unparsable value is a fatal startup error; nothing here is consulted again
//! after `main` has built the application state.

use chrono::Duration;
use sqlx::postgres::PgConnectOptions;
use std::env;
use thiserror::Error;

use super::API_BASE_PATH;

const DEFAULT_JWT_TTL_HOURS: i64 = 24;
/// One year
const MAX_JWT_TTL_HOURS: i64 = 24 * 366;
const DEFAULT_GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const DEFAULT_GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const DEFAULT_GITHUB_SCOPES: &str = "repo";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// PostgreSQL connection settings
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

/// GitHub OAuth application credentials and endpoints
#[derive(Clone)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub scopes: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub app_port: u16,
    pub public_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub github: GithubConfig,
    pub cors_origins: Vec<String>,
    pub reset_db: bool,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary name → value lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let database = DatabaseConfig {
            host: required("DB_HOST")?,
            port: parse_port("DB_PORT", &required("DB_PORT")?)?,
            user: required("POSTGRES_USER")?,
            password: required("POSTGRES_PASSWORD")?,
            name: required("POSTGRES_DB")?,
        };

        let app_port = parse_port("APP_PORT", &required("APP_PORT")?)?;
        let jwt_secret = required("JWT_SECRET")?;

        let github = GithubConfig {
            client_id: required("GITHUB_CLIENT_ID")?,
            client_secret: required("GITHUB_CLIENT_SECRET")?,
            authorize_url: optional("GITHUB_AUTHORIZE_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_AUTHORIZE_URL.to_string()),
            token_url: optional("GITHUB_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_TOKEN_URL.to_string()),
            scopes: optional("GITHUB_SCOPES").unwrap_or_else(|| DEFAULT_GITHUB_SCOPES.to_string()),
        };

        let jwt_ttl_hours = match optional("JWT_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|h| (1..=MAX_JWT_TTL_HOURS).contains(h))
                .ok_or_else(|| ConfigError::Invalid {
                    name: "JWT_TTL_HOURS",
                    reason: format!(
                        "expected between 1 and {} hours, got '{}'",
                        MAX_JWT_TTL_HOURS, raw
                    ),
                })?,
            None => DEFAULT_JWT_TTL_HOURS,
        };

        let public_url = optional("APP_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", app_port))
            .trim_end_matches('/')
            .to_string();

        let cors_origins: Vec<String> = optional("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        // Credentialed CORS cannot use a wildcard origin
        if cors_origins.iter().any(|o| o.contains('*')) {
            return Err(ConfigError::Invalid {
                name: "CORS_ORIGINS",
                reason: "wildcard origins are not allowed; list each origin".to_string(),
            });
        }

        let reset_db = optional("RESET_DB").map_or(false, |v| v == "true");

        Ok(Self {
            database,
            app_port,
            public_url,
            jwt_secret,
            jwt_ttl: Duration::hours(jwt_ttl_hours),
            github,
            cors_origins,
            reset_db,
        })
    }

    /// Absolute URL GitHub redirects back to; must match the one registered
    /// with the OAuth application
    pub fn github_callback_url(&self) -> String {
        format!("{}{}/github/auth/callback", self.public_url, API_BASE_PATH)
    }
}

fn parse_port(name: &'static str, raw: &str) -> Result<u16, ConfigError> {
    raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DB_HOST", "localhost"),
            ("DB_PORT", "5432"),
            ("POSTGRES_USER", "sentry"),
            ("POSTGRES_PASSWORD", "secret"),
            ("POSTGRES_DB", "sentrylink"),
            ("APP_PORT", "8080"),
            ("JWT_SECRET", "signing-secret"),
            ("GITHUB_CLIENT_ID", "client-id"),
            ("GITHUB_CLIENT_SECRET", "client-secret"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_complete_environment_loads_with_defaults() {
        let config = load(&base_env()).expect("config should load");

        assert_eq!(config.database.port, 5432);
        assert_eq!(config.app_port, 8080);
        assert_eq!(config.jwt_ttl, Duration::hours(24));
        assert_eq!(config.public_url, "http://localhost:8080");
        assert_eq!(config.github.token_url, DEFAULT_GITHUB_TOKEN_URL);
        assert!(!config.reset_db);
        assert_eq!(
            config.github_callback_url(),
            "http://localhost:8080/api/v1/github/auth/callback"
        );
    }

    #[test]
    fn test_each_required_variable_is_fatal_when_missing() {
        for name in base_env().keys().copied() {
            let mut env = base_env();
            env.remove(name);
            assert_eq!(load(&env).err(), Some(ConfigError::Missing(name)));
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut env = base_env();
        env.insert("JWT_SECRET", "   ");
        assert_eq!(load(&env).err(), Some(ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut env = base_env();
        env.insert("APP_PORT", "eighty");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { name: "APP_PORT", .. })
        ));
    }

    #[test]
    fn test_token_lifetime_must_be_in_range() {
        for raw in ["0", "-3", "10000000000", "99999999999999999"] {
            let mut env = base_env();
            env.insert("JWT_TTL_HOURS", raw);
            assert!(
                matches!(load(&env), Err(ConfigError::Invalid { name: "JWT_TTL_HOURS", .. })),
                "{} should be rejected",
                raw
            );
        }

        let mut env = base_env();
        env.insert("JWT_TTL_HOURS", "8784");
        assert_eq!(load(&env).unwrap().jwt_ttl, Duration::hours(8784));
    }

    #[test]
    fn test_wildcard_cors_origin_is_rejected() {
        for raw in ["*", "http://localhost:3000, *"] {
            let mut env = base_env();
            env.insert("CORS_ORIGINS", raw);
            assert!(matches!(
                load(&env),
                Err(ConfigError::Invalid { name: "CORS_ORIGINS", .. })
            ));
        }
    }

    #[test]
    fn test_public_url_trailing_slash_is_trimmed() {
        let mut env = base_env();
        env.insert("APP_PUBLIC_URL", "https://links.example.com/");
        env.insert("JWT_TTL_HOURS", "2");
        let config = load(&env).expect("config should load");

        assert_eq!(config.jwt_ttl, Duration::hours(2));
        assert_eq!(
            config.github_callback_url(),
            "https://links.example.com/api/v1/github/auth/callback"
        );
    }
}
