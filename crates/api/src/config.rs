//! Server configuration from environment variables

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::env;
use teamcal_core::config::CoreConfig;

/// Origins allowed to call the API from a browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigin {
    Any,
    Exact(HeaderValue),
}

impl CorsOrigin {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw == "*" {
            return Ok(Self::Any);
        }
        raw.parse::<HeaderValue>()
            .map(Self::Exact)
            .with_context(|| format!("Invalid CORS origin '{}'", raw))
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub core: CoreConfig,
    pub host: String,
    pub port: u16,
    pub cors_allowed_origin: CorsOrigin,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let core = CoreConfig::from_env().context("Failed to load core configuration")?;

        Ok(Self {
            core,
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("Failed to parse API_PORT as u16")?,
            cors_allowed_origin: CorsOrigin::parse(
                &env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            )?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear() {
        unsafe {
            env::remove_var("API_HOST");
            env::remove_var("API_PORT");
            env::remove_var("CORS_ALLOWED_ORIGIN");
            env::remove_var("DISPLAY_TIMEZONE");
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_with_defaults() {
        clear();

        let config = Config::from_env().unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_allowed_origin, CorsOrigin::Any);
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn test_config_from_env_with_custom_values() {
        unsafe {
            env::set_var("API_HOST", "127.0.0.1");
            env::set_var("API_PORT", "8080");
            env::set_var("CORS_ALLOWED_ORIGIN", "https://team.example.com");
            env::set_var("DISPLAY_TIMEZONE", "Europe/Paris");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(
            config.cors_allowed_origin,
            CorsOrigin::Exact(HeaderValue::from_static("https://team.example.com"))
        );
        assert_eq!(config.core.display_timezone.name(), "Europe/Paris");

        clear();
    }

    #[test]
    #[serial]
    fn test_config_invalid_port() {
        clear();
        unsafe {
            env::set_var("API_PORT", "invalid");
        }

        assert!(Config::from_env().is_err());

        clear();
    }

    #[test]
    fn test_cors_origin_rejects_control_characters() {
        assert!(CorsOrigin::parse("https://bad\norigin").is_err());
    }
}
