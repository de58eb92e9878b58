//! Service configuration
//!
//! Defaults overlaid by `AUTH__*` environment variables, e.g.
//! `AUTH__SERVER__PORT=8080` or `AUTH__SESSION__BACKEND=redis`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::{
    password::PasswordConfig,
    session::{DEFAULT_TTL_SECONDS, MAX_TTL_SECONDS},
};

/// Top-level service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// `development` or `production`
    pub environment: String,
    pub server: ServerSettings,
    pub session: SessionSettings,
    pub password: PasswordConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Where sessions are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub backend: SessionBackend,
    /// Rolling session lifetime
    pub ttl_seconds: i64,
    pub cookie_name: String,
    /// Seconds between expired-session sweeps; 0 disables sweeping
    pub sweep_interval_seconds: u64,
}

impl Settings {
    /// Load settings from defaults and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("environment", "development")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000_i64)?
            .set_default("session.backend", "memory")?
            .set_default("session.ttl_seconds", DEFAULT_TTL_SECONDS)?
            .set_default("session.cookie_name", "sid")?
            .set_default("session.sweep_interval_seconds", 600_i64)?
            .set_default("password.time_cost", i64::from(argon2::Params::DEFAULT_T_COST))?
            .set_default(
                "password.memory_cost_kib",
                i64::from(argon2::Params::DEFAULT_M_COST),
            )?
            .set_default("password.parallelism", i64::from(argon2::Params::DEFAULT_P_COST))?
            .add_source(
                Environment::with_prefix("AUTH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if !(1..=MAX_TTL_SECONDS).contains(&settings.session.ttl_seconds) {
            return Err(ConfigError::Message(format!(
                "session.ttl_seconds must be between 1 and {}",
                MAX_TTL_SECONDS
            )));
        }

        Ok(settings)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        let settings = Settings::load().unwrap();

        assert_eq!(settings.environment, "development");
        assert!(!settings.is_production());
        assert_eq!(settings.bind_address(), "0.0.0.0:3000");
        assert_eq!(settings.session.backend, SessionBackend::Memory);
        assert_eq!(settings.session.ttl_seconds, 86_400);
        assert_eq!(settings.session.cookie_name, "sid");
        assert_eq!(settings.session.sweep_interval_seconds, 600);
        assert_eq!(settings.password.time_cost, argon2::Params::DEFAULT_T_COST);
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        unsafe {
            std::env::set_var("AUTH__ENVIRONMENT", "production");
            std::env::set_var("AUTH__SERVER__PORT", "8080");
            std::env::set_var("AUTH__SESSION__BACKEND", "redis");
            std::env::set_var("AUTH__SESSION__TTL_SECONDS", "3600");
        }

        let settings = Settings::load().unwrap();
        assert!(settings.is_production());
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.session.backend, SessionBackend::Redis);
        assert_eq!(settings.session.ttl_seconds, 3600);

        unsafe {
            std::env::remove_var("AUTH__ENVIRONMENT");
            std::env::remove_var("AUTH__SERVER__PORT");
            std::env::remove_var("AUTH__SESSION__BACKEND");
            std::env::remove_var("AUTH__SESSION__TTL_SECONDS");
        }
    }

    #[test]
    #[serial]
    fn test_rejects_non_positive_ttl() {
        unsafe {
            std::env::set_var("AUTH__SESSION__TTL_SECONDS", "0");
        }

        assert!(Settings::load().is_err());

        unsafe {
            std::env::remove_var("AUTH__SESSION__TTL_SECONDS");
        }
    }

    #[test]
    #[serial]
    fn test_rejects_ttl_beyond_one_year() {
        unsafe {
            std::env::set_var("AUTH__SESSION__TTL_SECONDS", i64::MAX.to_string());
        }
        assert!(Settings::load().is_err());

        unsafe {
            std::env::set_var(
                "AUTH__SESSION__TTL_SECONDS",
                (MAX_TTL_SECONDS + 1).to_string(),
            );
        }
        assert!(Settings::load().is_err());

        unsafe {
            std::env::set_var("AUTH__SESSION__TTL_SECONDS", MAX_TTL_SECONDS.to_string());
        }
        assert_eq!(
            Settings::load().unwrap().session.ttl_seconds,
            MAX_TTL_SECONDS
        );

        unsafe {
            std::env::remove_var("AUTH__SESSION__TTL_SECONDS");
        }
    }
}
