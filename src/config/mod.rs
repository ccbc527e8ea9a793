use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SUBMIT_DELAY_MS: u64 = 1500;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub careers: CareersConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let catalog_path = env::var("CAREERS_CATALOG_PATH")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        let submit_delay_ms = match env::var("CAREERS_SUBMIT_DELAY_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSubmitDelay { value: raw })?,
            Err(_) => DEFAULT_SUBMIT_DELAY_MS,
        };

        let session_idle_secs = match env::var("CAREERS_SESSION_IDLE_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidSessionIdle { value: raw })?,
            Err(_) => DEFAULT_SESSION_IDLE_SECS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            careers: CareersConfig {
                catalog_path,
                submit_delay: Duration::from_millis(submit_delay_ms),
                session_idle_timeout: Duration::from_secs(session_idle_secs),
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the job catalog comes from, how long the simulated transport takes and how long an
/// untouched visitor session is kept.
#[derive(Debug, Clone)]
pub struct CareersConfig {
    /// JSON catalog file; the built-in catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    pub submit_delay: Duration,
    pub session_idle_timeout: Duration,
}

impl Default for CareersConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            submit_delay: Duration::from_millis(DEFAULT_SUBMIT_DELAY_MS),
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSubmitDelay { value: String },
    InvalidSessionIdle { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSubmitDelay { value } => write!(
                f,
                "CAREERS_SUBMIT_DELAY_MS must be a whole number of milliseconds (found '{}')",
                value
            ),
            ConfigError::InvalidSessionIdle { value } => write!(
                f,
                "CAREERS_SESSION_IDLE_SECS must be a positive number of seconds (found '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidSubmitDelay { .. }
            | ConfigError::InvalidSessionIdle { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("CAREERS_CATALOG_PATH");
        env::remove_var("CAREERS_SUBMIT_DELAY_MS");
        env::remove_var("CAREERS_SESSION_IDLE_SECS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.careers.catalog_path.is_none());
        assert_eq!(config.careers.submit_delay, Duration::from_millis(1500));
        assert_eq!(
            config.careers.session_idle_timeout,
            Duration::from_secs(30 * 60)
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_careers_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CAREERS_CATALOG_PATH", " data/jobs.json ");
        env::set_var("CAREERS_SUBMIT_DELAY_MS", "250");
        env::set_var("CAREERS_SESSION_IDLE_SECS", "90");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.careers.catalog_path,
            Some(PathBuf::from("data/jobs.json"))
        );
        assert_eq!(config.careers.submit_delay, Duration::from_millis(250));
        assert_eq!(config.careers.session_idle_timeout, Duration::from_secs(90));
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_submit_delay() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CAREERS_SUBMIT_DELAY_MS", "soon");
        let err = AppConfig::load().expect_err("delay must be numeric");
        assert!(matches!(err, ConfigError::InvalidSubmitDelay { ref value } if value == "soon"));
        reset_env();
    }

    #[test]
    fn rejects_zero_session_idle_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CAREERS_SESSION_IDLE_SECS", "0");
        let err = AppConfig::load().expect_err("idle timeout must be positive");
        assert!(matches!(err, ConfigError::InvalidSessionIdle { ref value } if value == "0"));
        reset_env();
    }
}
