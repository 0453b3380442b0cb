//! Application configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env is
//! loaded first) > defaults.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::paths;

// ==================== Fixed Values ====================

/// Avatar assigned to new accounts
pub const DEFAULT_AVATAR: &str = "https://cdn-icons-png.flaticon.com/512/149/149071.png";

/// Label used when a course owner can no longer be resolved
pub const UNKNOWN_INSTRUCTOR: &str = "Unknown";

/// Default server port
pub const SERVER_PORT: u16 = 5000;

// ==================== config.toml structure ====================

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server: Option<ServerSection>,
    database: Option<DatabaseSection>,
    media: Option<MediaSection>,
    payment: Option<PaymentSection>,
    certificate: Option<CertificateSection>,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    addr: Option<String>,
    port: Option<u16>,
    request_timeout_secs: Option<u64>,
    session_hours: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
    busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct MediaSection {
    uploads_dir: Option<String>,
    max_upload_mb: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct PaymentSection {
    key_id: Option<String>,
    key_secret: Option<String>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CertificateSection {
    verify_base_url: Option<String>,
}

// ==================== Resolved configuration ====================

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub key_id: String,
    pub key_secret: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub server_port: u16,
    pub request_timeout: Duration,
    /// Session lifetime in hours
    pub session_hours: i64,
    pub database_path: PathBuf,
    pub db_busy_timeout: Duration,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub payment: PaymentConfig,
    pub certificate_verify_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0".to_string(),
            server_port: SERVER_PORT,
            request_timeout: Duration::from_secs(30),
            session_hours: 24 * 15,
            database_path: PathBuf::from(paths::db_path()),
            db_busy_timeout: Duration::from_millis(5_000),
            uploads_dir: PathBuf::from(paths::uploads_dir()),
            max_upload_bytes: 512 * 1024 * 1024,
            payment: PaymentConfig {
                key_id: "rzp_test_key".to_string(),
                key_secret: String::new(),
                currency: "INR".to_string(),
            },
            certificate_verify_base: "http://localhost:5000/verify-certificate".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from config.toml and the process environment
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        let file = std::fs::read_to_string("config.toml").ok();
        if file.is_some() {
            tracing::info!("Loading configuration from config.toml");
        }
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolve configuration from optional TOML contents and an env lookup
    pub fn from_sources(toml_contents: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Self {
        let file: FileConfig = match toml_contents.map(toml::from_str::<FileConfig>) {
            Some(Ok(parsed)) => parsed,
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid config.toml: {}", e);
                FileConfig::default()
            }
            None => FileConfig::default(),
        };

        let mut config = Config::default();

        // Environment first, file values override below
        if let Some(port) = env("PORT").and_then(|p| p.parse().ok()) {
            config.server_port = port;
        }
        if let Some(path) = env("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(dir) = env("UPLOADS_DIR") {
            config.uploads_dir = PathBuf::from(dir);
        }
        if let Some(key_id) = env("PAYMENT_KEY_ID") {
            config.payment.key_id = key_id;
        }
        if let Some(secret) = env("PAYMENT_KEY_SECRET") {
            config.payment.key_secret = secret;
        }
        if let Some(currency) = env("PAYMENT_CURRENCY") {
            config.payment.currency = currency;
        }
        if let Some(base) = env("CERTIFICATE_VERIFY_BASE_URL") {
            config.certificate_verify_base = base;
        }

        if let Some(server) = file.server {
            if let Some(addr) = server.addr {
                config.server_addr = addr;
            }
            if let Some(port) = server.port {
                config.server_port = port;
            }
            if let Some(secs) = server.request_timeout_secs {
                config.request_timeout = Duration::from_secs(secs);
            }
            if let Some(hours) = server.session_hours {
                config.session_hours = hours;
            }
        }
        if let Some(db) = file.database {
            if let Some(path) = db.path {
                config.database_path = PathBuf::from(path);
            }
            if let Some(ms) = db.busy_timeout_ms {
                config.db_busy_timeout = Duration::from_millis(ms);
            }
        }
        if let Some(media) = file.media {
            if let Some(dir) = media.uploads_dir {
                config.uploads_dir = PathBuf::from(dir);
            }
            if let Some(mb) = media.max_upload_mb {
                config.max_upload_bytes = mb * 1024 * 1024;
            }
        }
        if let Some(payment) = file.payment {
            if let Some(key_id) = payment.key_id {
                config.payment.key_id = key_id;
            }
            if let Some(secret) = payment.key_secret {
                config.payment.key_secret = secret;
            }
            if let Some(currency) = payment.currency {
                config.payment.currency = currency;
            }
        }
        if let Some(base) = file.certificate.and_then(|c| c.verify_base_url) {
            config.certificate_verify_base = base;
        }

        if config.payment.key_secret.is_empty() {
            tracing::warn!("No payment key secret configured; payment verification will always fail");
        }

        config
    }

    /// Full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = Config::from_sources(None, |_| None);
        assert_eq!(config.server_port, SERVER_PORT);
        assert_eq!(config.payment.currency, "INR");
        assert!(config.database_path.ends_with("lms.db"));
    }

    #[test]
    fn test_env_overrides_defaults() {
        let env = env_from(&[("PORT", "8080"), ("PAYMENT_KEY_SECRET", "s3cret")]);
        let config = Config::from_sources(None, env);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.payment.key_secret, "s3cret");
    }

    #[test]
    fn test_file_overrides_env() {
        let toml = r#"
            [server]
            port = 9000
            request_timeout_secs = 5

            [database]
            path = "/tmp/custom.db"

            [payment]
            currency = "USD"
        "#;
        let env = env_from(&[("PORT", "8080"), ("DATABASE_PATH", "/tmp/env.db")]);
        let config = Config::from_sources(Some(toml), env);
        assert_eq!(config.server_port, 9000);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.database_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.payment.currency, "USD");
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let config = Config::from_sources(Some("not = [valid"), |_| None);
        assert_eq!(config.server_port, SERVER_PORT);
    }

    #[test]
    fn test_bind_addr() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), format!("0.0.0.0:{}", SERVER_PORT));
    }
}
