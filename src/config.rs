use std::net::SocketAddr;
use std::path::PathBuf;

use crate::store::BackendKind;

/// Application-level constants
pub const APP_NAME: &str = "Hospital Admin";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ═══════════════════════════════════════════════════════════
// Deployment constants (edit here)
// ═══════════════════════════════════════════════════════════

/// Which persistence backend this deployment talks to.
pub const BACKEND: BackendKind = BackendKind::Local;

/// Hosted database endpoint and anonymous access key.
pub const HOSTED_URL: &str = "https://XXXX.supabase.co";
pub const HOSTED_ANON_KEY: &str = "XXXX";

/// Table (collection) holding the records on the hosted database.
pub const HOSTED_TABLE: &str = "hospitals";

/// Base URL of the HTTP JSON API backend (routes live under `/hospitals`).
pub const API_BASE_URL: &str = "http://127.0.0.1:8787/api";

/// Fixed slot key of the local store.
pub const LOCAL_STORE_KEY: &str = "hospitals_v1";

/// Address the panel server listens on.
pub const BIND_ADDR: &str = "127.0.0.1:8080";

/// Shortest access key accepted by the startup check.
pub const MIN_ACCESS_KEY_LEN: usize = 20;

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("HospitalAdmin")
}

/// Directory holding the local key-value slots.
pub fn local_store_dir() -> PathBuf {
    app_data_dir().join("store")
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "hospital_admin_lib=info,hospital_admin=info,tower_http=warn"
}

// ═══════════════════════════════════════════════════════════
// Configuration values
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Hosted URL must use https:// (got {0:?})")]
    InsecureUrl(String),
    #[error("Access key is missing or too short ({len} < {min} characters)")]
    KeyTooShort { len: usize, min: usize },
    #[error("API base URL must use http:// or https:// (got {0:?})")]
    InvalidApiUrl(String),
    #[error("Invalid bind address {0:?}")]
    InvalidBindAddr(String),
}

/// Hosted database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedConfig {
    pub url: String,
    pub anon_key: String,
    pub table: String,
}

impl HostedConfig {
    /// Superficial startup check: URL scheme and minimum key length.
    /// Nothing is sent over the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url.starts_with("https://") {
            return Err(ConfigError::InsecureUrl(self.url.clone()));
        }
        if self.anon_key.len() < MIN_ACCESS_KEY_LEN {
            return Err(ConfigError::KeyTooShort {
                len: self.anon_key.len(),
                min: MIN_ACCESS_KEY_LEN,
            });
        }
        Ok(())
    }
}

/// Everything the panel needs at construction.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub backend: BackendKind,
    pub hosted: HostedConfig,
    pub api_base_url: String,
    pub local_dir: PathBuf,
    pub local_key: String,
    pub bind_addr: String,
}

impl PanelConfig {
    /// Build the configuration from the compiled-in constants.
    pub fn from_constants() -> Self {
        Self {
            backend: BACKEND,
            hosted: HostedConfig {
                url: HOSTED_URL.to_string(),
                anon_key: HOSTED_ANON_KEY.to_string(),
                table: HOSTED_TABLE.to_string(),
            },
            api_base_url: API_BASE_URL.to_string(),
            local_dir: local_store_dir(),
            local_key: LOCAL_STORE_KEY.to_string(),
            bind_addr: BIND_ADDR.to_string(),
        }
    }

    /// Local-store configuration rooted at `dir` (tests, portable installs).
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::Local,
            local_dir: dir.into(),
            ..Self::from_constants()
        }
    }

    /// Check the settings of the selected backend only.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            BackendKind::Hosted => self.hosted.validate(),
            BackendKind::HttpApi => {
                if self.api_base_url.starts_with("http://")
                    || self.api_base_url.starts_with("https://")
                {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidApiUrl(self.api_base_url.clone()))
                }
            }
            BackendKind::Local => Ok(()),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(self.bind_addr.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosted(url: &str, key: &str) -> HostedConfig {
        HostedConfig {
            url: url.into(),
            anon_key: key.into(),
            table: "hospitals".into(),
        }
    }

    #[test]
    fn app_data_dir_is_named_after_app() {
        assert!(app_data_dir().ends_with("HospitalAdmin"));
        assert!(local_store_dir().starts_with(app_data_dir()));
    }

    #[test]
    fn placeholder_constants_fail_hosted_check() {
        let cfg = hosted(HOSTED_URL, HOSTED_ANON_KEY);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::KeyTooShort { len: 4, min: 20 })
        ));
    }

    #[test]
    fn hosted_requires_https() {
        let cfg = hosted("http://example.supabase.co", &"k".repeat(40));
        assert!(matches!(cfg.validate(), Err(ConfigError::InsecureUrl(_))));
    }

    #[test]
    fn hosted_accepts_https_and_long_key() {
        let cfg = hosted("https://example.supabase.co", &"k".repeat(20));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn local_backend_needs_no_keys() {
        let cfg = PanelConfig::local("/tmp/x");
        assert_eq!(cfg.backend, BackendKind::Local);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn http_api_rejects_bare_host() {
        let cfg = PanelConfig {
            backend: BackendKind::HttpApi,
            api_base_url: "localhost:8787".into(),
            ..PanelConfig::local("/tmp/x")
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidApiUrl(_))));
    }

    #[test]
    fn bind_addr_parses() {
        let cfg = PanelConfig::local("/tmp/x");
        assert_eq!(cfg.socket_addr().unwrap().port(), 8080);
    }
}
