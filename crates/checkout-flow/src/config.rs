//! # Checkout Configuration
//!
//! Configuration for the checkout flow.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CHECKOUT_ECOMMERCE_BASE_URL=https://ecommerce.example.com          │
//! │     CHECKOUT_MODERN_PROCESSOR=true                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/checkout/checkout.toml (Linux)                           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [ecommerce]
//! base_url = "https://ecommerce.example.com"
//! payment_response_url = "https://ecommerce.example.com/api/v2/payment/stripe/"
//!
//! [processor]
//! modern_processor_enabled = true
//!
//! [session]
//! cookie_name = "tglr_correlation_id"
//! query_param = "correlationId"
//! ttl_minutes = 30
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FlowError, FlowResult};

// =============================================================================
// Ecommerce Settings
// =============================================================================

/// Where the ecommerce backend lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcommerceSettings {
    /// Base URL of the ecommerce service (redirect targets are built from it).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Endpoint that finalizes a processor payment.
    #[serde(default = "default_payment_response_url")]
    pub payment_response_url: String,
}

fn default_base_url() -> String {
    "http://localhost:8002".to_string()
}

fn default_payment_response_url() -> String {
    "http://localhost:8002/api/v2/payment/stripe/".to_string()
}

impl Default for EcommerceSettings {
    fn default() -> Self {
        EcommerceSettings {
            base_url: default_base_url(),
            payment_response_url: default_payment_response_url(),
        }
    }
}

impl EcommerceSettings {
    /// Page shown when the cardholder fails the sanctions screening.
    pub fn sdn_failure_url(&self) -> String {
        format!("{}/payment/sdn/failure/", self.base_url.trim_end_matches('/'))
    }
}

// =============================================================================
// Processor Settings
// =============================================================================

/// Payment processor integration switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessorSettings {
    /// Use the modern processor widget (dynamic payment methods) instead of
    /// the legacy card form.
    #[serde(default)]
    pub modern_processor_enabled: bool,
}

// =============================================================================
// Session Settings
// =============================================================================

/// Analytics correlation cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Query parameter that can carry a correlation ID into the page.
    #[serde(default = "default_query_param")]
    pub query_param: String,

    /// Cookie lifetime, refreshed on every page load.
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,
}

fn default_cookie_name() -> String {
    "tglr_correlation_id".to_string()
}

fn default_query_param() -> String {
    "correlationId".to_string()
}

fn default_ttl_minutes() -> i64 {
    30
}

/// Longest accepted cookie lifetime: one year.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            cookie_name: default_cookie_name(),
            query_param: default_query_param(),
            ttl_minutes: default_ttl_minutes(),
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
        }
    }
}

// =============================================================================
// Main Checkout Configuration
// =============================================================================

/// Complete checkout configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub ecommerce: EcommerceSettings,

    #[serde(default)]
    pub processor: ProcessorSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl CheckoutConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (checkout.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> FlowResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses configuration from a TOML string and validates it.
    pub fn from_toml(contents: &str) -> FlowResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> FlowResult<()> {
        parse_http_url("ecommerce.base_url", &self.ecommerce.base_url)?;
        parse_http_url(
            "ecommerce.payment_response_url",
            &self.ecommerce.payment_response_url,
        )?;

        if self.session.cookie_name.is_empty() {
            return Err(FlowError::InvalidConfig(
                "session.cookie_name must not be empty".into(),
            ));
        }

        if self.session.ttl_minutes <= 0 {
            return Err(FlowError::InvalidConfig(
                "session.ttl_minutes must be greater than 0".into(),
            ));
        }

        if self.session.ttl_minutes > MAX_SESSION_TTL_MINUTES {
            return Err(FlowError::InvalidConfig(format!(
                "session.ttl_minutes must be at most {}",
                MAX_SESSION_TTL_MINUTES
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CHECKOUT_ECOMMERCE_BASE_URL") {
            debug!(url = %url, "Overriding ecommerce base URL from environment");
            self.ecommerce.base_url = url;
        }

        if let Ok(url) = std::env::var("CHECKOUT_PAYMENT_RESPONSE_URL") {
            self.ecommerce.payment_response_url = url;
        }

        if let Ok(flag) = std::env::var("CHECKOUT_MODERN_PROCESSOR") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.processor.modern_processor_enabled = true,
                "0" | "false" | "no" | "off" => self.processor.modern_processor_enabled = false,
                _ => warn!(value = %flag, "Unknown CHECKOUT_MODERN_PROCESSOR value"),
            }
        }

        if let Ok(ttl) = std::env::var("CHECKOUT_SESSION_TTL_MINUTES") {
            if let Ok(minutes) = ttl.parse::<i64>() {
                self.session.ttl_minutes = minutes;
            }
        }

        if let Ok(level) = std::env::var("CHECKOUT_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "checkout", "checkout")
            .map(|dirs| dirs.config_dir().join("checkout.toml"))
    }
}

fn parse_http_url(setting: &str, value: &str) -> FlowResult<Url> {
    let url = Url::parse(value).map_err(|e| FlowError::InvalidUrl {
        setting: setting.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FlowError::InvalidUrl {
            setting: setting.to_string(),
            reason: format!("expected http or https, got {}", url.scheme()),
        });
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CheckoutConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.processor.modern_processor_enabled);
        assert_eq!(config.session.cookie_name, "tglr_correlation_id");
        assert_eq!(config.session.ttl_minutes, 30);
    }

    #[test]
    fn test_from_toml_with_partial_sections() {
        let config = CheckoutConfig::from_toml(
            r#"
            [ecommerce]
            base_url = "https://ecommerce.example.com/"

            [processor]
            modern_processor_enabled = true
            "#,
        )
        .unwrap();

        assert!(config.processor.modern_processor_enabled);
        assert_eq!(
            config.ecommerce.sdn_failure_url(),
            "https://ecommerce.example.com/payment/sdn/failure/"
        );
        assert_eq!(config.session.query_param, "correlationId");
    }

    #[test]
    fn test_config_validation() {
        let mut config = CheckoutConfig::default();

        config.ecommerce.base_url = "not a url".to_string();
        assert!(matches!(
            config.validate(),
            Err(FlowError::InvalidUrl { .. })
        ));

        config.ecommerce.base_url = "ftp://ecommerce.example.com".to_string();
        assert!(config.validate().is_err());

        config.ecommerce.base_url = "https://ecommerce.example.com".to_string();
        config.session.ttl_minutes = 0;
        assert!(matches!(
            config.validate(),
            Err(FlowError::InvalidConfig(_))
        ));

        config.session.ttl_minutes = MAX_SESSION_TTL_MINUTES;
        assert!(config.validate().is_ok());

        config.session.ttl_minutes = i64::MAX / 2;
        assert!(matches!(
            config.validate(),
            Err(FlowError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nttl_minutes = 45").unwrap();

        let config = CheckoutConfig::load(Some(file.path().to_path_buf())).unwrap();
        // Environment may override, but only if the test runner sets it.
        if std::env::var("CHECKOUT_SESSION_TTL_MINUTES").is_err() {
            assert_eq!(config.session.ttl_minutes, 45);
        }
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session\nttl_minutes = ").unwrap();

        assert!(matches!(
            CheckoutConfig::load(Some(file.path().to_path_buf())),
            Err(FlowError::ConfigLoadFailed(_))
        ));
    }

    #[test]
    fn test_toml_serialization() {
        let config = CheckoutConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[ecommerce]"));
        assert!(toml_str.contains("[session]"));
    }
}
