//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Email (default SMTP relay) configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> u64 {
    604_800 // 7 days
}

/// Default SMTP relay configuration.
///
/// Organizations may override these per tenant; this relay is the fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP host.
    pub smtp_host: String,
    /// SMTP port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// From address for outbound mail.
    pub from_email: String,
    /// Display name for outbound mail.
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@faktura.local".to_string(),
            from_name: "Faktura".to_string(),
        }
    }
}

/// Object storage configuration section.
///
/// Converted into the typed provider config in `faktura-core` at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Provider kind: `local`, `s3`, or `azblob`.
    #[serde(default = "default_storage_provider")]
    pub provider: String,
    /// Root directory (local provider).
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Endpoint URL (S3-compatible providers).
    pub endpoint: Option<String>,
    /// Bucket name (S3-compatible providers).
    pub bucket: Option<String>,
    /// Access key id (S3-compatible providers).
    pub access_key_id: Option<String>,
    /// Secret access key (S3-compatible providers).
    pub secret_access_key: Option<String>,
    /// Region (S3-compatible providers).
    pub region: Option<String>,
    /// Account name (Azure Blob).
    pub account: Option<String>,
    /// Account access key (Azure Blob).
    pub access_key: Option<String>,
    /// Container name (Azure Blob).
    pub container: Option<String>,
}

fn default_storage_provider() -> String {
    "local".to_string()
}

fn default_storage_root() -> String {
    "./storage".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            root: default_storage_root(),
            endpoint: None,
            bucket: None,
            access_key_id: None,
            secret_access_key: None,
            region: None,
            account: None,
            access_key: None,
            container: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FAKTURA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_config_default() {
        let config = EmailConfig::default();
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 1025);
        assert_eq!(config.from_name, "Faktura");
    }

    #[test]
    fn test_storage_settings_default() {
        let settings = StorageSettings::default();
        assert_eq!(settings.provider, "local");
        assert_eq!(settings.root, "./storage");
        assert!(settings.bucket.is_none());
    }
}
