//! Application configuration for Gateway Report.
//!
//! User config lives at `~/.gatewayreport/gatewayreport.toml`.
//! Secrets never live in the file: it names the environment variables that
//! hold them. The file is read once per invocation and resolved into an
//! immutable [`ReportConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GatewayReportError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "gatewayreport.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".gatewayreport";

/// Public analytics API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

// ---------------------------------------------------------------------------
// Config structs (matching gatewayreport.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Analytics API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Report addressing.
    #[serde(default)]
    pub email: EmailConfig,

    /// Outgoing mail server.
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Account the report is scoped to.
    #[serde(default)]
    pub account_id: String,

    /// Name of the env var holding the bearer token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// API root; `/graphql` and `/accounts/...` are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            token_env: default_token_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_token_env() -> String {
    "GATEWAY_REPORT_API_TOKEN".into()
}
fn default_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default API URL is valid")
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[email]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Envelope and `From:` address.
    #[serde(default)]
    pub sender_address: String,

    /// Display name for the `From:` header.
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Envelope and `To:` address.
    #[serde(default)]
    pub recipient_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sender_address: String::new(),
            sender_name: default_sender_name(),
            recipient_address: String::new(),
        }
    }
}

fn default_sender_name() -> String {
    "Gateway Report".into()
}

/// Transport security used for the SMTP connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// Plain connection upgraded with STARTTLS.
    #[default]
    Starttls,
    /// TLS from the first byte (port 465).
    Implicit,
    /// No encryption, for local relays only.
    #[serde(rename = "none")]
    Plain,
}

/// `[smtp]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub tls: SmtpTls,

    /// Login name; authentication is skipped when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Name of the env var holding the SMTP password.
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            tls: SmtpTls::default(),
            username: None,
            password_env: default_password_env(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".into()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_password_env() -> String {
    "GATEWAY_REPORT_SMTP_PASSWORD".into()
}

// ---------------------------------------------------------------------------
// Resolved config (file + environment, read once per invocation)
// ---------------------------------------------------------------------------

/// Immutable settings for one report invocation.
#[derive(Clone)]
pub struct ReportConfig {
    /// Bearer token for both analytics endpoints. Never empty.
    pub api_token: String,
    pub account_id: String,
    pub api_base_url: Url,
    pub request_timeout: Duration,
    pub sender_address: String,
    pub sender_name: String,
    pub recipient_address: String,
}

impl std::fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportConfig")
            .field("api_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("sender_address", &self.sender_address)
            .field("sender_name", &self.sender_name)
            .field("recipient_address", &self.recipient_address)
            .finish()
    }
}

impl ReportConfig {
    /// Resolve against the process environment.
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve using `lookup` to read environment variables.
    pub fn resolve_with(
        config: &AppConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let var_name = &config.api.token_env;
        let api_token = match lookup(var_name) {
            Some(val) if !val.trim().is_empty() => val.trim().to_string(),
            _ => {
                return Err(GatewayReportError::config(format!(
                    "API token not found. Set the {var_name} environment variable."
                )));
            }
        };

        let account_id = require("api.account_id", &config.api.account_id)?;
        let sender_address = require("email.sender_address", &config.email.sender_address)?;
        let recipient_address =
            require("email.recipient_address", &config.email.recipient_address)?;

        if config.api.timeout_secs == 0 {
            return Err(GatewayReportError::config(
                "api.timeout_secs must be greater than zero",
            ));
        }

        Ok(Self {
            api_token,
            account_id,
            api_base_url: config.api.base_url.clone(),
            request_timeout: Duration::from_secs(config.api.timeout_secs),
            sender_address,
            sender_name: config.email.sender_name.clone(),
            recipient_address,
        })
    }
}

/// SMTP settings with the password pulled from the environment.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    /// `(username, password)` when authentication is configured.
    pub credentials: Option<(String, String)>,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("username", &self.credentials.as_ref().map(|(u, _)| u))
            .finish()
    }
}

impl SmtpSettings {
    pub fn resolve(config: &SmtpConfig) -> Result<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    pub fn resolve_with(
        config: &SmtpConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let host = require("smtp.host", &config.host)?;

        let credentials = match &config.username {
            Some(user) if !user.is_empty() => {
                let password = lookup(&config.password_env).ok_or_else(|| {
                    GatewayReportError::config(format!(
                        "smtp.username is set but {} is not",
                        config.password_env
                    ))
                })?;
                Some((user.clone(), password))
            }
            _ => None,
        };

        Ok(Self {
            host,
            port: config.port,
            tls: config.tls,
            credentials,
        })
    }
}

fn require(key: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GatewayReportError::config(format!("{key} is not set")));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.gatewayreport/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GatewayReportError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.gatewayreport/gatewayreport.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GatewayReportError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        GatewayReportError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GatewayReportError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Err(GatewayReportError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| GatewayReportError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GatewayReportError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.api.account_id = "acct-123".into();
        config.email.sender_address = "reports@example.com".into();
        config.email.recipient_address = "alerts@example.com".into();
        config
    }

    fn env_with_token(name: &str) -> Option<String> {
        (name == "GATEWAY_REPORT_API_TOKEN").then(|| "secret-token".to_string())
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("GATEWAY_REPORT_API_TOKEN"));
        assert!(toml_str.contains("https://api.cloudflare.com/client/v4"));
        assert!(toml_str.contains("starttls"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let toml_str = r#"
[api]
account_id = "abc"

[email]
sender_address = "from@example.com"
recipient_address = "to@example.com"

[smtp]
host = "smtp.example.com"
port = 465
tls = "implicit"
username = "mailer"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.api.account_id, "abc");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.email.sender_name, "Gateway Report");
        assert_eq!(config.smtp.tls, SmtpTls::Implicit);
        assert_eq!(config.smtp.username.as_deref(), Some("mailer"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let toml_str = "[api]\nbase_url = \"not a url\"\n";
        assert!(toml::from_str::<AppConfig>(toml_str).is_err());
    }

    #[test]
    fn resolve_reads_token_from_env() {
        let resolved = ReportConfig::resolve_with(&filled_config(), env_with_token).expect("resolve");
        assert_eq!(resolved.api_token, "secret-token");
        assert_eq!(resolved.account_id, "acct-123");
        assert_eq!(resolved.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn resolve_rejects_missing_or_empty_token() {
        let err = ReportConfig::resolve_with(&filled_config(), |_| None).unwrap_err();
        assert!(err.to_string().contains("API token not found"));

        let err = ReportConfig::resolve_with(&filled_config(), |_| Some("   ".into())).unwrap_err();
        assert!(err.to_string().contains("GATEWAY_REPORT_API_TOKEN"));
    }

    #[test]
    fn resolve_requires_addresses_and_account() {
        let mut config = filled_config();
        config.email.recipient_address.clear();
        let err = ReportConfig::resolve_with(&config, env_with_token).unwrap_err();
        assert!(err.to_string().contains("email.recipient_address"));

        let mut config = filled_config();
        config.api.account_id = " ".into();
        let err = ReportConfig::resolve_with(&config, env_with_token).unwrap_err();
        assert!(err.to_string().contains("api.account_id"));
    }

    #[test]
    fn debug_output_redacts_token() {
        let resolved = ReportConfig::resolve_with(&filled_config(), env_with_token).unwrap();
        let debug = format!("{resolved:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn smtp_credentials_need_password() {
        let mut smtp = SmtpConfig::default();
        assert!(SmtpSettings::resolve_with(&smtp, |_| None).unwrap().credentials.is_none());

        smtp.username = Some("mailer".into());
        assert!(SmtpSettings::resolve_with(&smtp, |_| None).is_err());

        let settings = SmtpSettings::resolve_with(&smtp, |_| Some("pw".into())).unwrap();
        assert_eq!(settings.credentials, Some(("mailer".into(), "pw".into())));
        assert!(!format!("{settings:?}").contains("pw\""));
    }
}
