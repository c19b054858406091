use std::fmt;
use std::time::Duration;

use nbsync_connector::config::{AuthConfig, ConnectionSettings, HttpConfig};
use nbsync_reconciliation::{ReconciliationConfig, DEFAULT_ROLE_IDS};

/// Configuration for the sync service.
#[derive(Clone)]
pub struct SyncConfig {
    /// Pause between cycles.
    pub sync_frequency: Duration,

    /// NetBox API base URL, e.g. `https://netbox.example.com/api`.
    pub netbox_url: String,
    netbox_api_token: String,

    /// LibreNMS API base URL, e.g. `https://librenms.example.com/api/v0`.
    pub librenms_url: String,
    librenms_api_token: String,

    /// DNS suffix appended to NetBox device names.
    pub domain_name: String,

    /// NetBox role ids that are synced.
    pub role_ids: Vec<i64>,

    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,

    /// Log planned writes without sending them.
    pub dry_run: bool,
}

impl SyncConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let required = |key: &str| -> Result<String, ConfigError> {
            match reader(key) {
                Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => Err(ConfigError::MissingVar(key.into())),
            }
        };

        let sync_frequency = parse_secs(&reader, "SYNC_FREQUENCY", 300)?;
        if sync_frequency == 0 {
            return Err(ConfigError::InvalidValue(
                "SYNC_FREQUENCY".into(),
                "must be greater than zero".into(),
            ));
        }

        let netbox_url = required("NETBOX_URL")?;
        let netbox_api_token = required("NETBOX_API_TOKEN")?;
        let librenms_url = required("LIBRENMS_URL")?;
        let librenms_api_token = required("LIBRENMS_API_TOKEN")?;
        let domain_name = required("DOMAIN_NAME")?
            .trim_start_matches('.')
            .to_string();

        let role_ids = match reader("NETBOX_ROLE_IDS") {
            Ok(raw) if !raw.trim().is_empty() => parse_role_ids(&raw)?,
            _ => DEFAULT_ROLE_IDS.to_vec(),
        };

        let connect_timeout_secs = parse_secs(&reader, "HTTP_CONNECT_TIMEOUT_SECS", 10)?;
        let request_timeout_secs = parse_secs(&reader, "HTTP_TIMEOUT_SECS", 30)?;

        let dry_run = match reader("SYNC_DRY_RUN") {
            Ok(raw) => parse_flag(&raw).ok_or_else(|| {
                ConfigError::InvalidValue("SYNC_DRY_RUN".into(), format!("not a boolean: {raw}"))
            })?,
            Err(_) => false,
        };

        Ok(Self {
            sync_frequency: Duration::from_secs(sync_frequency),
            netbox_url,
            netbox_api_token,
            librenms_url,
            librenms_api_token,
            domain_name,
            role_ids,
            connect_timeout_secs,
            request_timeout_secs,
            dry_run,
        })
    }

    fn connection(&self) -> ConnectionSettings {
        ConnectionSettings::new()
            .with_connection_timeout(self.connect_timeout_secs)
            .with_request_timeout(self.request_timeout_secs)
    }

    /// NetBox authenticates with `Authorization: Token <token>`.
    pub fn netbox_http_config(&self) -> HttpConfig {
        HttpConfig::new(self.netbox_url.as_str())
            .with_auth(AuthConfig::token(self.netbox_api_token.as_str()))
            .with_connection(self.connection())
    }

    /// LibreNMS authenticates with `Authorization: Bearer <token>`.
    pub fn librenms_http_config(&self) -> HttpConfig {
        HttpConfig::new(self.librenms_url.as_str())
            .with_auth(AuthConfig::bearer(self.librenms_api_token.as_str()))
            .with_connection(self.connection())
    }

    pub fn reconciliation_config(&self) -> ReconciliationConfig {
        ReconciliationConfig::new(self.domain_name.as_str())
            .with_allowed_role_ids(self.role_ids.clone())
            .with_dry_run(self.dry_run)
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("sync_frequency", &self.sync_frequency)
            .field("netbox_url", &self.netbox_url)
            .field("netbox_api_token", &"[REDACTED]")
            .field("librenms_url", &self.librenms_url)
            .field("librenms_api_token", &"[REDACTED]")
            .field("domain_name", &self.domain_name)
            .field("role_ids", &self.role_ids)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn parse_secs<F>(reader: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match reader(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(key.into(), e.to_string())),
        Err(_) => Ok(default),
    }
}

fn parse_role_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|e| {
                ConfigError::InvalidValue("NETBOX_ROLE_IDS".into(), format!("{part}: {e}"))
            })
        })
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
