use crate::error::{ConfigError, InspectorError};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "RawConfig")]
pub struct Config {
    pub region: String,
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
}

/// Intermediate type for deserialization (fills in defaults).
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    region: Option<String>,
    endpoint: Option<String>,
    #[serde(default = "default_timeout")]
    timeout_seconds: u64,
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Self {
            region: raw.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: raw.endpoint,
            timeout_seconds: raw.timeout_seconds,
        }
    }
}

const fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Config {
    /// Loads the config from `path`, or from the default location if it exists.
    /// Region environment variables take precedence over the file.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => {
                let default_path = config_file_path()?;
                if default_path.exists() {
                    Self::load_from_path(&default_path)?
                } else {
                    tracing::debug!(
                        "No config file at {}, using defaults",
                        default_path.display()
                    );
                    Self::default()
                }
            }
        };
        let config = config.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(config_path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            ConfigError::Invalid(format!(
                "Cannot read config at {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| {
            ConfigError::Invalid(format!("Invalid TOML in {}: {}", config_path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// `AWS_REGION` wins over `AWS_DEFAULT_REGION`, both win over the file.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(region) = lookup("AWS_REGION")
            .or_else(|| lookup("AWS_DEFAULT_REGION"))
            .filter(|r| !r.trim().is_empty())
        {
            self.region = region;
        }
        self
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.region.trim().is_empty() {
            anyhow::bail!("region must not be empty");
        }
        if self.timeout_seconds == 0 || self.timeout_seconds > 3600 {
            anyhow::bail!("timeout_seconds must be between 1 and 3600");
        }
        if let Some(ref endpoint) = self.endpoint {
            let url = reqwest::Url::parse(endpoint)
                .map_err(|e| ConfigError::Invalid(format!("endpoint {endpoint:?}: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("endpoint must be an http or https URL: {endpoint}");
            }
        }
        Ok(())
    }

    pub fn effective_endpoint(&self) -> String {
        if let Some(ref endpoint) = self.endpoint {
            return endpoint.trim_end_matches('/').to_string();
        }
        format!("https://inspector2.{}.amazonaws.com", self.region)
    }
}

fn config_file_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Invalid("Cannot determine home directory".to_string())
    })?;
    Ok(home
        .join(".config")
        .join("inspector-scan")
        .join("config.toml"))
}

/// Static AWS credentials used to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn from_env() -> Result<Self, InspectorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InspectorError> {
        let non_empty = |key: &'static str| lookup(key).filter(|v| !v.is_empty());
        let access_key_id = non_empty("AWS_ACCESS_KEY_ID")
            .ok_or(InspectorError::MissingCredentials("AWS_ACCESS_KEY_ID"))?;
        let secret_access_key = non_empty("AWS_SECRET_ACCESS_KEY")
            .ok_or(InspectorError::MissingCredentials("AWS_SECRET_ACCESS_KEY"))?;
        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: non_empty("AWS_SESSION_TOKEN"),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}
