//! Configuration for the memory agent.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use memsight_common::session::build_zenoh_config;
use memsight_common::{
    DimensionSet, Format, KEY_PREFIX, LoggingConfig, Unit, ZenohConfig, sanitize_key,
    validate_key_prefix, validate_namespace,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::args::AgentArgs;
use crate::dimensions;
use crate::units::parse_memory_unit;

/// Longest accepted sampling period, in seconds.
pub const MAX_PERIOD_SECS: u64 = 24 * 60 * 60;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Invalid memory unit '{0}': expected bytes, kilobytes, megabytes or gigabytes")]
    InvalidUnit(String),
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Zenoh connection settings.
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Wire format of published batches.
    #[serde(default)]
    pub serialization: Format,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Sampling and publishing settings.
    #[serde(default)]
    pub agent: MemoryConfig,
}

/// Sampling and publishing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Key expression prefix (default: "memsight").
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Metric namespace (default: "System/Linux").
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Hostname used as the batch source.
    /// Use "auto" to detect automatically (default).
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Sampling period in seconds (default: 5).
    #[serde(default = "default_period")]
    pub period_secs: u64,

    /// Consecutive publish failures tolerated before exiting (default: 3).
    #[serde(default = "default_grace")]
    pub grace: u64,

    /// Unit of the used/available metrics (default: "bytes").
    #[serde(default = "default_unit")]
    pub unit: String,

    #[serde(default)]
    pub instance_id: String,

    #[serde(default)]
    pub autoscaling_group_name: String,

    #[serde(default)]
    pub instance_type: String,

    #[serde(default)]
    pub image_id: String,

    /// Extra dimensions, added after the instance attributes.
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            namespace: default_namespace(),
            hostname: default_hostname(),
            period_secs: default_period(),
            grace: default_grace(),
            unit: default_unit(),
            instance_id: String::new(),
            autoscaling_group_name: String::new(),
            instance_type: String::new(),
            image_id: String::new(),
            dimensions: BTreeMap::new(),
        }
    }
}

fn default_key_prefix() -> String {
    KEY_PREFIX.to_string()
}

fn default_namespace() -> String {
    "System/Linux".to_string()
}

fn default_hostname() -> String {
    "auto".to_string()
}

fn default_period() -> u64 {
    5
}

fn default_grace() -> u64 {
    3
}

fn default_unit() -> String {
    "bytes".to_string()
}

/// Immutable runtime settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub period: Duration,
    pub unit: Unit,
    pub namespace: String,
    pub grace: u64,
    pub key_prefix: String,
    /// Sanitized hostname used in the batch key.
    pub source: String,
    pub format: Format,
    pub dimensions: DimensionSet,
}

impl AgentConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        Ok(json5::from_str(&content)?)
    }

    /// Load the configuration selected by the CLI and apply flag overrides.
    ///
    /// An explicit `--config` must exist. Without one, the default file is
    /// read when present and built-in defaults are used otherwise.
    pub fn from_args(args: &AgentArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(AgentArgs::DEFAULT_CONFIG).exists() => {
                Self::load_from_file(AgentArgs::DEFAULT_CONFIG)?
            }
            None => Self::default(),
        };

        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Override file values with the ones given on the command line.
    pub fn apply_args(&mut self, args: &AgentArgs) {
        let agent = &mut self.agent;

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if let Some(period) = args.period {
            agent.period_secs = period;
        }
        if let Some(grace) = args.grace {
            agent.grace = grace;
        }
        if let Some(namespace) = &args.namespace {
            agent.namespace = namespace.clone();
        }
        if let Some(unit) = &args.unit {
            agent.unit = unit.clone();
        }
        if let Some(v) = &args.instance_id {
            agent.instance_id = v.clone();
        }
        if let Some(v) = &args.autoscaling_group_name {
            agent.autoscaling_group_name = v.clone();
        }
        if let Some(v) = &args.instance_type {
            agent.instance_type = v.clone();
        }
        if let Some(v) = &args.image_id {
            agent.image_id = v.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.period_secs == 0 {
            return Err(ConfigError::Validation(
                "period_secs must be > 0".to_string(),
            ));
        }
        if self.agent.period_secs > MAX_PERIOD_SECS {
            return Err(ConfigError::Validation(format!(
                "period_secs must be <= {} (one day)",
                MAX_PERIOD_SECS
            )));
        }

        parse_memory_unit(&self.agent.unit)?;

        validate_namespace(&self.agent.namespace)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        validate_key_prefix(&self.agent.key_prefix)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if let Some(auth) = &self.zenoh.auth {
            if auth.user.is_empty() {
                return Err(ConfigError::MissingCredentials(
                    "zenoh.auth.user is empty".to_string(),
                ));
            }
            if auth.password.is_empty() {
                return Err(ConfigError::MissingCredentials(
                    "zenoh.auth.password is empty".to_string(),
                ));
            }
        }

        build_zenoh_config(&self.zenoh).map_err(|e| ConfigError::Validation(e.to_string()))?;

        Ok(())
    }

    /// Get the hostname to use, resolving "auto" if needed.
    pub fn get_hostname(&self) -> String {
        if self.agent.hostname == "auto" {
            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string())
        } else {
            self.agent.hostname.clone()
        }
    }

    /// Candidate dimensions in publishing order.
    pub fn dimension_candidates(&self) -> Vec<(String, String)> {
        let agent = &self.agent;
        let mut pairs = vec![
            ("InstanceId".to_string(), agent.instance_id.clone()),
            (
                "AutoScalingGroupName".to_string(),
                agent.autoscaling_group_name.clone(),
            ),
            ("InstanceType".to_string(), agent.instance_type.clone()),
            ("ImageId".to_string(), agent.image_id.clone()),
        ];
        pairs.extend(
            agent
                .dimensions
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        pairs
    }

    /// Resolve the immutable runtime settings.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        self.validate()?;

        let source = sanitize_key(&self.get_hostname());
        if source.is_empty() {
            return Err(ConfigError::Validation(
                "hostname resolves to an empty key".to_string(),
            ));
        }

        Ok(Settings {
            period: Duration::from_secs(self.agent.period_secs),
            unit: parse_memory_unit(&self.agent.unit)?,
            namespace: self.agent.namespace.clone(),
            grace: self.agent.grace,
            key_prefix: self.agent.key_prefix.clone(),
            source,
            format: self.serialization,
            dimensions: dimensions::build(self.dimension_candidates()),
        })
    }
}
