use crate::{
    defaults,
    utils::{is_opt_env_var, trim_opt_env_key},
};
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path};
use strum::{AsRefStr, EnumString};
use thiserror::Error;
use tracing::debug;

/// Error type returned by configuration operations.
#[derive(Error, Debug)]
pub enum MetadataConfigError {
    #[error("Error parsing env variables from config: {0:?}")]
    EnvVarParseError(#[from] std::env::VarError),
    #[error("Invalid environment variable reference in config: {0:?}")]
    InvalidEnvVar(String),
    #[error("Error processing file: {0:?}")]
    ConfigFileError(#[from] std::io::Error),
    #[error("Error processing YAML file: {0:?}")]
    SerdeYamlError(#[from] serde_yaml::Error),
}

/// Result type returned by configuration operations.
pub type MetadataConfigResult<T> = core::result::Result<T, MetadataConfigError>;

/// Environment variables consulted by the logging setup.
#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "RUST_LOG")]
    RustLog,
    #[strum(serialize = "HUMAN_LOGGING")]
    HumanLogging,
}

/// Return the value of `var`, or `default` when it is unset.
pub fn env_or_default(var: EnvVar, default: String) -> String {
    std::env::var(var.as_ref()).unwrap_or(default)
}

pub trait Env {
    fn inject_opt_env_vars(&mut self) -> MetadataConfigResult<()>;
}

/// Resolve a `$VAR` / `${VAR}` placeholder in place.
fn inject_opt_env_var(value: &mut String) -> MetadataConfigResult<()> {
    if is_opt_env_var(value) {
        *value = std::env::var(trim_opt_env_key(value)?)?;
    }
    Ok(())
}

/// Namespaces used when populating a repository.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct SchemaConfig {
    /// Namespace under which the built-in simple types are registered.
    #[serde(default = "SchemaConfig::default_builtin_namespace")]
    pub builtin_namespace: String,

    /// Namespace given to manifest types that do not declare one.
    #[serde(default)]
    pub default_namespace: String,
}

impl SchemaConfig {
    fn default_builtin_namespace() -> String {
        defaults::BUILTIN_NAMESPACE.to_string()
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            builtin_namespace: defaults::BUILTIN_NAMESPACE.to_string(),
            default_namespace: defaults::DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl Env for SchemaConfig {
    fn inject_opt_env_vars(&mut self) -> MetadataConfigResult<()> {
        inject_opt_env_var(&mut self.builtin_namespace)?;
        inject_opt_env_var(&mut self.default_namespace)?;
        Ok(())
    }
}

/// Metadata model configuration.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct MetadataConfig {
    #[serde(default = "MetadataConfig::default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default = "MetadataConfig::default_locale")]
    pub default_locale: String,
    #[serde(default)]
    pub schema: SchemaConfig,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            verbose: defaults::VERBOSE_LOGGING,
            default_locale: defaults::DEFAULT_LOCALE.to_string(),
            schema: SchemaConfig::default(),
        }
    }
}

impl MetadataConfig {
    fn default_log_level() -> String {
        defaults::LOG_LEVEL.to_string()
    }

    fn default_locale() -> String {
        defaults::DEFAULT_LOCALE.to_string()
    }

    /// Load a configuration from a YAML file. Keys missing from the file keep
    /// their default values.
    pub fn from_file(path: impl AsRef<Path>) -> MetadataConfigResult<Self> {
        let file = File::open(path.as_ref())?;
        let mut config: MetadataConfig = serde_yaml::from_reader(file)?;
        config.inject_opt_env_vars()?;

        debug!("Loaded metadata configuration from {:?}", path.as_ref());

        Ok(config)
    }

    /// Load a configuration from YAML content.
    pub fn from_yaml(content: &str) -> MetadataConfigResult<Self> {
        let mut config: MetadataConfig = serde_yaml::from_str(content)?;
        config.inject_opt_env_vars()?;
        Ok(config)
    }

    // Inject env vars into each section of the config
    pub fn inject_opt_env_vars(&mut self) -> MetadataConfigResult<()> {
        inject_opt_env_var(&mut self.log_level)?;
        inject_opt_env_var(&mut self.default_locale)?;
        self.schema.inject_opt_env_vars()?;

        Ok(())
    }
}
