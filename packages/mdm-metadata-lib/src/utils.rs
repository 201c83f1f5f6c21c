use crate::{
    config::{
        env_or_default, EnvVar, MetadataConfig, MetadataConfigError, MetadataConfigResult,
    },
    defaults,
};
use std::str::FromStr;
use tracing_subscriber::filter::EnvFilter;

/// Trim the leading '$' or '${' and trailing '}' from an environment variable.
pub fn trim_opt_env_key(key: &str) -> MetadataConfigResult<&str> {
    // Ambiguous key: $FOO, non-ambiguous key: ${FOO}
    let name = match key.strip_prefix("${") {
        Some(rest) => rest.strip_suffix('}'),
        None => key.strip_prefix('$'),
    };
    match name {
        Some(name) if !name.is_empty() && !name.contains(['{', '}']) => Ok(name),
        _ => Err(MetadataConfigError::InvalidEnvVar(key.to_string())),
    }
}

/// Determine whether a given key is an environment variable.
pub fn is_opt_env_var(k: &str) -> bool {
    k.starts_with('$') || (k.starts_with("${") && k.ends_with('}'))
}

/// Initialize the logging context for consumers of the metadata model.
///
/// `RUST_LOG` takes precedence over `config.log_level`; `HUMAN_LOGGING=false`
/// switches the output to JSON lines.
pub fn init_logging(config: &MetadataConfig) -> anyhow::Result<()> {
    let mut level = env_or_default(EnvVar::RustLog, config.log_level.clone());

    if config.verbose && !level.contains("mdm_metadata") {
        level = format!("{level},mdm_metadata=debug");
    }

    let filter = EnvFilter::try_new(&level)?;

    let human_logging = bool::from_str(&env_or_default(
        EnvVar::HumanLogging,
        defaults::HUMAN_LOGGING.to_string(),
    ))?;

    let sub = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if human_logging {
        sub.with_ansi(true)
            .with_level(true)
            .with_line_number(true)
            .try_init()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    } else {
        sub.with_ansi(false)
            .with_level(true)
            .with_line_number(true)
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    Ok(())
}
