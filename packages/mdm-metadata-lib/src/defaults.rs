pub const LOG_LEVEL: &str = "info";
pub const VERBOSE_LOGGING: bool = false;

pub const DEFAULT_LOCALE: &str = "en";

pub const BUILTIN_NAMESPACE: &str = crate::XML_SCHEMA_NAMESPACE;
pub const DEFAULT_NAMESPACE: &str = "";

pub const HUMAN_LOGGING: bool = true;
