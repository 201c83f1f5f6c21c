//! # mdm-metadata-lib
//!
//! `mdm-metadata-lib` is a collection of utilities shared by the `mdm-metadata-*` crates:
//! configuration, defaults, logging and a handful of well-known schema constants.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod defaults;
pub mod utils;

/// Namespace of the XML Schema built-in (simple) types.
pub const XML_SCHEMA_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Attribute used in field paths to name the concrete subtype of a step.
pub const XSI_TYPE_ATTRIBUTE: &str = "@xsi:type";

/// Separator between the steps of a field path.
pub const PATH_SEPARATOR: char = '/';

/// Render a `(namespace, name)` pair the way types are displayed in logs and errors.
///
/// An empty namespace is omitted: `[Person]` vs `[urn:mdm:Person]`.
pub fn display_type_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        format!("[{name}]")
    } else {
        format!("[{namespace}:{name}]")
    }
}
