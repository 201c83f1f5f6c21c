//! # mdm_metadata
//!
//! The entity type model of the MDM metadata repository: complex types with
//! their fields and keys, single/multiple inheritance flattened at freeze time,
//! `xsi:type`-aware field-path resolution, deep copies, visitors and
//! validation dispatch.

#![deny(unused_crate_dependencies)]

pub mod annotation;
pub mod complex;
pub mod copy;
pub mod field;
pub mod freeze;
pub mod manifest;
pub mod path;
pub mod repository;
pub mod simple;
pub mod types;
pub mod validation;
pub mod view;
pub mod visitor;

pub use annotation::AnnotationState;
pub use complex::{AccessDirectives, ComplexTypeMetadata, ContainerRef, DeleteType};
pub use field::{FieldKind, FieldMetadata, FieldRef, ReferenceInfo};
pub use manifest::ModelManifest;
pub use repository::{MetadataRepository, TypeMetadata};
pub use simple::SimpleTypeMetadata;
pub use types::{Locale, QualifiedName, TypeId, XsdType};
pub use view::ComplexTypeRef;
pub use visitor::MetadataVisitor;

use thiserror::Error;

/// Result type returned by metadata operations.
pub type MetadataResult<T> = core::result::Result<T, MetadataError>;

/// Error type returned by metadata operations.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Type '{name}' is frozen and can not be modified.")]
    Frozen { name: String },
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),
    #[error("Type '{type_name}' does not own field '{path}' (could not find '{step}').")]
    UnresolvedField {
        type_name: String,
        path: String,
        step: String,
    },
    #[error("Type '{name}' is not a complex type.")]
    NotComplex { name: String },
    #[error("No type registered with id {0}.")]
    UnknownType(TypeId),
    #[error("Type {0} is already registered.")]
    DuplicateType(String),
    #[error("Type '{name}' inherits from itself.")]
    CyclicInheritance { name: String },
    #[error("Not implemented: {0}")]
    NotImplemented(String),
    #[error("Invalid model manifest: {0}")]
    Manifest(String),
    #[error("Manifest YAML error: {0:#?}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("File IO error: {0} {1:?}.")]
    FileError(String, #[source] std::io::Error),
}

pub mod prelude {
    pub use super::{
        AccessDirectives, AnnotationState, ComplexTypeMetadata, ComplexTypeRef, ContainerRef,
        DeleteType, FieldKind, FieldMetadata, FieldRef, Locale, MetadataError,
        MetadataRepository, MetadataResult, MetadataVisitor, ModelManifest, QualifiedName,
        ReferenceInfo, SimpleTypeMetadata, TypeId, TypeMetadata, XsdType,
    };
    pub use crate::validation::{ValidationFactory, ValidationHandler, ValidationRule};
}
