use crate::{
    types::{QualifiedName, TypeId, XsdType},
    MetadataError, MetadataResult,
};
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// A scalar type: terminal, without fields.
#[derive(Debug, Clone)]
pub struct SimpleTypeMetadata {
    namespace: String,
    name: String,
    super_types: Vec<TypeId>,
    frozen: bool,
}

impl SimpleTypeMetadata {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            super_types: Vec::new(),
            frozen: false,
        }
    }

    /// A frozen built-in type registered under `namespace`.
    pub fn builtin(namespace: impl Into<String>, ty: XsdType) -> Self {
        Self {
            frozen: true,
            ..Self::new(namespace, ty.as_ref())
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(&self.namespace, &self.name)
    }

    /// Simple types never describe records on their own.
    pub fn is_instantiable(&self) -> bool {
        false
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn super_types(&self) -> &[TypeId] {
        &self.super_types
    }

    /// Declare the type this one restricts.
    pub fn add_super_type(&mut self, super_type: TypeId) -> MetadataResult<()> {
        if self.frozen {
            return Err(MetadataError::Frozen {
                name: self.name.clone(),
            });
        }
        if !self.super_types.contains(&super_type) {
            self.super_types.push(super_type);
        }
        Ok(())
    }

    pub(crate) fn mark_frozen(&mut self) {
        self.frozen = true;
    }
}

impl PartialEq for SimpleTypeMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }
}

impl Eq for SimpleTypeMetadata {}

impl Hash for SimpleTypeMetadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for SimpleTypeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}
