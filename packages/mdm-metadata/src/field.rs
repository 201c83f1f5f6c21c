use crate::types::{Locale, TypeId};
use std::collections::HashMap;

/// Foreign-key details of a reference field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceInfo {
    /// Entity type the reference points to.
    pub referenced_type: TypeId,

    /// Field of the referenced type holding the key, when declared.
    pub referenced_field: Option<String>,

    /// Whether foreign-key integrity is enforced.
    pub fk_integrity: bool,

    /// Whether foreign-key integrity checks may be overridden.
    pub fk_integrity_override: bool,
}

impl ReferenceInfo {
    pub fn new(referenced_type: TypeId) -> Self {
        Self {
            referenced_type,
            referenced_field: None,
            fk_integrity: true,
            fk_integrity_override: false,
        }
    }
}

/// What a field holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A scalar value of a simple type.
    Simple,

    /// A value restricted to an enumeration of a simple type.
    Enumeration,

    /// An embedded complex structure.
    Contained,

    /// A foreign key to another entity.
    Reference(ReferenceInfo),
}

/// A field handle: a named member of a complex type.
///
/// `containing_type` is the type that currently owns the field (changed by
/// [`FieldMetadata::adopt`]), `declaring_type` the type that originally declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMetadata {
    name: String,
    field_type: TypeId,
    containing_type: TypeId,
    declaring_type: TypeId,
    kind: FieldKind,
    is_key: bool,
    is_many: bool,
    is_mandatory: bool,
    is_frozen: bool,
    localized_names: HashMap<Locale, String>,
}

impl FieldMetadata {
    fn new(owner: TypeId, name: impl Into<String>, field_type: TypeId, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            field_type,
            containing_type: owner,
            declaring_type: owner,
            kind,
            is_key: false,
            is_many: false,
            is_mandatory: false,
            is_frozen: false,
            localized_names: HashMap::new(),
        }
    }

    /// A field holding a value of the simple type `field_type`.
    pub fn simple(owner: TypeId, name: impl Into<String>, field_type: TypeId) -> Self {
        Self::new(owner, name, field_type, FieldKind::Simple)
    }

    pub fn enumeration(owner: TypeId, name: impl Into<String>, field_type: TypeId) -> Self {
        Self::new(owner, name, field_type, FieldKind::Enumeration)
    }

    /// A field embedding the complex type `field_type`.
    pub fn contained(owner: TypeId, name: impl Into<String>, field_type: TypeId) -> Self {
        Self::new(owner, name, field_type, FieldKind::Contained)
    }

    /// A foreign key whose stored value is of type `field_type`.
    pub fn reference(
        owner: TypeId,
        name: impl Into<String>,
        field_type: TypeId,
        info: ReferenceInfo,
    ) -> Self {
        Self::new(owner, name, field_type, FieldKind::Reference(info))
    }

    pub fn with_key(mut self, is_key: bool) -> Self {
        self.is_key = is_key;
        self
    }

    pub fn with_many(mut self, is_many: bool) -> Self {
        self.is_many = is_many;
        self
    }

    pub fn with_mandatory(mut self, is_mandatory: bool) -> Self {
        self.is_mandatory = is_mandatory;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the field's value.
    pub fn field_type(&self) -> TypeId {
        self.field_type
    }

    pub fn containing_type(&self) -> TypeId {
        self.containing_type
    }

    pub fn declaring_type(&self) -> TypeId {
        self.declaring_type
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_key(&self) -> bool {
        self.is_key
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, FieldKind::Reference(_))
    }

    pub fn reference_info(&self) -> Option<&ReferenceInfo> {
        match &self.kind {
            FieldKind::Reference(info) => Some(info),
            _ => None,
        }
    }

    pub fn is_many(&self) -> bool {
        self.is_many
    }

    pub fn is_mandatory(&self) -> bool {
        self.is_mandatory
    }

    pub fn is_frozen(&self) -> bool {
        self.is_frozen
    }

    pub fn register_name(&mut self, locale: Locale, label: impl Into<String>) {
        self.localized_names.insert(locale, label.into());
    }

    /// Display label for `locale`, falling back to the field name.
    pub fn name_for(&self, locale: &Locale) -> &str {
        self.localized_names
            .get(locale)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }

    /// An independent, mutable copy of this field.
    pub fn copy(&self) -> Self {
        Self {
            is_frozen: false,
            ..self.clone()
        }
    }

    /// Rebind a copy of this field to `owner`; the declaring type is kept.
    pub fn adopt(&self, owner: TypeId) -> Self {
        Self {
            containing_type: owner,
            ..self.clone()
        }
    }

    pub fn freeze(mut self) -> Self {
        self.is_frozen = true;
        self
    }

    pub fn promote_to_key(&mut self) {
        self.is_key = true;
    }

    pub(crate) fn set_containing_type(&mut self, owner: TypeId) {
        self.containing_type = owner;
    }
}

/// An entry of a type's primary-key-info or lookup-field list.
///
/// Entries are either concrete fields or paths into the owning type that are
/// resolved when the owning type is frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    Field(FieldMetadata),
    Path(String),
}

impl FieldRef {
    /// Field name, or the unresolved path.
    pub fn name(&self) -> &str {
        match self {
            Self::Field(field) => field.name(),
            Self::Path(path) => path,
        }
    }

    pub fn field(&self) -> Option<&FieldMetadata> {
        match self {
            Self::Field(field) => Some(field),
            Self::Path(_) => None,
        }
    }

    pub(crate) fn copy(&self) -> Self {
        match self {
            Self::Field(field) => Self::Field(field.copy()),
            Self::Path(path) => Self::Path(path.clone()),
        }
    }
}

impl From<FieldMetadata> for FieldRef {
    fn from(field: FieldMetadata) -> Self {
        Self::Field(field)
    }
}
