use crate::{
    field::{FieldMetadata, FieldRef, ReferenceInfo},
    types::{Locale, TypeId},
    MetadataError, MetadataResult,
};
use std::collections::HashMap;

/// Information collected while processing the annotations of a schema element.
///
/// Builders fill one state per element, then create the type with
/// [`crate::ComplexTypeMetadata::from_annotations`] or a field with
/// [`AnnotationState::build_field`].
#[derive(Debug, Clone)]
pub struct AnnotationState {
    pub hide: Vec<String>,
    pub allow_write: Vec<String>,
    pub deny_create: Vec<String>,
    pub deny_physical_delete: Vec<String>,
    pub deny_logical_delete: Vec<String>,
    pub workflow_access_rights: Vec<String>,
    pub locale_to_label: HashMap<Locale, String>,
    pub fk_integrity: bool,
    pub fk_integrity_override: bool,
    pub field_type: Option<TypeId>,
    pub is_reference: bool,
    /// The field's simple type restricts its values to a fixed set.
    pub is_enumeration: bool,
    pub referenced_type: Option<TypeId>,
    pub referenced_field: Option<String>,
    pub schematron: String,
    pub primary_key_info: Vec<FieldRef>,
    pub lookup_fields: Vec<FieldRef>,
}

impl Default for AnnotationState {
    fn default() -> Self {
        Self {
            hide: Vec::new(),
            allow_write: Vec::new(),
            deny_create: Vec::new(),
            deny_physical_delete: Vec::new(),
            deny_logical_delete: Vec::new(),
            workflow_access_rights: Vec::new(),
            locale_to_label: HashMap::new(),
            // Default is to enforce FK integrity
            fk_integrity: true,
            fk_integrity_override: false,
            field_type: None,
            is_reference: false,
            is_enumeration: false,
            referenced_type: None,
            referenced_field: None,
            schematron: String::new(),
            primary_key_info: Vec::new(),
            lookup_fields: Vec::new(),
        }
    }
}

impl AnnotationState {
    pub fn mark_as_reference(&mut self) {
        self.is_reference = true;
    }

    pub fn register_type_name(&mut self, locale: Locale, label: impl Into<String>) {
        self.locale_to_label.insert(locale, label.into());
    }

    /// Build the field described by this state for the type `owner`.
    ///
    /// `contained` marks a field embedding its (complex) type; it is ignored
    /// for references. `is_enumeration` only applies to simple fields.
    pub fn build_field(
        &self,
        owner: TypeId,
        name: &str,
        contained: bool,
    ) -> MetadataResult<FieldMetadata> {
        let field_type = self.field_type.ok_or_else(|| {
            MetadataError::IllegalArgument(format!("Field '{name}' has no declared type."))
        })?;

        let mut field = if self.is_reference {
            let referenced_type = self.referenced_type.ok_or_else(|| {
                MetadataError::IllegalArgument(format!(
                    "Reference field '{name}' does not name a referenced type."
                ))
            })?;
            let info = ReferenceInfo {
                referenced_type,
                referenced_field: self.referenced_field.clone(),
                fk_integrity: self.fk_integrity,
                fk_integrity_override: self.fk_integrity_override,
            };
            FieldMetadata::reference(owner, name, field_type, info)
        } else if contained {
            FieldMetadata::contained(owner, name, field_type)
        } else if self.is_enumeration {
            FieldMetadata::enumeration(owner, name, field_type)
        } else {
            FieldMetadata::simple(owner, name, field_type)
        };

        for (locale, label) in &self.locale_to_label {
            field.register_name(locale.clone(), label.clone());
        }

        Ok(field)
    }
}
