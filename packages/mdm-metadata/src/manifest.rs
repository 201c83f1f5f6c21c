use crate::{
    annotation::AnnotationState,
    complex::ComplexTypeMetadata,
    field::FieldRef,
    repository::MetadataRepository,
    types::{Locale, TypeId},
    MetadataError, MetadataResult,
};
use mdm_metadata_lib::config::MetadataConfig;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs::File, io::Read, path::Path, str::FromStr};
use tracing::debug;

/// A field declared by a [`TypeEntry`].
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct FieldEntry {
    pub name: String,

    /// Name of the field's type: a type of the manifest or a built-in simple type.
    #[serde(rename = "type")]
    pub field_type: String,

    #[serde(default)]
    pub key: bool,

    #[serde(default)]
    pub many: bool,

    #[serde(default)]
    pub mandatory: bool,

    /// The field's simple type restricts its values to a fixed set.
    #[serde(default)]
    pub enumeration: bool,

    /// Foreign key target, for reference fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceEntry>,

    /// Display labels by locale.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Target of a reference field.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ReferenceEntry {
    /// Referenced entity type.
    #[serde(rename = "type")]
    pub referenced_type: String,

    /// Key field of the referenced type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default = "default_true")]
    pub fk_integrity: bool,

    #[serde(default)]
    pub fk_integrity_override: bool,
}

/// A complex type declared by a [`ModelManifest`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub name: String,

    /// Namespace of the type; defaults to the manifest namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default = "default_true")]
    pub instantiable: bool,

    #[serde(default)]
    pub super_types: Vec<String>,

    #[serde(default)]
    pub fields: Vec<FieldEntry>,

    #[serde(default)]
    pub allow_write: Vec<String>,

    #[serde(default)]
    pub deny_create: Vec<String>,

    #[serde(default)]
    pub hide: Vec<String>,

    #[serde(default)]
    pub deny_logical_delete: Vec<String>,

    #[serde(default)]
    pub deny_physical_delete: Vec<String>,

    #[serde(default)]
    pub workflow_access_rights: Vec<String>,

    #[serde(default)]
    pub schematron: String,

    /// Field paths shown as the type's primary key information.
    #[serde(default)]
    pub primary_key_info: Vec<String>,

    /// Field paths used for lookups.
    #[serde(default)]
    pub lookup_fields: Vec<String>,

    /// Display label in the default locale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Display labels by locale.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

/// Represents a model manifest file.
///
/// A model manifest is a YAML file listing complex types with their fields,
/// supertypes and access directives. Building it registers the types into a
/// [`MetadataRepository`] and freezes them.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct ModelManifest {
    /// Namespace of types that do not declare one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,

    /// Declared types, in registration order.
    #[serde(default)]
    types: Vec<TypeEntry>,
}

impl ModelManifest {
    /// Derive a model manifest from the YAML file at the specified path.
    pub fn from_file(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let mut file = File::open(&path).map_err(|e| {
            MetadataError::FileError(path.as_ref().display().to_string(), e)
        })?;
        let mut content = String::new();
        file.read_to_string(&mut content).map_err(|e| {
            MetadataError::FileError(path.as_ref().display().to_string(), e)
        })?;
        Self::try_from(content.as_str())
    }

    /// Get the manifest namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get the declared types.
    pub fn types(&self) -> &[TypeEntry] {
        &self.types
    }

    pub fn add_type(&mut self, entry: TypeEntry) {
        self.types.push(entry);
    }

    /// Register every declared type into `repo`, then freeze them.
    ///
    /// Types are created first so that fields and supertypes may name types
    /// declared later in the manifest. Returns the new type ids in declaration
    /// order.
    pub fn build(
        &self,
        repo: &mut MetadataRepository,
        config: &MetadataConfig,
    ) -> MetadataResult<Vec<TypeId>> {
        let default_locale = Locale::new(config.default_locale.as_str());

        let mut ids = Vec::with_capacity(self.types.len());
        for entry in &self.types {
            let namespace = self.namespace_of(entry, config);
            let state = type_state(entry, &default_locale);
            let ty = ComplexTypeMetadata::from_annotations(
                namespace,
                entry.name.as_str(),
                entry.instantiable,
                &state,
            );
            ids.push(repo.add_complex_type(ty)?);
        }

        for (entry, id) in self.types.iter().zip(ids.iter().copied()) {
            let namespace = self.namespace_of(entry, config);

            for super_type in &entry.super_types {
                let super_id = resolve(repo, namespace, super_type, &entry.name)?;
                repo.complex_mut(id)?.add_super_type(super_id)?;
            }

            for field_entry in &entry.fields {
                let field_type =
                    resolve(repo, namespace, &field_entry.field_type, &entry.name)?;
                let contained = repo.complex(field_type).is_ok();

                let mut state = AnnotationState {
                    field_type: Some(field_type),
                    is_enumeration: field_entry.enumeration,
                    ..AnnotationState::default()
                };
                if let Some(reference) = &field_entry.reference {
                    state.mark_as_reference();
                    state.referenced_type = Some(resolve(
                        repo,
                        namespace,
                        &reference.referenced_type,
                        &entry.name,
                    )?);
                    state.referenced_field = reference.field.clone();
                    state.fk_integrity = reference.fk_integrity;
                    state.fk_integrity_override = reference.fk_integrity_override;
                }
                for (locale, label) in &field_entry.labels {
                    state.register_type_name(Locale::new(locale.as_str()), label.as_str());
                }

                let field = state
                    .build_field(id, &field_entry.name, contained)?
                    .with_key(field_entry.key)
                    .with_many(field_entry.many)
                    .with_mandatory(field_entry.mandatory);
                repo.complex_mut(id)?.add_field(field)?;

                if contained && !state.is_reference {
                    repo.complex_mut(field_type)?.declare_usage(id);
                }
            }
        }

        for id in &ids {
            repo.freeze(*id)?;
        }

        debug!(
            "Built {} types from model manifest (namespace '{}').",
            ids.len(),
            self.namespace().unwrap_or(&config.schema.default_namespace)
        );
        Ok(ids)
    }

    fn namespace_of<'a>(
        &'a self,
        entry: &'a TypeEntry,
        config: &'a MetadataConfig,
    ) -> &'a str {
        entry
            .namespace
            .as_deref()
            .or(self.namespace.as_deref())
            .unwrap_or(&config.schema.default_namespace)
    }
}

/// Annotation state carrying the type-level declarations of `entry`.
fn type_state(entry: &TypeEntry, default_locale: &Locale) -> AnnotationState {
    let mut state = AnnotationState {
        hide: entry.hide.clone(),
        allow_write: entry.allow_write.clone(),
        deny_create: entry.deny_create.clone(),
        deny_physical_delete: entry.deny_physical_delete.clone(),
        deny_logical_delete: entry.deny_logical_delete.clone(),
        workflow_access_rights: entry.workflow_access_rights.clone(),
        schematron: entry.schematron.clone(),
        primary_key_info: entry
            .primary_key_info
            .iter()
            .cloned()
            .map(FieldRef::Path)
            .collect(),
        lookup_fields: entry.lookup_fields.iter().cloned().map(FieldRef::Path).collect(),
        ..AnnotationState::default()
    };
    if let Some(label) = &entry.label {
        state.register_type_name(default_locale.clone(), label.as_str());
    }
    for (locale, label) in &entry.labels {
        state.register_type_name(Locale::new(locale.as_str()), label.as_str());
    }
    state
}

/// Resolve a type name used by `owner`: manifest types first, then built-ins.
fn resolve(
    repo: &MetadataRepository,
    namespace: &str,
    name: &str,
    owner: &str,
) -> MetadataResult<TypeId> {
    repo.lookup(namespace, name)
        .or_else(|| repo.lookup(repo.builtin_namespace(), name))
        .ok_or_else(|| {
            MetadataError::Manifest(format!(
                "Type '{owner}' refers to unknown type '{name}'."
            ))
        })
}

impl TryFrom<&str> for ModelManifest {
    type Error = MetadataError;

    fn try_from(val: &str) -> MetadataResult<Self> {
        let manifest: ModelManifest = serde_yaml::from_str(val)?;
        Ok(manifest)
    }
}

impl FromStr for ModelManifest {
    type Err = MetadataError;

    fn from_str(s: &str) -> MetadataResult<Self> {
        Self::try_from(s)
    }
}
