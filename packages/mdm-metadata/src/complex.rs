use crate::{
    annotation::AnnotationState,
    field::{FieldMetadata, FieldRef},
    types::{Locale, QualifiedName, TypeId},
    MetadataError, MetadataResult,
};
use indexmap::IndexMap;
use std::{
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};
use strum::{AsRefStr, Display};

/// Category of a delete operation guarded by a deny-delete directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
pub enum DeleteType {
    #[strum(serialize = "LOGICAL")]
    Logical,
    #[strum(serialize = "PHYSICAL")]
    Physical,
}

impl FromStr for DeleteType {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOGICAL" => Ok(Self::Logical),
            "PHYSICAL" => Ok(Self::Physical),
            _ => Err(MetadataError::NotImplemented(format!(
                "Security information parsing for delete type '{s}'"
            ))),
        }
    }
}

/// Per-role access directives of an entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessDirectives {
    pub allow_write: Vec<String>,
    pub deny_create: Vec<String>,
    pub hide_users: Vec<String>,
    pub physical_delete: Vec<String>,
    pub logical_delete: Vec<String>,
    pub workflow_access_rights: Vec<String>,
}

/// The field that embeds a type, for types that are not top-level entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub containing_type: TypeId,
    pub field: String,
}

/// The structural part of a complex type: what freeze rewrites.
#[derive(Debug, Clone, Default)]
pub struct TypeStructure {
    pub(crate) fields: IndexMap<String, FieldMetadata>,
    pub(crate) key_fields: IndexMap<String, FieldMetadata>,
    pub(crate) super_types: Vec<TypeId>,
    pub(crate) primary_key_info: Vec<FieldRef>,
    pub(crate) lookup_fields: Vec<FieldRef>,
}

// Only `Building` hands out a mutable structure. `Freezing` marks a type whose
// structure is being rebuilt and reads as empty.
#[derive(Debug, Clone)]
pub(crate) enum Lifecycle {
    Building(TypeStructure),
    Freezing(TypeStructure),
    Frozen(TypeStructure),
}

/// An entity ("complex") type.
///
/// Identity is the `(namespace, name)` pair: equality and hashing ignore structure.
#[derive(Debug, Clone)]
pub struct ComplexTypeMetadata {
    namespace: String,
    name: String,
    lifecycle: Lifecycle,
    sub_types: Vec<TypeId>,
    usages: Vec<TypeId>,
    container: Option<ContainerRef>,
    directives: AccessDirectives,
    schematron: String,
    localized_names: HashMap<Locale, String>,
    data: HashMap<String, serde_json::Value>,
    instantiable: bool,
}

impl ComplexTypeMetadata {
    /// A type with no access directives and an empty schematron.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, instantiable: bool) -> Self {
        Self::with_directives(
            namespace,
            name,
            AccessDirectives::default(),
            String::new(),
            Vec::new(),
            Vec::new(),
            instantiable,
        )
    }

    pub fn with_directives(
        namespace: impl Into<String>,
        name: impl Into<String>,
        directives: AccessDirectives,
        schematron: impl Into<String>,
        primary_key_info: Vec<FieldRef>,
        lookup_fields: Vec<FieldRef>,
        instantiable: bool,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            lifecycle: Lifecycle::Building(TypeStructure {
                primary_key_info,
                lookup_fields,
                ..TypeStructure::default()
            }),
            sub_types: Vec::new(),
            usages: Vec::new(),
            container: None,
            directives,
            schematron: schematron.into(),
            localized_names: HashMap::new(),
            data: HashMap::new(),
            instantiable,
        }
    }

    /// Populate a type from the state collected while processing schema annotations.
    pub fn from_annotations(
        namespace: impl Into<String>,
        name: impl Into<String>,
        instantiable: bool,
        state: &AnnotationState,
    ) -> Self {
        let directives = AccessDirectives {
            allow_write: state.allow_write.clone(),
            deny_create: state.deny_create.clone(),
            hide_users: state.hide.clone(),
            physical_delete: state.deny_physical_delete.clone(),
            logical_delete: state.deny_logical_delete.clone(),
            workflow_access_rights: state.workflow_access_rights.clone(),
        };

        let mut ty = Self::with_directives(
            namespace,
            name,
            directives,
            state.schematron.clone(),
            state.primary_key_info.clone(),
            state.lookup_fields.clone(),
            instantiable,
        );
        ty.localized_names = state.locale_to_label.clone();
        ty
    }

    /// Copy of the identity, directives and labels, without structure.
    pub(crate) fn copy_shallow(&self) -> Self {
        let structure = self.structure();
        let mut copy = Self::with_directives(
            self.namespace.clone(),
            self.name.clone(),
            self.directives.clone(),
            self.schematron.clone(),
            structure.primary_key_info.iter().map(FieldRef::copy).collect(),
            structure.lookup_fields.iter().map(FieldRef::copy).collect(),
            self.instantiable,
        );
        copy.localized_names = self.localized_names.clone();
        copy
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

    /// Display label for `locale`, falling back to the type name.
    pub fn name_for(&self, locale: &Locale) -> &str {
        self.localized_names
            .get(locale)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }

    pub fn localized_names(&self) -> &HashMap<Locale, String> {
        &self.localized_names
    }

    pub fn register_name(&mut self, locale: Locale, label: impl Into<String>) {
        self.localized_names.insert(locale, label.into());
    }

    pub fn is_instantiable(&self) -> bool {
        self.instantiable
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Frozen(_))
    }

    pub(crate) fn structure(&self) -> &TypeStructure {
        match &self.lifecycle {
            Lifecycle::Building(structure)
            | Lifecycle::Freezing(structure)
            | Lifecycle::Frozen(structure) => structure,
        }
    }

    fn building_mut(&mut self) -> MetadataResult<&mut TypeStructure> {
        match &mut self.lifecycle {
            Lifecycle::Building(structure) => Ok(structure),
            _ => Err(MetadataError::Frozen {
                name: self.name.clone(),
            }),
        }
    }

    /// Fields in declaration order (inherited ones first once frozen).
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &FieldMetadata> + '_ {
        self.structure().fields.values()
    }

    pub fn field_names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.structure().fields.keys().map(String::as_str)
    }

    /// Direct lookup of a field owned by this type, without path handling.
    pub fn own_field(&self, name: &str) -> Option<&FieldMetadata> {
        self.structure().fields.get(name)
    }

    pub fn key_fields(&self) -> impl ExactSizeIterator<Item = &FieldMetadata> + '_ {
        self.structure().key_fields.values()
    }

    pub fn is_key(&self, name: &str) -> bool {
        self.structure().key_fields.contains_key(name)
    }

    pub fn super_types(&self) -> &[TypeId] {
        &self.structure().super_types
    }

    /// Types registered as direct subtypes of this one.
    pub fn direct_sub_types(&self) -> &[TypeId] {
        &self.sub_types
    }

    /// Types that embed this type as a reusable structure.
    pub fn usages(&self) -> &[TypeId] {
        &self.usages
    }

    pub fn container(&self) -> Option<&ContainerRef> {
        self.container.as_ref()
    }

    pub fn directives(&self) -> &AccessDirectives {
        &self.directives
    }

    pub fn write_users(&self) -> &[String] {
        &self.directives.allow_write
    }

    pub fn deny_create(&self) -> &[String] {
        &self.directives.deny_create
    }

    pub fn hide_users(&self) -> &[String] {
        &self.directives.hide_users
    }

    pub fn workflow_access_rights(&self) -> &[String] {
        &self.directives.workflow_access_rights
    }

    pub fn deny_delete(&self, delete_type: DeleteType) -> &[String] {
        match delete_type {
            DeleteType::Logical => &self.directives.logical_delete,
            DeleteType::Physical => &self.directives.physical_delete,
        }
    }

    pub fn schematron(&self) -> &str {
        &self.schematron
    }

    pub fn primary_key_info(&self) -> &[FieldRef] {
        &self.structure().primary_key_info
    }

    pub fn lookup_fields(&self) -> &[FieldRef] {
        &self.structure().lookup_fields
    }

    pub fn data(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Attach opaque side-data to the type.
    pub fn set_data(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Add a field; a field flagged as key is registered as key as well.
    pub fn add_field(&mut self, field: FieldMetadata) -> MetadataResult<()> {
        let structure = self.building_mut()?;
        if field.name().is_empty() {
            return Err(MetadataError::IllegalArgument(
                "Field can not be null.".to_string(),
            ));
        }
        if field.is_key() {
            structure
                .key_fields
                .insert(field.name().to_string(), field.clone());
        }
        structure.fields.insert(field.name().to_string(), field);
        Ok(())
    }

    pub fn register_key(&mut self, key_field: FieldMetadata) -> MetadataResult<()> {
        let structure = self.building_mut()?;
        if key_field.name().is_empty() {
            return Err(MetadataError::IllegalArgument(
                "Key field can not be null.".to_string(),
            ));
        }
        structure
            .key_fields
            .insert(key_field.name().to_string(), key_field);
        Ok(())
    }

    pub fn add_super_type(&mut self, super_type: TypeId) -> MetadataResult<()> {
        let structure = self.building_mut()?;
        if !structure.super_types.contains(&super_type) {
            structure.super_types.push(super_type);
        }
        Ok(())
    }

    pub fn set_instantiable(&mut self, instantiable: bool) -> MetadataResult<()> {
        self.building_mut()?;
        self.instantiable = instantiable;
        Ok(())
    }

    pub fn set_sub_types(&mut self, sub_types: Vec<TypeId>) -> MetadataResult<()> {
        self.building_mut()?;
        self.sub_types.clear();
        for sub_type in sub_types {
            self.register_sub_type(sub_type);
        }
        Ok(())
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) -> MetadataResult<()> {
        self.building_mut()?;
        self.name = name.into();
        Ok(())
    }

    pub(crate) fn register_sub_type(&mut self, sub_type: TypeId) {
        if !self.sub_types.contains(&sub_type) {
            self.sub_types.push(sub_type);
        }
    }

    pub fn declare_usage(&mut self, usage: TypeId) {
        if !self.usages.contains(&usage) {
            self.usages.push(usage);
        }
    }

    pub(crate) fn set_container(&mut self, container: Option<ContainerRef>) {
        self.container = container;
    }

    pub(crate) fn copy_side_data(&mut self, from: &Self) {
        self.data = from.data.clone();
        self.usages = from.usages.clone();
    }

    /// Swap the building structure out for the rewrite.
    pub(crate) fn begin_freeze(&mut self) -> MetadataResult<TypeStructure> {
        match std::mem::replace(
            &mut self.lifecycle,
            Lifecycle::Freezing(TypeStructure::default()),
        ) {
            Lifecycle::Building(structure) => Ok(structure),
            Lifecycle::Freezing(structure) => {
                self.lifecycle = Lifecycle::Freezing(structure);
                Err(MetadataError::CyclicInheritance {
                    name: self.name.clone(),
                })
            }
            Lifecycle::Frozen(structure) => {
                self.lifecycle = Lifecycle::Frozen(structure);
                Err(MetadataError::Frozen {
                    name: self.name.clone(),
                })
            }
        }
    }

    pub(crate) fn abort_freeze(&mut self, structure: TypeStructure) {
        self.lifecycle = Lifecycle::Building(structure);
    }

    pub(crate) fn finish_freeze(&mut self, structure: TypeStructure) {
        self.lifecycle = Lifecycle::Frozen(structure);
    }

    // Only the freeze rewrite touches a frozen structure.
    pub(crate) fn frozen_structure_mut(&mut self) -> Option<&mut TypeStructure> {
        match &mut self.lifecycle {
            Lifecycle::Frozen(structure) => Some(structure),
            _ => None,
        }
    }
}

impl PartialEq for ComplexTypeMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.name == other.name
    }
}

impl Eq for ComplexTypeMetadata {}

impl Hash for ComplexTypeMetadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for ComplexTypeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn string_type() -> TypeId {
        TypeId::new(0)
    }

    #[test]
    fn test_key_field_is_registered_on_add() {
        let owner = TypeId::new(1);
        let mut ty = ComplexTypeMetadata::new("", "Person", true);
        ty.add_field(FieldMetadata::simple(owner, "id", string_type()).with_key(true))
            .unwrap();
        ty.add_field(FieldMetadata::simple(owner, "name", string_type()))
            .unwrap();

        assert_eq!(ty.fields().len(), 2);
        assert_eq!(
            ty.key_fields().map(FieldMetadata::name).collect::<Vec<_>>(),
            vec!["id"]
        );
        assert!(ty.is_key("id"));
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let owner = TypeId::new(1);
        let mut ty = ComplexTypeMetadata::new("", "Person", true);
        for name in ["zeta", "alpha", "mid"] {
            ty.add_field(FieldMetadata::simple(owner, name, string_type()))
                .unwrap();
        }

        assert_eq!(
            ty.field_names().collect::<Vec<_>>(),
            vec!["zeta", "alpha", "mid"]
        );
    }

    #[test]
    fn test_empty_field_name_is_illegal() {
        let mut ty = ComplexTypeMetadata::new("", "Person", true);
        let result = ty.add_field(FieldMetadata::simple(TypeId::new(1), "", string_type()));
        assert!(matches!(result, Err(MetadataError::IllegalArgument(_))));

        let result =
            ty.register_key(FieldMetadata::simple(TypeId::new(1), "", string_type()));
        assert!(matches!(result, Err(MetadataError::IllegalArgument(_))));
    }

    #[test]
    fn test_identity_ignores_structure() {
        let mut a = ComplexTypeMetadata::new("urn:mdm", "Person", true);
        a.add_field(FieldMetadata::simple(TypeId::new(1), "name", string_type()))
            .unwrap();
        let b = ComplexTypeMetadata::new("urn:mdm", "Person", false);
        let c = ComplexTypeMetadata::new("urn:other", "Person", true);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_delete_type_parsing() {
        assert_eq!("logical".parse::<DeleteType>().unwrap(), DeleteType::Logical);
        assert_eq!("PHYSICAL".parse::<DeleteType>().unwrap(), DeleteType::Physical);

        let err = "archive".parse::<DeleteType>().unwrap_err();
        assert!(matches!(err, MetadataError::NotImplemented(_)));
        insta::assert_snapshot!(
            err.to_string(),
            @"Not implemented: Security information parsing for delete type 'archive'"
        );
    }

    #[test]
    fn test_deny_delete_directives() {
        let directives = AccessDirectives {
            logical_delete: vec!["viewer".to_string()],
            physical_delete: vec!["viewer".to_string(), "editor".to_string()],
            ..AccessDirectives::default()
        };
        let ty = ComplexTypeMetadata::with_directives(
            "",
            "Person",
            directives,
            "",
            Vec::new(),
            Vec::new(),
            true,
        );

        assert_eq!(ty.deny_delete(DeleteType::Logical), ["viewer"]);
        assert_eq!(ty.deny_delete(DeleteType::Physical).len(), 2);
        assert!(ty.write_users().is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ComplexTypeMetadata::new("", "Person", true).to_string(),
            "[Person]"
        );
        assert_eq!(
            ComplexTypeMetadata::new("urn:mdm", "Person", true).to_string(),
            "[urn:mdm:Person]"
        );
    }
}
