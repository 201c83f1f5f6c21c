use crate::{
    complex::{ComplexTypeMetadata, ContainerRef},
    simple::SimpleTypeMetadata,
    types::{QualifiedName, TypeId, XsdType},
    view::ComplexTypeRef,
    MetadataError, MetadataResult,
};
use mdm_metadata_lib::config::SchemaConfig;
use std::collections::{HashMap, HashSet};
use strum::IntoEnumIterator;

/// A type node: either a scalar leaf or an entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMetadata {
    Simple(SimpleTypeMetadata),
    Complex(ComplexTypeMetadata),
}

impl TypeMetadata {
    pub fn name(&self) -> &str {
        match self {
            Self::Simple(ty) => ty.name(),
            Self::Complex(ty) => ty.name(),
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Simple(ty) => ty.namespace(),
            Self::Complex(ty) => ty.namespace(),
        }
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.namespace(), self.name())
    }

    pub fn is_instantiable(&self) -> bool {
        match self {
            Self::Simple(ty) => ty.is_instantiable(),
            Self::Complex(ty) => ty.is_instantiable(),
        }
    }

    pub fn is_frozen(&self) -> bool {
        match self {
            Self::Simple(ty) => ty.is_frozen(),
            Self::Complex(ty) => ty.is_frozen(),
        }
    }

    pub fn super_types(&self) -> &[TypeId] {
        match self {
            Self::Simple(ty) => ty.super_types(),
            Self::Complex(ty) => ty.super_types(),
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexTypeMetadata> {
        match self {
            Self::Complex(ty) => Some(ty),
            Self::Simple(_) => None,
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleTypeMetadata> {
        match self {
            Self::Simple(ty) => Some(ty),
            Self::Complex(_) => None,
        }
    }
}

/// Arena owning every type node of a model.
///
/// Types refer to each other through [`TypeId`]s; super, sub and usage edges
/// are plain ids, so dropping the repository drops the whole graph. Registered
/// types are also indexed by `(namespace, name)`; copies live in the arena
/// without being indexed.
#[derive(Debug, Clone)]
pub struct MetadataRepository {
    types: Vec<TypeMetadata>,
    names: HashMap<QualifiedName, TypeId>,
    builtin_namespace: String,
}

impl Default for MetadataRepository {
    fn default() -> Self {
        Self::with_config(&SchemaConfig::default())
    }
}

impl MetadataRepository {
    /// A repository holding the built-in simple types.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &SchemaConfig) -> Self {
        let mut repository = Self {
            types: Vec::new(),
            names: HashMap::new(),
            builtin_namespace: config.builtin_namespace.clone(),
        };
        for ty in XsdType::iter() {
            let simple = SimpleTypeMetadata::builtin(&config.builtin_namespace, ty);
            let id = repository.push(TypeMetadata::Simple(simple));
            repository
                .names
                .insert(QualifiedName::new(&config.builtin_namespace, ty.as_ref()), id);
        }
        repository
    }

    pub fn builtin_namespace(&self) -> &str {
        &self.builtin_namespace
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub(crate) fn push(&mut self, ty: TypeMetadata) -> TypeId {
        let id = TypeId::new(self.types.len());
        self.types.push(ty);
        id
    }

    fn register(&mut self, ty: TypeMetadata) -> MetadataResult<TypeId> {
        let name = ty.qualified_name();
        if self.names.contains_key(&name) {
            return Err(MetadataError::DuplicateType(name.to_string()));
        }
        let id = self.push(ty);
        self.names.insert(name, id);
        Ok(id)
    }

    pub fn add_complex_type(&mut self, ty: ComplexTypeMetadata) -> MetadataResult<TypeId> {
        self.register(TypeMetadata::Complex(ty))
    }

    pub fn add_simple_type(&mut self, ty: SimpleTypeMetadata) -> MetadataResult<TypeId> {
        self.register(TypeMetadata::Simple(ty))
    }

    /// Registered type named `name` in `namespace`.
    pub fn lookup(&self, namespace: &str, name: &str) -> Option<TypeId> {
        self.names
            .get(&QualifiedName::new(namespace, name))
            .copied()
    }

    /// Built-in simple type `ty`.
    pub fn builtin(&self, ty: XsdType) -> MetadataResult<TypeId> {
        self.lookup(&self.builtin_namespace, ty.as_ref())
            .ok_or_else(|| MetadataError::IllegalArgument(format!("Unknown built-in type '{ty}'.")))
    }

    pub fn get(&self, id: TypeId) -> MetadataResult<&TypeMetadata> {
        self.types
            .get(id.index())
            .ok_or(MetadataError::UnknownType(id))
    }

    pub fn get_mut(&mut self, id: TypeId) -> MetadataResult<&mut TypeMetadata> {
        self.types
            .get_mut(id.index())
            .ok_or(MetadataError::UnknownType(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TypeMetadata)> + '_ {
        self.types
            .iter()
            .enumerate()
            .map(|(index, ty)| (TypeId::new(index), ty))
    }

    /// Read-only view of the complex type `id`.
    pub fn complex(&self, id: TypeId) -> MetadataResult<ComplexTypeRef<'_>> {
        match self.get(id)? {
            TypeMetadata::Complex(ty) => Ok(ComplexTypeRef::new(self, id, ty)),
            TypeMetadata::Simple(ty) => Err(MetadataError::NotComplex {
                name: ty.name().to_string(),
            }),
        }
    }

    pub fn complex_mut(&mut self, id: TypeId) -> MetadataResult<&mut ComplexTypeMetadata> {
        match self.get_mut(id)? {
            TypeMetadata::Complex(ty) => Ok(ty),
            TypeMetadata::Simple(ty) => Err(MetadataError::NotComplex {
                name: ty.name().to_string(),
            }),
        }
    }

    /// Rename a type that is still being built.
    pub fn set_name(&mut self, id: TypeId, name: &str) -> MetadataResult<()> {
        let ty = self.complex_mut(id)?;
        let old = ty.qualified_name();
        ty.set_name(name)?;
        let new = ty.qualified_name();

        if self.names.get(&old) == Some(&id) {
            self.names.remove(&old);
            self.names.insert(new, id);
        }
        Ok(())
    }

    /// Record the field embedding `id`; every subtype shares the container.
    pub fn set_container(
        &mut self,
        id: TypeId,
        container: Option<ContainerRef>,
    ) -> MetadataResult<()> {
        let mut pending = vec![id];
        let mut seen = HashSet::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            let ty = self.complex_mut(current)?;
            ty.set_container(container.clone());
            pending.extend(ty.direct_sub_types().iter().copied());
        }
        Ok(())
    }

    /// Whether `other` names this type or one of its (transitive) supertypes.
    ///
    /// Types are matched by name.
    pub fn is_assignable_from(&self, id: TypeId, other: TypeId) -> MetadataResult<bool> {
        self.is_assignable_from_inner(id, other, &mut HashSet::new())
    }

    fn is_assignable_from_inner(
        &self,
        id: TypeId,
        other: TypeId,
        seen: &mut HashSet<TypeId>,
    ) -> MetadataResult<bool> {
        let ty = self.get(id)?;
        let other_name = self.get(other)?.name();
        if !seen.insert(id) {
            return Ok(false);
        }

        // Check one level of inheritance
        for super_type in ty.super_types() {
            if self.get(*super_type)?.name() == other_name {
                return Ok(true);
            }
        }
        // Checks in type inheritance hierarchy.
        for super_type in ty.super_types() {
            if self.is_assignable_from_inner(*super_type, other, seen)? {
                return Ok(true);
            }
        }
        Ok(ty.name() == other_name)
    }

    /// Freeze every type of the repository.
    pub fn freeze_all(&mut self) -> MetadataResult<()> {
        for index in 0..self.types.len() {
            self.freeze(TypeId::new(index))?;
        }
        Ok(())
    }
}
