use crate::{
    complex::TypeStructure,
    field::FieldRef,
    repository::{MetadataRepository, TypeMetadata},
    types::TypeId,
    MetadataResult,
};
use tracing::{debug, warn};

impl MetadataRepository {
    /// Freeze the type `id`: flatten inherited fields into it and make it
    /// read-only. Supertypes are frozen first. Freezing a frozen type is a no-op.
    pub fn freeze(&mut self, id: TypeId) -> MetadataResult<()> {
        match self.get(id)? {
            TypeMetadata::Simple(ty) => {
                if ty.is_frozen() {
                    return Ok(());
                }
                let super_types = ty.super_types().to_vec();
                if let TypeMetadata::Simple(ty) = self.get_mut(id)? {
                    ty.mark_frozen();
                }
                for super_type in super_types {
                    self.freeze(super_type)?;
                }
                Ok(())
            }
            TypeMetadata::Complex(ty) if ty.is_frozen() => Ok(()),
            TypeMetadata::Complex(_) => self.freeze_complex(id),
        }
    }

    fn freeze_complex(&mut self, id: TypeId) -> MetadataResult<()> {
        let building = self.complex_mut(id)?.begin_freeze()?;

        let structure = match self.flatten(id, building.clone()) {
            Ok(structure) => structure,
            Err(e) => {
                self.complex_mut(id)?.abort_freeze(building);
                return Err(e);
            }
        };
        let super_types = structure.super_types.clone();
        self.complex_mut(id)?.finish_freeze(structure);

        self.link_super_types(id, &super_types)?;
        self.resolve_field_refs(id)?;

        let ty = self.complex(id)?;
        debug!(
            "Froze type {} ({} fields, {} keys, {} super types).",
            ty.qualified_name(),
            ty.fields().len(),
            ty.key_fields().len(),
            ty.super_types().len()
        );
        Ok(())
    }

    fn flatten(
        &mut self,
        id: TypeId,
        mut structure: TypeStructure,
    ) -> MetadataResult<TypeStructure> {
        let (name, instantiable) = {
            let ty = self.get(id)?;
            (ty.qualified_name(), ty.is_instantiable())
        };

        if !structure.super_types.is_empty() {
            let own_fields = std::mem::take(&mut structure.fields);
            let mut super_types = std::mem::take(&mut structure.super_types);

            // With several supertypes, only those sharing this type's
            // instantiability are kept.
            if super_types.len() > 1 {
                let mut kept = Vec::with_capacity(super_types.len());
                for super_type in super_types {
                    let super_ty = self.get(super_type)?;
                    if super_ty.is_instantiable() == instantiable {
                        kept.push(super_type);
                    } else {
                        warn!(
                            "Dropped super type {} of {name}: instantiable is {} (expected {instantiable}).",
                            super_ty.qualified_name(),
                            super_ty.is_instantiable(),
                        );
                    }
                }
                super_types = kept;
            }

            for super_type in super_types {
                self.freeze(super_type)?;

                if self.get(super_type)?.is_instantiable() == instantiable {
                    structure.super_types.push(super_type);
                }

                let Ok(super_ty) = self.complex(super_type) else {
                    continue;
                };

                // Fields are inherited across instantiability boundaries too.
                for field in super_ty.fields() {
                    let adopted = field.adopt(id);
                    if adopted.is_key() {
                        structure
                            .key_fields
                            .insert(adopted.name().to_string(), adopted.clone());
                    }
                    structure.fields.insert(adopted.name().to_string(), adopted);
                }
            }

            // Own declarations win over inherited ones.
            for (name, field) in own_fields {
                structure.fields.insert(name, field);
            }
        }

        // Keys registered without a matching field become fields.
        for (name, key) in &structure.key_fields {
            if !structure.fields.contains_key(name) {
                structure.fields.insert(name.clone(), key.clone());
            }
        }

        for field in structure.fields.values_mut() {
            let mut frozen = field.clone().freeze();
            if structure.key_fields.contains_key(frozen.name()) && !frozen.is_key() {
                frozen.promote_to_key();
            }
            *field = frozen;
        }
        for (name, key) in structure.key_fields.iter_mut() {
            if let Some(field) = structure.fields.get(name) {
                *key = field.clone();
            }
        }

        Ok(structure)
    }

    /// Register `id` as a subtype of its kept supertypes and inherit their usages.
    fn link_super_types(&mut self, id: TypeId, super_types: &[TypeId]) -> MetadataResult<()> {
        let mut usages = Vec::new();
        for super_type in super_types {
            if let Ok(super_ty) = self.complex_mut(*super_type) {
                super_ty.register_sub_type(id);
                usages.extend(super_ty.usages().iter().copied());
            }
        }

        let ty = self.complex_mut(id)?;
        for usage in usages {
            ty.declare_usage(usage);
        }
        Ok(())
    }

    /// Bind primary-key-info and lookup entries to frozen fields; entries whose
    /// path does not resolve are dropped.
    fn resolve_field_refs(&mut self, id: TypeId) -> MetadataResult<()> {
        let (primary_key_info, lookup_fields) = {
            let ty = self.complex(id)?;
            let resolve = |entries: &[FieldRef]| -> Vec<FieldRef> {
                entries
                    .iter()
                    .filter_map(|entry| match entry {
                        FieldRef::Field(field) => Some(field.clone().freeze()),
                        FieldRef::Path(path) => ty.field(path).ok().map(|f| f.clone().freeze()),
                    })
                    .map(FieldRef::Field)
                    .collect()
            };
            (resolve(ty.primary_key_info()), resolve(ty.lookup_fields()))
        };

        if let Some(structure) = self.complex_mut(id)?.frozen_structure_mut() {
            structure.primary_key_info = primary_key_info;
            structure.lookup_fields = lookup_fields;
        }
        Ok(())
    }
}
