use crate::{
    repository::{MetadataRepository, TypeMetadata},
    types::TypeId,
    MetadataResult,
};
use std::collections::HashMap;
use tracing::debug;

impl MetadataRepository {
    /// Deep copy of the complex type `id`, mutable whatever the source's state.
    ///
    /// Fields and keys are copied and owned by the copy, the copy is registered
    /// as a subtype of the source's complex supertypes, and the subtype tree is
    /// copied as well (each copied subtype extends the copy instead of the
    /// source). Copies share the source's name but are not indexed by it.
    pub fn copy(&mut self, id: TypeId) -> MetadataResult<TypeId> {
        let copy_id = self.copy_tree(id, &mut HashMap::new())?;
        debug!(
            "Copied type {} to {copy_id}.",
            self.complex(copy_id)?.qualified_name()
        );
        Ok(copy_id)
    }

    /// Copy of the identity, directives and labels of `id`, without fields.
    pub fn copy_shallow(&mut self, id: TypeId) -> MetadataResult<TypeId> {
        let copy = self.complex(id)?.copy_shallow();
        Ok(self.push(TypeMetadata::Complex(copy)))
    }

    fn copy_tree(
        &mut self,
        id: TypeId,
        copies: &mut HashMap<TypeId, TypeId>,
    ) -> MetadataResult<TypeId> {
        let source = self.complex(id)?.metadata().clone();
        let copy_id = self.push(TypeMetadata::Complex(source.copy_shallow()));
        copies.insert(id, copy_id);

        let super_types: Vec<_> = source
            .super_types()
            .iter()
            .map(|super_type| copies.get(super_type).copied().unwrap_or(*super_type))
            .collect();

        let copy = self.complex_mut(copy_id)?;
        for field in source.fields() {
            let mut field = field.copy();
            field.set_containing_type(copy_id);
            copy.add_field(field)?;
        }
        for key in source.key_fields() {
            let mut key = key.copy();
            key.set_containing_type(copy_id);
            copy.register_key(key)?;
        }
        for super_type in &super_types {
            copy.add_super_type(*super_type)?;
        }
        copy.copy_side_data(&source);

        for super_type in super_types {
            if let Ok(super_ty) = self.complex_mut(super_type) {
                super_ty.register_sub_type(copy_id);
            }
        }

        for sub_type in source.direct_sub_types() {
            if copies.contains_key(sub_type) {
                continue;
            }
            let sub_copy = self.copy_tree(*sub_type, copies)?;
            self.complex_mut(copy_id)?.register_sub_type(sub_copy);
        }

        Ok(copy_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        complex::ComplexTypeMetadata,
        field::FieldMetadata,
        types::{Locale, XsdType},
    };

    fn person_model() -> (MetadataRepository, TypeId, TypeId, TypeId) {
        let mut repo = MetadataRepository::new();
        let string = repo.builtin(XsdType::String).unwrap();
        let being = repo
            .add_complex_type(ComplexTypeMetadata::new("", "LivingBeing", true))
            .unwrap();
        let person = repo
            .add_complex_type(ComplexTypeMetadata::new("urn:mdm", "Person", true))
            .unwrap();
        let employee = repo
            .add_complex_type(ComplexTypeMetadata::new("urn:mdm", "Employee", true))
            .unwrap();

        let ty = repo.complex_mut(person).unwrap();
        ty.add_super_type(being).unwrap();
        ty.add_field(FieldMetadata::simple(person, "name", string).with_key(true))
            .unwrap();
        ty.register_name(Locale::from("fr"), "Personne");
        ty.set_data("origin", serde_json::json!({ "source": "xsd" }));
        repo.complex_mut(employee)
            .unwrap()
            .add_super_type(person)
            .unwrap();

        repo.freeze_all().unwrap();
        (repo, being, person, employee)
    }

    #[test]
    fn test_copy_is_mutable_and_equal() {
        let (mut repo, being, person, _) = person_model();
        let copy = repo.copy(person).unwrap();

        assert_ne!(copy, person);
        let source = repo.complex(person).unwrap();
        let copied = repo.complex(copy).unwrap();
        assert_eq!(copied.metadata(), source.metadata());
        assert!(!copied.is_frozen());
        assert_eq!(copied.name_for(&Locale::from("fr")), "Personne");
        assert_eq!(copied.data("origin"), source.data("origin"));
        assert_eq!(copied.super_types(), [being]);

        let name = copied.own_field("name").unwrap();
        assert_eq!(name.containing_type(), copy);
        assert!(!name.is_frozen());
        assert!(copied.is_key("name"));

        // Copies are not indexed; the registered type is still the source.
        assert_eq!(repo.lookup("urn:mdm", "Person"), Some(person));
        assert!(repo
            .complex(being)
            .unwrap()
            .direct_sub_types()
            .contains(&copy));
    }

    #[test]
    fn test_copy_duplicates_sub_types() {
        let (mut repo, _, person, employee) = person_model();
        let copy = repo.copy(person).unwrap();

        let copied = repo.complex(copy).unwrap();
        let subs = copied.sub_types();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name(), "Employee");
        assert_ne!(subs[0].id(), employee);
        assert_eq!(subs[0].super_types(), [copy]);

        repo.complex_mut(copy)
            .unwrap()
            .set_instantiable(false)
            .unwrap();
        assert!(repo.complex(person).unwrap().is_instantiable());
    }

    #[test]
    fn test_copy_shallow_has_no_fields() {
        let (mut repo, _, person, _) = person_model();
        let copy = repo.copy_shallow(person).unwrap();

        let copied = repo.complex(copy).unwrap();
        assert_eq!(copied.fields().len(), 0);
        assert_eq!(copied.key_fields().len(), 0);
        assert!(copied.super_types().is_empty());
        assert_eq!(copied.name_for(&Locale::from("fr")), "Personne");
        assert_eq!(copied.data("origin"), None);
    }
}
