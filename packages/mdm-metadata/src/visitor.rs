use crate::{
    repository::{MetadataRepository, TypeMetadata},
    simple::SimpleTypeMetadata,
    types::TypeId,
    view::ComplexTypeRef,
    MetadataResult,
};

/// Walks type nodes; the model only dispatches, the visitor decides what to do
/// with fields and related types.
pub trait MetadataVisitor {
    type Output;

    fn visit_complex_type(&mut self, ty: ComplexTypeRef<'_>) -> Self::Output;

    fn visit_simple_type(&mut self, ty: &SimpleTypeMetadata) -> Self::Output;
}

impl MetadataRepository {
    /// Dispatch `visitor` on the type `id`.
    pub fn accept<V: MetadataVisitor>(
        &self,
        id: TypeId,
        visitor: &mut V,
    ) -> MetadataResult<V::Output> {
        Ok(match self.get(id)? {
            TypeMetadata::Simple(ty) => visitor.visit_simple_type(ty),
            TypeMetadata::Complex(ty) => {
                visitor.visit_complex_type(ComplexTypeRef::new(self, id, ty))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{complex::ComplexTypeMetadata, field::FieldMetadata, types::XsdType};

    /// Collects `Type/field` paths of every field reachable through containment.
    #[derive(Default)]
    struct FieldPaths {
        prefix: Vec<String>,
        paths: Vec<String>,
    }

    impl MetadataVisitor for FieldPaths {
        type Output = ();

        fn visit_complex_type(&mut self, ty: ComplexTypeRef<'_>) {
            for field in ty.metadata().fields() {
                self.prefix.push(field.name().to_string());
                self.paths.push(self.prefix.join("/"));
                if let Ok(contained) = ty.repository().complex(field.field_type()) {
                    contained.accept(self);
                }
                self.prefix.pop();
            }
        }

        fn visit_simple_type(&mut self, _: &SimpleTypeMetadata) {}
    }

    #[test]
    fn test_visitor_walks_contained_types() {
        let mut repo = MetadataRepository::new();
        let string = repo.builtin(XsdType::String).unwrap();
        let address = repo
            .add_complex_type(ComplexTypeMetadata::new("", "AddressType", false))
            .unwrap();
        let person = repo
            .add_complex_type(ComplexTypeMetadata::new("", "Person", true))
            .unwrap();
        repo.complex_mut(address)
            .unwrap()
            .add_field(FieldMetadata::simple(address, "City", string))
            .unwrap();
        let ty = repo.complex_mut(person).unwrap();
        ty.add_field(FieldMetadata::simple(person, "Name", string))
            .unwrap();
        ty.add_field(FieldMetadata::contained(person, "Address", address))
            .unwrap();
        repo.freeze_all().unwrap();

        let mut visitor = FieldPaths::default();
        repo.accept(person, &mut visitor).unwrap();
        assert_eq!(visitor.paths, vec!["Name", "Address", "Address/City"]);

        let mut visitor = FieldPaths::default();
        repo.accept(string, &mut visitor).unwrap();
        assert!(visitor.paths.is_empty());
    }
}
