use crate::{
    complex::ComplexTypeMetadata,
    field::FieldMetadata,
    path::{self, PathStep},
    repository::MetadataRepository,
    types::TypeId,
    validation::{self, ValidationFactory, ValidationHandler},
    visitor::MetadataVisitor,
    MetadataError, MetadataResult,
};
use std::{collections::HashSet, fmt, ops::Deref};
use tracing::error;

/// A complex type together with the repository it lives in.
///
/// Operations that follow graph edges (inheritance, subtypes, field types)
/// live here; plain accessors are reached through `Deref`.
#[derive(Clone, Copy)]
pub struct ComplexTypeRef<'a> {
    repo: &'a MetadataRepository,
    id: TypeId,
    ty: &'a ComplexTypeMetadata,
}

impl<'a> ComplexTypeRef<'a> {
    pub(crate) fn new(
        repo: &'a MetadataRepository,
        id: TypeId,
        ty: &'a ComplexTypeMetadata,
    ) -> Self {
        Self { repo, id, ty }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn metadata(&self) -> &'a ComplexTypeMetadata {
        self.ty
    }

    pub fn repository(&self) -> &'a MetadataRepository {
        self.repo
    }

    /// Resolve a field path such as `Address[@xsi:type="CNAddressType"]/Province`.
    ///
    /// A path without `/` is a direct lookup of the name (own fields first,
    /// then the fields of the supertypes). Each step of a nested path may name,
    /// through an `@xsi:type` predicate, the subtype of the step's field type
    /// that the next step continues with. A field missing on the current type
    /// is looked up on its direct subtypes.
    pub fn field(&self, path: &str) -> MetadataResult<&'a FieldMetadata> {
        if path.is_empty() {
            return Err(MetadataError::IllegalArgument(
                "Field name can not be null nor empty.".to_string(),
            ));
        }
        if !path::is_nested(path) {
            return self
                .inherited_field(path)
                .ok_or_else(|| self.unresolved(path, path));
        }

        let mut current = *self;
        let mut resolved = None;
        let mut steps = path::steps(path).peekable();
        while let Some(step) = steps.next() {
            let step = PathStep::parse(step, path)?;

            let field = match current.inherited_field(step.field) {
                Some(field) => field,
                None => current
                    .direct_sub_type_refs()
                    .find_map(|sub| sub.inherited_field(step.field))
                    .ok_or_else(|| self.unresolved(path, step.field))?,
            };

            if steps.peek().is_some() {
                current = self.repo.complex(field.field_type())?;
                if let Some(type_name) = step.type_override {
                    current = current.sub_type_named(type_name);
                }
            }
            resolved = Some(field);
        }

        resolved.ok_or_else(|| self.unresolved(path, path))
    }

    /// Whether [`ComplexTypeRef::field`] resolves `path`.
    pub fn has_field(&self, path: &str) -> bool {
        !path.is_empty() && self.field(path).is_ok()
    }

    fn unresolved(&self, path: &str, step: &str) -> MetadataError {
        MetadataError::UnresolvedField {
            type_name: self.name().to_string(),
            path: path.to_string(),
            step: step.to_string(),
        }
    }

    /// Field `name` owned by this type or one of its supertypes, nearest first.
    fn inherited_field(&self, name: &str) -> Option<&'a FieldMetadata> {
        let mut pending = vec![self.id];
        let mut seen = HashSet::new();
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(ty) = self.repo.get(id).ok().and_then(|ty| ty.as_complex()) else {
                continue;
            };
            if let Some(field) = ty.own_field(name) {
                return Some(field);
            }
            pending.extend(ty.super_types().iter().rev().copied());
        }
        None
    }

    pub fn direct_sub_type_refs(&self) -> impl Iterator<Item = ComplexTypeRef<'a>> + 'a {
        let repo = self.repo;
        self.ty
            .direct_sub_types()
            .iter()
            .filter_map(move |id| repo.complex(*id).ok())
    }

    /// Every type that (transitively) extends this one, depth first.
    pub fn sub_types(&self) -> Vec<ComplexTypeRef<'a>> {
        let mut sub_types = Vec::new();
        let mut seen = HashSet::from([self.id]);
        let mut pending: Vec<_> = self.direct_sub_type_refs().collect();
        pending.reverse();
        while let Some(sub) = pending.pop() {
            if !seen.insert(sub.id) {
                continue;
            }
            let mut children: Vec<_> = sub.direct_sub_type_refs().collect();
            children.reverse();
            pending.extend(children);
            sub_types.push(sub);
        }
        sub_types
    }

    /// The subtype named by an `xsi:type` predicate, or this type when it is
    /// neither this type nor one of its subtypes.
    fn sub_type_named(self, type_name: &str) -> ComplexTypeRef<'a> {
        if type_name == self.name() {
            return self;
        }
        match self.sub_types().into_iter().find(|sub| sub.name() == type_name) {
            Some(sub) => sub,
            None => {
                error!(
                    "Type '{type_name}' does not exist. Assuming '{}' has field type.",
                    self.name()
                );
                self
            }
        }
    }

    pub fn is_assignable_from(&self, other: TypeId) -> MetadataResult<bool> {
        self.repo.is_assignable_from(self.id, other)
    }

    /// The top-level type this type is (transitively) embedded in.
    pub fn entity(&self) -> MetadataResult<ComplexTypeRef<'a>> {
        let mut current = *self;
        let mut seen = HashSet::from([self.id]);
        while let Some(container) = current.container() {
            if !seen.insert(container.containing_type) {
                break;
            }
            current = self.repo.complex(container.containing_type)?;
        }
        Ok(current)
    }

    pub fn accept<V: MetadataVisitor>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_complex_type(*self)
    }

    /// Run the type rule then every field rule, in field declaration order.
    pub fn validate(
        &self,
        factory: &dyn ValidationFactory,
        handler: &mut dyn ValidationHandler,
    ) -> bool {
        validation::validate(*self, factory, handler)
    }
}

impl Deref for ComplexTypeRef<'_> {
    type Target = ComplexTypeMetadata;

    fn deref(&self) -> &ComplexTypeMetadata {
        self.ty
    }
}

impl fmt::Debug for ComplexTypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplexTypeRef")
            .field("id", &self.id)
            .field("name", &self.ty.qualified_name())
            .finish()
    }
}

impl fmt::Display for ComplexTypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)
    }
}
