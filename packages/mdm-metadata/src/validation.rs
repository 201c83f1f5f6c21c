use crate::{field::FieldMetadata, view::ComplexTypeRef};
use std::collections::BTreeMap;

/// Receives the outcome of validation rules.
pub trait ValidationHandler {
    /// Report an error against `location` (a type or `Type/field`).
    fn error(&mut self, location: &str, message: String);

    fn warning(&mut self, location: &str, message: String);

    fn error_count(&self) -> usize;
}

/// An executable check over a type or a field.
pub trait ValidationRule {
    /// Run the rule; returns `false` when the rule reported an error.
    fn perform(&self, handler: &mut dyn ValidationHandler) -> bool;
}

/// Produces the rule to run for a frozen type or one of its fields.
pub trait ValidationFactory {
    fn type_rule<'a>(&self, ty: ComplexTypeRef<'a>) -> Box<dyn ValidationRule + 'a>;

    fn field_rule<'a>(
        &self,
        ty: ComplexTypeRef<'a>,
        field: &'a FieldMetadata,
    ) -> Box<dyn ValidationRule + 'a>;
}

/// Rule that always passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRule;

impl ValidationRule for NoOpRule {
    fn perform(&self, _: &mut dyn ValidationHandler) -> bool {
        true
    }
}

/// Factory handing out [`NoOpRule`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpValidationFactory;

impl ValidationFactory for NoOpValidationFactory {
    fn type_rule<'a>(&self, _: ComplexTypeRef<'a>) -> Box<dyn ValidationRule + 'a> {
        Box::new(NoOpRule)
    }

    fn field_rule<'a>(
        &self,
        _: ComplexTypeRef<'a>,
        _: &'a FieldMetadata,
    ) -> Box<dyn ValidationRule + 'a> {
        Box::new(NoOpRule)
    }
}

/// Handler collecting messages grouped by location.
#[derive(Debug, Default, Clone)]
pub struct ValidationIssues {
    pub errors: BTreeMap<String, Vec<String>>,
    pub warnings: BTreeMap<String, Vec<String>>,
}

impl ValidationIssues {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

impl ValidationHandler for ValidationIssues {
    fn error(&mut self, location: &str, message: String) {
        self.errors
            .entry(location.to_string())
            .or_default()
            .push(message);
    }

    fn warning(&mut self, location: &str, message: String) {
        self.warnings
            .entry(location.to_string())
            .or_default()
            .push(message);
    }

    fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}

/// Run the type's rule, then each field's rule in declaration order.
pub fn validate(
    ty: ComplexTypeRef<'_>,
    factory: &dyn ValidationFactory,
    handler: &mut dyn ValidationHandler,
) -> bool {
    let mut valid = factory.type_rule(ty).perform(handler);
    for field in ty.metadata().fields() {
        valid &= factory.field_rule(ty, field).perform(handler);
    }
    valid
}
