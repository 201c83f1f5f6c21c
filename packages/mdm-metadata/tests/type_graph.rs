use mdm_metadata::{
    prelude::*,
    validation::{NoOpValidationFactory, ValidationIssues},
};

struct Model {
    repo: MetadataRepository,
    string: TypeId,
    int: TypeId,
}

impl Model {
    fn new() -> Self {
        let repo = MetadataRepository::new();
        let string = repo.builtin(XsdType::String).unwrap();
        let int = repo.builtin(XsdType::Int).unwrap();
        Self { repo, string, int }
    }

    fn add(&mut self, name: &str, instantiable: bool) -> TypeId {
        self.repo
            .add_complex_type(ComplexTypeMetadata::new("", name, instantiable))
            .unwrap()
    }

    fn field(&mut self, owner: TypeId, name: &str, field_type: TypeId) {
        self.repo
            .complex_mut(owner)
            .unwrap()
            .add_field(FieldMetadata::simple(owner, name, field_type))
            .unwrap();
    }

    fn extend(&mut self, sub_type: TypeId, super_type: TypeId) {
        self.repo
            .complex_mut(sub_type)
            .unwrap()
            .add_super_type(super_type)
            .unwrap();
    }
}

#[test]
fn test_person_inherits_living_being_fields() {
    let mut model = Model::new();
    let being = model.add("LivingBeing", true);
    let person = model.add("Person", true);
    let (string, int) = (model.string, model.int);
    model.field(being, "age", int);
    model
        .repo
        .complex_mut(person)
        .unwrap()
        .add_field(FieldMetadata::simple(person, "name", string).with_key(true))
        .unwrap();
    model.extend(person, being);

    model.repo.freeze(person).unwrap();

    let repo = &model.repo;
    assert!(repo.complex(being).unwrap().is_frozen());
    let person_ty = repo.complex(person).unwrap();
    assert!(person_ty.has_field("age"));
    assert_eq!(person_ty.field("age").unwrap().field_type(), int);
    assert_eq!(
        person_ty.field("age").unwrap().field_type(),
        repo.complex(being).unwrap().field("age").unwrap().field_type()
    );
    assert_eq!(person_ty.field("age").unwrap().containing_type(), person);
    assert_eq!(person_ty.field("age").unwrap().declaring_type(), being);
    assert_eq!(
        person_ty.key_fields().map(FieldMetadata::name).collect::<Vec<_>>(),
        vec!["name"]
    );
    assert_eq!(person_ty.field_names().collect::<Vec<_>>(), vec!["age", "name"]);
    assert_eq!(person_ty.super_types(), [being]);
    assert!(repo
        .complex(being)
        .unwrap()
        .direct_sub_types()
        .contains(&person));
    assert!(person_ty.is_assignable_from(being).unwrap());
}

#[test]
fn test_inherited_single_step_lookup_before_freeze() {
    let mut model = Model::new();
    let being = model.add("LivingBeing", true);
    let person = model.add("Person", true);
    let int = model.int;
    model.field(being, "age", int);
    model.extend(person, being);

    let person = model.repo.complex(person).unwrap();
    assert!(!person.is_frozen());
    assert!(person.has_field("age"));
    assert!(person.field("age").is_ok());
    assert!(person.own_field("age").is_none());
}

#[test]
fn test_own_fields_override_inherited_ones() {
    let mut model = Model::new();
    let being = model.add("LivingBeing", true);
    let person = model.add("Person", true);
    let (string, int) = (model.string, model.int);
    model.field(being, "age", int);
    model.field(person, "age", string);
    model.extend(person, being);

    model.repo.freeze(person).unwrap();

    let person = model.repo.complex(person).unwrap();
    assert_eq!(person.fields().len(), 1);
    assert_eq!(person.field("age").unwrap().field_type(), string);
}

#[test]
fn test_mutation_after_freeze_fails() {
    let mut model = Model::new();
    let person = model.add("Person", true);
    let other = model.add("Other", true);
    let string = model.string;
    model.field(person, "name", string);
    model.repo.freeze(person).unwrap();

    let ty = model.repo.complex_mut(person).unwrap();
    let result = ty.add_field(FieldMetadata::simple(person, "x", string));
    assert!(matches!(result, Err(MetadataError::Frozen { .. })));
    insta::assert_snapshot!(
        result.unwrap_err().to_string(),
        @"Type 'Person' is frozen and can not be modified."
    );
    assert!(matches!(
        ty.register_key(FieldMetadata::simple(person, "x", string)),
        Err(MetadataError::Frozen { .. })
    ));
    assert!(matches!(
        ty.add_super_type(other),
        Err(MetadataError::Frozen { .. })
    ));
    assert!(matches!(
        ty.set_instantiable(false),
        Err(MetadataError::Frozen { .. })
    ));
    assert!(matches!(
        ty.set_sub_types(vec![other]),
        Err(MetadataError::Frozen { .. })
    ));

    let ty = model.repo.complex(person).unwrap();
    assert_eq!(ty.field_names().collect::<Vec<_>>(), vec!["name"]);
    assert!(ty.is_instantiable());
}

#[test]
fn test_multiple_inheritance_drops_mismatched_super_types() {
    let mut model = Model::new();
    let entity = model.add("Entity", true);
    let reusable = model.add("Reusable", false);
    let mixed = model.add("Mixed", false);
    let (string, int) = (model.string, model.int);
    model.field(entity, "id", string);
    model.field(reusable, "size", int);
    model.extend(mixed, entity);
    model.extend(mixed, reusable);

    model.repo.freeze(mixed).unwrap();

    let repo = &model.repo;
    let ty = repo.complex(mixed).unwrap();
    assert_eq!(ty.super_types(), [reusable]);
    assert!(ty.has_field("size"));
    assert!(!ty.has_field("id"));
    assert!(repo
        .complex(reusable)
        .unwrap()
        .direct_sub_types()
        .contains(&mixed));
    assert!(!repo
        .complex(entity)
        .unwrap()
        .direct_sub_types()
        .contains(&mixed));
}

#[test]
fn test_single_mismatched_super_type_still_lends_fields() {
    let mut model = Model::new();
    let entity = model.add("Entity", true);
    let structure = model.add("Structure", false);
    let string = model.string;
    model.field(entity, "id", string);
    model.extend(structure, entity);

    model.repo.freeze(structure).unwrap();

    let repo = &model.repo;
    let ty = repo.complex(structure).unwrap();
    assert!(ty.super_types().is_empty());
    assert!(ty.has_field("id"));
    assert_eq!(ty.field("id").unwrap().containing_type(), structure);
    assert!(repo.complex(entity).unwrap().direct_sub_types().is_empty());
}

#[test]
fn test_has_field_agrees_with_field() {
    let mut model = Model::new();
    let address = model.add("AddressType", false);
    let person = model.add("Person", true);
    let string = model.string;
    model.field(address, "City", string);
    model.field(person, "name", string);
    model.field(person, "a[b", string);
    model
        .repo
        .complex_mut(person)
        .unwrap()
        .add_field(FieldMetadata::contained(person, "address", address))
        .unwrap();
    model.repo.freeze_all().unwrap();

    let person = model.repo.complex(person).unwrap();
    for path in [
        "name",
        "a[b",
        "address",
        "address/City",
        "address/Street",
        "name/first",
        "missing",
        "/address/City",
        "address[@xsi:type=\"AddressType\"]/City",
    ] {
        assert_eq!(
            person.has_field(path),
            person.field(path).is_ok(),
            "has_field and field disagree on '{path}'"
        );
    }
    assert!(person.has_field("a[b"));
    assert!(person.has_field("address/City"));
    assert!(!person.has_field("name/first"));
}

#[test]
fn test_copy_keeps_identity() {
    let mut model = Model::new();
    let person = model.add("Person", true);
    let string = model.string;
    model.field(person, "name", string);
    model.repo.freeze(person).unwrap();

    let copy = model.repo.copy(person).unwrap();

    let repo = &model.repo;
    assert_ne!(copy, person);
    assert_eq!(repo.get(copy).unwrap(), repo.get(person).unwrap());
    assert_eq!(repo.complex(copy).unwrap().name(), "Person");
    assert_eq!(repo.complex(copy).unwrap().fields().len(), 1);

    model
        .repo
        .complex_mut(copy)
        .unwrap()
        .add_field(FieldMetadata::simple(copy, "nickname", string))
        .unwrap();
    assert_eq!(model.repo.complex(person).unwrap().fields().len(), 1);
}

#[test]
fn test_validate_runs_type_rule_then_field_rules() {
    struct Recording;

    struct Rule(String);

    impl ValidationRule for Rule {
        fn perform(&self, handler: &mut dyn ValidationHandler) -> bool {
            handler.warning(&self.0, "checked".to_string());
            !self.0.ends_with("/bad")
        }
    }

    impl ValidationFactory for Recording {
        fn type_rule<'a>(&self, ty: ComplexTypeRef<'a>) -> Box<dyn ValidationRule + 'a> {
            Box::new(Rule(ty.name().to_string()))
        }

        fn field_rule<'a>(
            &self,
            ty: ComplexTypeRef<'a>,
            field: &'a FieldMetadata,
        ) -> Box<dyn ValidationRule + 'a> {
            Box::new(Rule(format!("{}/{}", ty.name(), field.name())))
        }
    }

    struct Order(Vec<String>);

    impl ValidationHandler for Order {
        fn error(&mut self, location: &str, _: String) {
            self.0.push(location.to_string());
        }

        fn warning(&mut self, location: &str, _: String) {
            self.0.push(location.to_string());
        }

        fn error_count(&self) -> usize {
            0
        }
    }

    let mut model = Model::new();
    let person = model.add("Person", true);
    let string = model.string;
    for name in ["name", "bad", "age"] {
        model.field(person, name, string);
    }
    model.repo.freeze(person).unwrap();
    let person = model.repo.complex(person).unwrap();

    let mut order = Order(Vec::new());
    assert!(!person.validate(&Recording, &mut order));
    assert_eq!(
        order.0,
        vec!["Person", "Person/name", "Person/bad", "Person/age"]
    );

    let mut issues = ValidationIssues::default();
    assert!(person.validate(&NoOpValidationFactory, &mut issues));
    assert!(issues.is_empty());
}
