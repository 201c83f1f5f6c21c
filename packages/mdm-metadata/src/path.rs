use crate::{MetadataError, MetadataResult};
use mdm_metadata_lib::{PATH_SEPARATOR, XSI_TYPE_ATTRIBUTE};

/// One `/`-separated step of a field path, e.g. `Address[@xsi:type="CNAddressType"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep<'a> {
    /// Field name: the step text before any `[`.
    pub field: &'a str,

    /// Concrete subtype named by an `@xsi:type` predicate.
    pub type_override: Option<&'a str>,
}

impl<'a> PathStep<'a> {
    /// Parse a step; `path` is the full path, used in error messages.
    pub fn parse(step: &'a str, path: &str) -> MetadataResult<Self> {
        let field = step.split_once('[').map_or(step, |(field, _)| field);

        let type_override = match step.find(XSI_TYPE_ATTRIBUTE) {
            Some(start) => {
                let name = step[start + XSI_TYPE_ATTRIBUTE.len()..].trim_matches(|c: char| {
                    matches!(c, '=' | '"' | '\'' | '[' | ']') || c.is_whitespace()
                });
                if name.is_empty() {
                    return Err(MetadataError::IllegalArgument(format!(
                        "Reusable type could not be null for fieldName '{path}'"
                    )));
                }
                Some(name)
            }
            None => None,
        };

        Ok(Self {
            field,
            type_override,
        })
    }
}

/// Whether `path` addresses a field through nested types.
pub fn is_nested(path: &str) -> bool {
    path.contains(PATH_SEPARATOR)
}

/// Steps of a nested path; empty segments are skipped.
pub fn steps(path: &str) -> impl Iterator<Item = &str> + '_ {
    path.split(PATH_SEPARATOR).filter(|step| !step.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_step() {
        let step = PathStep::parse("Province", "Province").unwrap();
        assert_eq!(step.field, "Province");
        assert_eq!(step.type_override, None);
    }

    #[test]
    fn test_parse_xsi_type_step() {
        let path = "Employee/Address[@xsi:type=\"CNAddressType\"]/Province";
        let step = PathStep::parse("Address[@xsi:type=\"CNAddressType\"]", path).unwrap();
        assert_eq!(step.field, "Address");
        assert_eq!(step.type_override, Some("CNAddressType"));

        let step = PathStep::parse("Address[@xsi:type='USAddressType']", path).unwrap();
        assert_eq!(step.type_override, Some("USAddressType"));
    }

    #[test]
    fn test_parse_empty_xsi_type_fails() {
        let err = PathStep::parse("Address[@xsi:type=\"\"]", "Address[@xsi:type=\"\"]/City")
            .unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @r###"Illegal argument: Reusable type could not be null for fieldName 'Address[@xsi:type=""]/City'"###
        );
    }

    #[test]
    fn test_steps_skip_empty_segments() {
        assert!(is_nested("a/b"));
        assert!(!is_nested("a[b"));
        assert_eq!(steps("/a//b/").collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
