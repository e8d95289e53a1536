use crate::model::{Annotation, Role};

/// Attribute-name evidence per role, most authoritative first.
const ROLE_ANNOTATIONS: &[(Role, &[&str])] = &[
    (Role::Controller, &["ApiController", "Controller", "RouteAttribute"]),
    (Role::Service, &["Service", "Injectable", "Transient", "Scoped"]),
    (Role::Repository, &["Repository", "DataAccess"]),
    (Role::DomainEntity, &["Entity", "DomainEntity", "Aggregate"]),
    (Role::ValueObject, &["ValueObject", "Immutable"]),
    (
        Role::Handler,
        &["Handler", "RequestHandler", "CommandHandler", "QueryHandler"],
    ),
    (Role::Validator, &["Validator", "FluentValidation"]),
    (Role::Middleware, &["Middleware"]),
];

/// Type-name suffix conventions, checked after attributes.
const ROLE_SUFFIXES: &[(Role, &str)] = &[
    (Role::Controller, "Controller"),
    (Role::Service, "Service"),
    (Role::Repository, "Repository"),
    (Role::Handler, "Handler"),
    (Role::Validator, "Validator"),
];

/// Base-type evidence, checked last.
const ROLE_BASE_TYPES: &[(Role, &str)] = &[
    (Role::Controller, "Controller"),
    (Role::Repository, "Repository"),
];

/// Infer the architectural role: attributes first, then name suffix, then
/// base types. First match wins.
pub(crate) fn infer_role(
    annotations: &[Annotation],
    type_name: &str,
    base_types: &[String],
) -> Role {
    for annotation in annotations {
        let name = annotation.name.to_ascii_lowercase();
        for (role, patterns) in ROLE_ANNOTATIONS {
            if patterns
                .iter()
                .any(|p| name.contains(&p.to_ascii_lowercase()))
            {
                return *role;
            }
        }
    }

    for (role, suffix) in ROLE_SUFFIXES {
        if type_name.ends_with(suffix) {
            return *role;
        }
    }

    for base in base_types {
        for (role, fragment) in ROLE_BASE_TYPES {
            if base.contains(fragment) {
                return *role;
            }
        }
    }

    Role::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(name: &str) -> Annotation {
        Annotation {
            name: name.to_string(),
            arguments: Vec::new(),
            line: 1,
        }
    }

    #[test]
    fn test_annotation_wins_over_name() {
        let role = infer_role(&[annotation("ApiController")], "OrderThing", &[]);
        assert_eq!(role, Role::Controller);
    }

    #[test]
    fn test_annotation_match_is_case_insensitive() {
        let role = infer_role(&[annotation("apicontroller")], "X", &[]);
        assert_eq!(role, Role::Controller);
    }

    #[test]
    fn test_name_suffix_fallback() {
        assert_eq!(infer_role(&[], "UserService", &[]), Role::Service);
        assert_eq!(infer_role(&[], "OrderRepository", &[]), Role::Repository);
        assert_eq!(infer_role(&[], "CreateOrderHandler", &[]), Role::Handler);
    }

    #[test]
    fn test_base_type_fallback() {
        let bases = vec!["ControllerBase".to_string()];
        assert_eq!(infer_role(&[], "Orders", &bases), Role::Controller);
    }

    #[test]
    fn test_unknown_when_nothing_matches() {
        assert_eq!(infer_role(&[], "Order", &[]), Role::Unknown);
    }
}
