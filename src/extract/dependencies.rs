use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Reserved prefix tagging a dependency as raw data access so the audit
/// engine can recognize it without a corresponding type record.
pub const DATA_ACCESS_PREFIX: &str = "__sql__";

/// Namespaces of well-known SQL / data-access libraries.
const DATA_ACCESS_LIBRARIES: &[&str] = &[
    "Microsoft.Data.SqlClient",
    "System.Data.SqlClient",
    "System.Data",
    "Dapper",
    "Npgsql",
    "MySql.Data",
    "Microsoft.EntityFrameworkCore",
    "MongoDB.Driver",
];

static FIELD_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:private|public|protected|internal)\s+(?:readonly\s+)?(\w+(?:<\w+>)?)\s+\w+")
        .expect("field type pattern")
});
static GENERIC_ARGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("generic args pattern"));
static METHOD_RETURN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:public|private|protected|internal)\s+(?:async\s+)?(?:Task<)?(\w+)>?\s+\w+\([^)]*\)")
        .expect("method return pattern")
});
static USING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"using\s+([\w.]+);").expect("using directive pattern"));

/// Extract candidate type dependencies from a declaration's text: typed
/// field declarations, method return types, and data-access `using`
/// directives (tagged with [`DATA_ACCESS_PREFIX`]).
pub(crate) fn extract_dependencies(text: &str) -> BTreeSet<String> {
    let mut dependencies = BTreeSet::new();

    for caps in FIELD_TYPE_RE.captures_iter(text) {
        let declared = GENERIC_ARGS_RE.replace_all(&caps[1], "").to_string();
        if is_candidate(&declared) {
            dependencies.insert(declared);
        }
    }

    for caps in METHOD_RETURN_RE.captures_iter(text) {
        let return_type = &caps[1];
        if is_candidate(return_type) {
            dependencies.insert(return_type.to_string());
        }
    }

    for caps in USING_RE.captures_iter(text) {
        let namespace = &caps[1];
        if DATA_ACCESS_LIBRARIES
            .iter()
            .any(|lib| namespace.contains(lib))
        {
            dependencies.insert(format!("{DATA_ACCESS_PREFIX}{namespace}"));
        }
    }

    dependencies
}

/// User-defined-looking type name: capitalized and not the async wrapper.
fn is_candidate(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase()) && name != "Task" && name != "void"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_types_collected() {
        let text = "private readonly OrderService _orders;\nprivate ILogger<OrderService> _log;";
        let deps = extract_dependencies(text);
        assert!(deps.contains("OrderService"));
        assert!(deps.contains("ILogger"));
    }

    #[test]
    fn test_lowercase_builtins_filtered() {
        let deps = extract_dependencies("private int _count;\nprivate string _name;");
        assert!(deps.is_empty());
    }

    #[test]
    fn test_method_return_types_collected() {
        let text = "public async Task<OrderDto> Get(int id)\npublic void Run()\npublic Task Fire()";
        let deps = extract_dependencies(text);
        assert!(deps.contains("OrderDto"));
        assert!(!deps.contains("Task"));
        assert!(!deps.contains("void"));
    }

    #[test]
    fn test_data_access_usings_tagged() {
        let text = "using Dapper;\nusing System.Collections.Generic;";
        let deps = extract_dependencies(text);
        assert!(deps.contains("__sql__Dapper"));
        assert_eq!(deps.len(), 1);
    }
}
