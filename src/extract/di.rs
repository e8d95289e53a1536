use crate::model::DiRegistration;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// The three registration call shapes scanned for in composition roots:
/// generic two-type form, generic one-type form with inline construction,
/// and the `typeof` form. Each tags its lifetime keyword.
static REGISTRATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"Add(Transient|Scoped|Singleton)<(\w+),\s*(\w+)>\(",
        r"Add(Transient|Scoped|Singleton)<(\w+)>\([^)]*new\s+(\w+)",
        r"Add(Transient|Scoped|Singleton)\(typeof\((\w+)\),\s*typeof\((\w+)\)",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("registration pattern"))
    .collect()
});

/// Whether a file is a composition root worth scanning for registrations.
pub(crate) fn is_composition_root(file_path: &str) -> bool {
    matches!(
        Path::new(file_path).file_name().and_then(|n| n.to_str()),
        Some("Program.cs") | Some("Startup.cs")
    )
}

/// Scan composition-root text for dependency-injection registrations.
pub(crate) fn extract_di_registrations(source: &str, file_path: &str) -> Vec<DiRegistration> {
    let mut registrations = Vec::new();

    for (line_number, line) in source.lines().enumerate() {
        for pattern in REGISTRATION_PATTERNS.iter() {
            for caps in pattern.captures_iter(line) {
                let Ok(lifetime) = caps[1].parse() else {
                    continue;
                };
                registrations.push(DiRegistration {
                    interface_type: caps[2].to_string(),
                    implementation_type: caps[3].to_string(),
                    lifetime,
                    location: format!("{}:{}", file_path, line_number + 1),
                });
            }
        }
    }

    registrations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DiLifetime;

    #[test]
    fn test_recognizes_composition_roots() {
        assert!(is_composition_root("src/Program.cs"));
        assert!(is_composition_root("Startup.cs"));
        assert!(!is_composition_root("src/OrderService.cs"));
    }

    #[test]
    fn test_generic_two_type_registration() {
        let source = "services.AddScoped<IOrderRepository, OrderRepository>();\n";
        let regs = extract_di_registrations(source, "Program.cs");
        assert_eq!(regs.len(), 1);
        assert_eq!(regs[0].interface_type, "IOrderRepository");
        assert_eq!(regs[0].implementation_type, "OrderRepository");
        assert_eq!(regs[0].lifetime, DiLifetime::Scoped);
        assert_eq!(regs[0].location, "Program.cs:1");
    }

    #[test]
    fn test_inline_construction_registration() {
        let source = "services.AddSingleton<IClock>(sp => new SystemClock());\n";
        let regs = extract_di_registrations(source, "Program.cs");
        assert_eq!(regs.len(), 1);
        assert_eq!(regs[0].interface_type, "IClock");
        assert_eq!(regs[0].implementation_type, "SystemClock");
        assert_eq!(regs[0].lifetime, DiLifetime::Singleton);
    }

    #[test]
    fn test_typeof_registration() {
        let source = "services.AddTransient(typeof(IMapper), typeof(Mapper));\n";
        let regs = extract_di_registrations(source, "Startup.cs");
        assert_eq!(regs.len(), 1);
        assert_eq!(regs[0].interface_type, "IMapper");
        assert_eq!(regs[0].implementation_type, "Mapper");
        assert_eq!(regs[0].lifetime, DiLifetime::Transient);
    }

    #[test]
    fn test_unrelated_lines_ignored() {
        let source = "var app = builder.Build();\napp.Run();\n";
        assert!(extract_di_registrations(source, "Program.cs").is_empty());
    }
}
