use crate::patterns::PatternMatch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Namespace marker for types declared outside any `namespace` block.
pub const GLOBAL_NAMESPACE: &str = "_global_";

/// Declaration kind of an analyzed type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Record,
    Enum,
}

impl TypeKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "class" => Some(TypeKind::Class),
            "interface" => Some(TypeKind::Interface),
            "struct" => Some(TypeKind::Struct),
            "record" => Some(TypeKind::Record),
            "enum" => Some(TypeKind::Enum),
            _ => None,
        }
    }
}

/// Architectural role inferred from annotations and naming conventions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Controller,
    Service,
    Repository,
    DomainEntity,
    ValueObject,
    Handler,
    Validator,
    Middleware,
    Configuration,
    Unknown,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Role::Controller => "controller",
            Role::Service => "service",
            Role::Repository => "repository",
            Role::DomainEntity => "domain_entity",
            Role::ValueObject => "value_object",
            Role::Handler => "handler",
            Role::Validator => "validator",
            Role::Middleware => "middleware",
            Role::Configuration => "configuration",
            Role::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Property,
    Method,
}

/// A class member captured for cohesion analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub declared_type: Option<String>,
    pub is_static: bool,
    /// Field/property names this member was observed to access (methods only).
    #[serde(default)]
    pub accessed_fields: BTreeSet<String>,
}

impl Member {
    pub fn new(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            kind,
            declared_type: None,
            is_static: false,
            accessed_fields: BTreeSet::new(),
        }
    }
}

/// A C# attribute attached to a declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub arguments: Vec<String>,
    pub line: usize,
}

/// Service lifetime of a dependency-injection registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiLifetime {
    Transient,
    Scoped,
    Singleton,
}

impl std::str::FromStr for DiLifetime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "transient" => Ok(DiLifetime::Transient),
            "scoped" => Ok(DiLifetime::Scoped),
            "singleton" => Ok(DiLifetime::Singleton),
            _ => Err(format!("Unknown lifetime: {}", s)),
        }
    }
}

/// One composition-root registration binding an abstraction to an
/// implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiRegistration {
    pub interface_type: String,
    pub implementation_type: String,
    pub lifetime: DiLifetime,
    pub location: String,
}

/// An async-safety finding anchored to a source line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AsyncFinding {
    pub line: usize,
    pub message: String,
}

/// One fact record per declared type. Produced by extraction, enriched and
/// linked during aggregation, consumed by the audit engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRecord {
    pub name: String,
    pub namespace: String,
    pub file_path: String,
    pub kind: TypeKind,
    pub annotations: Vec<Annotation>,
    pub role: Role,
    /// Names of types this one depends on.
    pub dependencies: BTreeSet<String>,
    /// Names of types depending on this one (populated by DI linking).
    pub dependents: BTreeSet<String>,
    pub members: Vec<Member>,
    pub lines_of_code: usize,
    pub cyclomatic_complexity: usize,
    pub lcom: f64,
    pub is_partial: bool,
    /// File paths of every fragment once partial declarations are merged.
    pub partial_paths: Vec<String>,
    pub async_findings: Vec<AsyncFinding>,
    pub patterns: Vec<PatternMatch>,
}

impl TypeRecord {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        file_path: impl Into<String>,
        kind: TypeKind,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            file_path: file_path.into(),
            kind,
            annotations: Vec::new(),
            role: Role::Unknown,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            members: Vec::new(),
            lines_of_code: 0,
            cyclomatic_complexity: 0,
            lcom: 0.0,
            is_partial: false,
            partial_paths: Vec::new(),
            async_findings: Vec::new(),
            patterns: Vec::new(),
        }
    }
}
