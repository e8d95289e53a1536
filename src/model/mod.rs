mod record;
mod violation;

pub use record::{
    Annotation, AsyncFinding, DiLifetime, DiRegistration, Member, MemberKind, Role, TypeKind,
    TypeRecord, GLOBAL_NAMESPACE,
};
pub use violation::{AuditRule, Severity, Violation};
