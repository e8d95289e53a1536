//! The built-in rule catalogue and the per-rule failure type.

use crate::model::{AuditRule, Severity};
use thiserror::Error;

pub const HANDLER_DOMAIN_ACCESS: &str = "MEDIATR_001";
pub const CONTROLLER_MEDIATOR_USAGE: &str = "MEDIATR_002";
pub const NO_RAW_DATA_ACCESS: &str = "DATA_001";
pub const NO_CYCLIC_DEPENDENCIES: &str = "ARCH_001";
pub const NO_GOD_OBJECTS: &str = "DESIGN_001";
pub const NO_BLOCKING_ASYNC: &str = "ASYNC_001";
pub const DEPENDENCY_DIRECTION: &str = "ARCH_002";
pub const REPOSITORY_INTERFACE: &str = "DATA_002";
pub const CONTROLLER_ATTRIBUTES: &str = "ATTR_001";

/// A rule that could not be evaluated. The audit run logs it and moves on;
/// the failing rule contributes zero violations.
#[derive(Debug, Error)]
#[error("rule {rule_id} failed: {reason}")]
pub struct RuleError {
    pub rule_id: String,
    pub reason: String,
}

impl RuleError {
    pub fn new(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }
}

pub fn default_rules() -> Vec<AuditRule> {
    vec![
        AuditRule::new(
            HANDLER_DOMAIN_ACCESS,
            "MediatR Handler Domain Access",
            "Handlers may only depend on Domain, Handler, and Common namespaces",
            Severity::Error,
        ),
        AuditRule::new(
            CONTROLLER_MEDIATOR_USAGE,
            "Controller MediatR Usage",
            "Controllers must depend on IMediator, not on handlers directly",
            Severity::Error,
        ),
        AuditRule::new(
            NO_RAW_DATA_ACCESS,
            "No Direct SQL in Application/Web Layers",
            "Non-data layers must not reference SQL libraries directly",
            Severity::Error,
        ),
        AuditRule::new(
            NO_CYCLIC_DEPENDENCIES,
            "No Cyclic Dependencies",
            "Namespaces must not have circular references",
            Severity::Error,
        ),
        AuditRule::new(
            NO_GOD_OBJECTS,
            "No God Objects",
            "Types should keep cohesion, size, and dependency count in bounds",
            Severity::Warning,
        ),
        AuditRule::new(
            NO_BLOCKING_ASYNC,
            "No Async-over-Sync",
            "Avoid blocking async code with .Result or .Wait()",
            Severity::Warning,
        ),
        AuditRule::new(
            DEPENDENCY_DIRECTION,
            "Dependency Flow Direction",
            "Dependencies must flow against the configured layer order",
            Severity::Error,
        ),
        AuditRule::new(
            REPOSITORY_INTERFACE,
            "Repository Interface Usage",
            "Repositories must have a corresponding interface",
            Severity::Warning,
        ),
        AuditRule::new(
            CONTROLLER_ATTRIBUTES,
            "Controller Attribute Validation",
            "Controllers must carry [ApiController] and [Route] attributes",
            Severity::Warning,
        ),
    ]
}
