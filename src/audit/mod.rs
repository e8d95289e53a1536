//! The architectural audit engine.
//!
//! Evaluates the rule catalogue over the aggregated record set with
//! per-rule failure isolation: a rule that cannot run is logged and
//! contributes zero violations. Rules are read-only over the records and
//! independent of each other, so the catalogue runs on the rayon pool.

mod cycles;
pub mod rules;

pub use rules::RuleError;

use crate::config::Config;
use crate::extract::DATA_ACCESS_PREFIX;
use crate::model::{AuditRule, Role, TypeKind, TypeRecord, Violation};
use crate::session::{instability_of, AnalysisSession};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;

type TypeRegistry = BTreeMap<String, TypeRecord>;

/// Namespace fragments a handler is allowed to depend on.
const HANDLER_ALLOWED_NAMESPACES: &[&str] = &["Domain", "Handler", "Common"];

/// Annotations every controller must carry.
const REQUIRED_CONTROLLER_ATTRIBUTES: &[&str] = &["ApiController", "Route"];

/// Result of one audit run.
#[derive(Debug, Clone, Serialize)]
pub struct AuditResult {
    pub total_types: usize,
    pub total_violations: usize,
    pub violations_by_severity: BTreeMap<String, usize>,
    pub violations_by_rule: BTreeMap<String, usize>,
    pub violations: Vec<Violation>,
    pub metrics: AuditMetrics,
}

/// Summary metrics over the analyzed record set.
#[derive(Debug, Clone, Serialize)]
pub struct AuditMetrics {
    pub total_types: usize,
    pub avg_lcom: f64,
    pub avg_dependencies: f64,
    pub namespaces_analyzed: usize,
    pub types_by_role: BTreeMap<String, usize>,
    pub instability_by_namespace: BTreeMap<String, f64>,
}

pub struct AuditEngine {
    rules: Vec<AuditRule>,
    config: Config,
}

impl AuditEngine {
    pub fn new(config: Config) -> Self {
        Self::with_rules(rules::default_rules(), config)
    }

    pub fn with_rules(rules: Vec<AuditRule>, config: Config) -> Self {
        Self { rules, config }
    }

    pub fn rules(&self) -> &[AuditRule] {
        &self.rules
    }

    pub fn set_enabled(&mut self, rule_id: &str, enabled: bool) {
        for rule in &mut self.rules {
            if rule.id == rule_id {
                rule.enabled = enabled;
            }
        }
    }

    /// Run every enabled rule and aggregate violations and metrics.
    pub fn run(&self, types: &TypeRegistry) -> AuditResult {
        let outcomes: Vec<Result<Vec<Violation>, RuleError>> = self
            .rules
            .par_iter()
            .filter(|rule| rule.enabled)
            .map(|rule| self.evaluate(rule, types))
            .collect();

        let mut violations = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(found) => violations.extend(found),
                Err(rule_error) => {
                    error!(%rule_error, "audit rule failed, skipping");
                }
            }
        }

        let mut violations_by_severity: BTreeMap<String, usize> = BTreeMap::new();
        let mut violations_by_rule: BTreeMap<String, usize> = BTreeMap::new();
        for violation in &violations {
            *violations_by_severity
                .entry(violation.severity.to_string())
                .or_insert(0) += 1;
            *violations_by_rule
                .entry(violation.rule_id.clone())
                .or_insert(0) += 1;
        }

        AuditResult {
            total_types: types.len(),
            total_violations: violations.len(),
            violations_by_severity,
            violations_by_rule,
            violations,
            metrics: compute_metrics(types),
        }
    }

    fn evaluate(
        &self,
        rule: &AuditRule,
        types: &TypeRegistry,
    ) -> Result<Vec<Violation>, RuleError> {
        match rule.id.as_str() {
            rules::HANDLER_DOMAIN_ACCESS => Ok(handler_domain_access(types, rule)),
            rules::CONTROLLER_MEDIATOR_USAGE => Ok(controller_mediator_usage(types, rule)),
            rules::NO_RAW_DATA_ACCESS => Ok(raw_data_access(types, &self.config, rule)),
            rules::NO_CYCLIC_DEPENDENCIES => Ok(cycles::detect_cycles(types, rule)),
            rules::NO_GOD_OBJECTS => Ok(god_objects(types, &self.config, rule)),
            rules::NO_BLOCKING_ASYNC => Ok(async_safety(types, rule)),
            rules::DEPENDENCY_DIRECTION => Ok(dependency_direction(types, &self.config, rule)),
            rules::REPOSITORY_INTERFACE => Ok(repository_interfaces(types, rule)),
            rules::CONTROLLER_ATTRIBUTES => Ok(controller_attributes(types, rule)),
            other => Err(RuleError::new(other, "no evaluator registered")),
        }
    }
}

/// Run the full catalogue over a session's aggregated records.
pub fn audit(session: &AnalysisSession, config: &Config) -> AuditResult {
    AuditEngine::new(config.clone()).run(session.types())
}

fn compute_metrics(types: &TypeRegistry) -> AuditMetrics {
    let total = types.len();

    let mut types_by_role: BTreeMap<String, usize> = BTreeMap::new();
    let mut namespaces: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
    for record in types.values() {
        *types_by_role.entry(record.role.to_string()).or_insert(0) += 1;
        namespaces.insert(&record.namespace);
    }

    let instability_by_namespace = namespaces
        .iter()
        .map(|ns| ((*ns).to_string(), instability_of(types, ns)))
        .collect();

    let (avg_lcom, avg_dependencies) = if total == 0 {
        (0.0, 0.0)
    } else {
        (
            types.values().map(|t| t.lcom).sum::<f64>() / total as f64,
            types.values().map(|t| t.dependencies.len()).sum::<usize>() as f64 / total as f64,
        )
    };

    AuditMetrics {
        total_types: total,
        avg_lcom,
        avg_dependencies,
        namespaces_analyzed: namespaces.len(),
        types_by_role,
        instability_by_namespace,
    }
}

fn handler_domain_access(types: &TypeRegistry, rule: &AuditRule) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (name, record) in types {
        if record.role != Role::Handler {
            continue;
        }
        for dependency in &record.dependencies {
            let Some(target) = types.get(dependency) else {
                continue;
            };
            let allowed = HANDLER_ALLOWED_NAMESPACES
                .iter()
                .any(|layer| target.namespace.contains(layer));
            if !allowed {
                violations.push(
                    Violation::new(
                        rule,
                        format!(
                            "Handler '{name}' depends on '{dependency}' from {} (should only depend on Domain)",
                            target.namespace
                        ),
                        name,
                        &record.file_path,
                    )
                    .suggest("Handlers should only reference Domain entities and value objects"),
                );
            }
        }
    }

    violations
}

fn controller_mediator_usage(types: &TypeRegistry, rule: &AuditRule) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (name, record) in types {
        if record.role != Role::Controller {
            continue;
        }
        for dependency in &record.dependencies {
            if dependency.contains("Handler") && dependency != "IMediator" {
                violations.push(
                    Violation::new(
                        rule,
                        format!(
                            "Controller '{name}' directly depends on '{dependency}' (should use IMediator)"
                        ),
                        name,
                        &record.file_path,
                    )
                    .suggest(
                        "Inject IMediator and send commands or queries instead of calling handlers directly",
                    ),
                );
            }
        }
    }

    violations
}

fn raw_data_access(types: &TypeRegistry, config: &Config, rule: &AuditRule) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (name, record) in types {
        let in_forbidden_layer = config
            .layers
            .data_free
            .iter()
            .any(|layer| record.namespace.contains(layer) || record.file_path.contains(layer));
        if !in_forbidden_layer {
            continue;
        }

        for dependency in &record.dependencies {
            if let Some(library) = dependency.strip_prefix(DATA_ACCESS_PREFIX) {
                violations.push(
                    Violation::new(
                        rule,
                        format!(
                            "Type '{name}' in {} directly references {library}",
                            record.namespace
                        ),
                        name,
                        &record.file_path,
                    )
                    .suggest("Move data access to the Infrastructure/Repository layer and use interfaces"),
                );
            }
        }
    }

    violations
}

/// Each exceeded metric contributes one reason string to a single combined
/// violation per type.
fn god_objects(types: &TypeRegistry, config: &Config, rule: &AuditRule) -> Vec<Violation> {
    let mut violations = Vec::new();

    let lcom_threshold = config.metrics.lcom_threshold;
    let loc_threshold = config.metrics.loc_threshold;
    let max_dependencies = config.dependencies.max_per_class;

    for (name, record) in types {
        let mut reasons = Vec::new();

        if record.lcom > lcom_threshold {
            reasons.push(format!("Low cohesion (LCOM={:.2})", record.lcom));
        }
        if record.lines_of_code > loc_threshold {
            reasons.push(format!("Too many lines ({} LOC)", record.lines_of_code));
        }
        if record.dependencies.len() > max_dependencies {
            reasons.push(format!(
                "Too many dependencies ({} > {max_dependencies})",
                record.dependencies.len()
            ));
        }

        if !reasons.is_empty() {
            violations.push(
                Violation::new(
                    rule,
                    format!(
                        "'{name}' is a potential God Object: {}",
                        reasons.join(", ")
                    ),
                    name,
                    &record.file_path,
                )
                .suggest("Consider splitting into smaller, focused classes with single responsibilities"),
            );
        }
    }

    violations
}

fn async_safety(types: &TypeRegistry, rule: &AuditRule) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (name, record) in types {
        for finding in &record.async_findings {
            violations.push(
                Violation::new(rule, &finding.message, name, &record.file_path)
                    .at_line(finding.line)
                    .suggest(
                        "Use proper async/await instead of .Result, .Wait(), or .GetAwaiter().GetResult()",
                    ),
            );
        }
    }

    violations
}

fn dependency_direction(types: &TypeRegistry, config: &Config, rule: &AuditRule) -> Vec<Violation> {
    let mut violations = Vec::new();
    let hierarchy = &config.layers.hierarchy;

    let layer_of = |namespace: &str| -> Option<usize> {
        hierarchy
            .iter()
            .position(|layer| namespace.contains(layer.as_str()))
    };

    for (name, record) in types {
        let Some(source_level) = layer_of(&record.namespace) else {
            continue;
        };

        for dependency in &record.dependencies {
            let Some(target) = types.get(dependency) else {
                continue;
            };
            let Some(target_level) = layer_of(&target.namespace) else {
                continue;
            };

            if target_level > source_level {
                violations.push(
                    Violation::new(
                        rule,
                        format!(
                            "'{name}' in {} depends on '{dependency}' in {} (wrong direction)",
                            hierarchy[source_level], hierarchy[target_level]
                        ),
                        name,
                        &record.file_path,
                    )
                    .suggest(format!(
                        "Dependencies should flow: {}. Consider using interfaces or moving code.",
                        hierarchy.join(" -> ")
                    )),
                );
            }
        }
    }

    violations
}

fn repository_interfaces(types: &TypeRegistry, rule: &AuditRule) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (name, record) in types {
        if record.role != Role::Repository || record.kind == TypeKind::Interface {
            continue;
        }

        let interface_name = format!("I{name}");
        if !types.contains_key(&interface_name) {
            violations.push(
                Violation::new(
                    rule,
                    format!(
                        "Repository '{name}' does not have a corresponding interface '{interface_name}'"
                    ),
                    name,
                    &record.file_path,
                )
                .suggest(format!(
                    "Create interface '{interface_name}' and register it through dependency injection"
                )),
            );
        }
    }

    violations
}

fn controller_attributes(types: &TypeRegistry, rule: &AuditRule) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (name, record) in types {
        if record.role != Role::Controller {
            continue;
        }

        for required in REQUIRED_CONTROLLER_ATTRIBUTES {
            let present = record
                .annotations
                .iter()
                .any(|annotation| annotation.name.contains(required));
            if !present {
                violations.push(
                    Violation::new(
                        rule,
                        format!("Controller '{name}' is missing [{required}] attribute"),
                        name,
                        &record.file_path,
                    )
                    .suggest(format!("Add [{required}] attribute to the controller")),
                );
            }
        }
    }

    violations
}
