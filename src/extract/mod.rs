//! Heuristic semantic extraction: one declaration's source slice in, one
//! [`TypeRecord`] out.
//!
//! Everything here is regex-over-text and deliberately approximate: it
//! trades precision for robustness on arbitrary, possibly malformed input.
//! The [`TypeExtractor`] trait is the seam where an AST-accurate
//! implementation could be swapped in without touching the audit engine.

mod annotations;
mod async_safety;
mod chunks;
mod dependencies;
pub(crate) mod di;
mod members;
mod metrics;
mod roles;

pub use dependencies::DATA_ACCESS_PREFIX;

use crate::config::{AnalysisToggles, Config};
use crate::model::{Role, TypeRecord, GLOBAL_NAMESPACE};
use crate::patterns::{detect_patterns_with, PatternThresholds};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static PARTIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpartial\b").expect("partial keyword pattern"));
static BASE_TYPES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*([^{\n]+)").expect("base types pattern"));

/// Strategy for turning file text into type fact records.
pub trait TypeExtractor: Send + Sync {
    fn extract(&self, file_path: &str, source: &str) -> Vec<TypeRecord>;
}

/// The shipped regex-over-text extractor.
pub struct HeuristicExtractor {
    toggles: AnalysisToggles,
    thresholds: PatternThresholds,
}

impl HeuristicExtractor {
    pub fn new() -> Self {
        Self {
            toggles: AnalysisToggles::default(),
            thresholds: PatternThresholds::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            toggles: config.analysis,
            thresholds: config.pattern_thresholds,
        }
    }

    fn build_record(
        &self,
        file_path: &str,
        source: &str,
        namespace: &str,
        decl: &chunks::Declaration,
    ) -> Option<TypeRecord> {
        if decl.text.trim().is_empty() {
            warn!(type_name = %decl.name, file = file_path, "empty declaration slice, skipping");
            return None;
        }

        let mut record = TypeRecord::new(&decl.name, namespace, file_path, decl.kind);
        record.annotations = annotations::extract_annotations(source, decl.start_line);
        record.is_partial = PARTIAL_RE.is_match(&decl.text);
        record.members = members::extract_members(&decl.text);
        record.lcom = metrics::lack_of_cohesion(&mut record.members, &decl.text);
        record.dependencies = dependencies::extract_dependencies(&decl.text);
        record.lines_of_code = metrics::lines_of_code(&decl.text);
        record.cyclomatic_complexity = metrics::cyclomatic_complexity(&decl.text);

        let base_types = extract_base_types(&decl.text);
        record.role = roles::infer_role(&record.annotations, &decl.name, &base_types);
        if record.role == Role::Unknown {
            // Fall back to member declared types as base-type evidence.
            let member_types: Vec<String> = record
                .members
                .iter()
                .filter_map(|m| m.declared_type.clone())
                .collect();
            record.role = roles::infer_role(&record.annotations, &decl.name, &member_types);
        }

        if self.toggles.detect_async_patterns {
            record.async_findings = async_safety::scan_async_safety(&decl.text);
        }
        if self.toggles.detect_design_patterns {
            record.patterns = detect_patterns_with(&decl.text, &decl.name, &self.thresholds);
        }

        Some(record)
    }
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeExtractor for HeuristicExtractor {
    fn extract(&self, file_path: &str, source: &str) -> Vec<TypeRecord> {
        if source.trim().is_empty() {
            warn!(file = file_path, "empty source, nothing to extract");
            return Vec::new();
        }

        let namespace = extract_namespace(source);
        let namespace = namespace.as_deref().unwrap_or(GLOBAL_NAMESPACE);

        let declarations = chunks::split_declarations(source);
        if declarations.is_empty() {
            debug!(file = file_path, "no type declarations found");
        }

        declarations
            .iter()
            .filter_map(|decl| self.build_record(file_path, source, namespace, decl))
            .collect()
    }
}

/// Analyze one file's declarations, pre-aggregation.
pub fn extract(file_path: &str, source: &str) -> Vec<TypeRecord> {
    HeuristicExtractor::new().extract(file_path, source)
}

/// First `namespace` directive in the file, if any. File-scoped and
/// block-scoped forms both apply to every declaration in the file.
fn extract_namespace(source: &str) -> Option<String> {
    for line in source.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("namespace ") {
            let ns = rest.trim_end_matches(';').trim_end_matches('{').trim();
            if !ns.is_empty() {
                return Some(ns.to_string());
            }
        }
    }
    None
}

/// Base types/interfaces from the declaration header.
fn extract_base_types(text: &str) -> Vec<String> {
    let header_end = text.find('{').unwrap_or(text.len());
    BASE_TYPES_RE
        .captures(&text[..header_end])
        .map(|caps| {
            caps[1]
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
