//! Analysis-session registry and the sequential aggregation phase.
//!
//! The session owns every [`TypeRecord`] produced by extraction, keyed by
//! type name. Extraction across files is stateless and runs on the rayon
//! pool; aggregation (DI linking, partial-declaration merging) needs the
//! complete record set and runs once, after extraction finishes.

use crate::config::Config;
use crate::extract::{di, HeuristicExtractor, TypeExtractor};
use crate::model::{DiRegistration, TypeRecord};
use rayon::prelude::*;
use std::collections::BTreeMap;

pub struct AnalysisSession {
    extractor: Box<dyn TypeExtractor>,
    types: BTreeMap<String, TypeRecord>,
    registrations: Vec<DiRegistration>,
    /// Partial fragments parked until the aggregation phase.
    partial_backlog: Vec<TypeRecord>,
    link_registrations: bool,
    merge_partials: bool,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::with_extractor(Box::new(HeuristicExtractor::new()))
    }

    pub fn with_config(config: &Config) -> Self {
        let mut session = Self::with_extractor(Box::new(HeuristicExtractor::from_config(config)));
        session.link_registrations = config.analysis.extract_di_registrations;
        session.merge_partials = config.analysis.merge_partial_types;
        session
    }

    pub fn with_extractor(extractor: Box<dyn TypeExtractor>) -> Self {
        Self {
            extractor,
            types: BTreeMap::new(),
            registrations: Vec::new(),
            partial_backlog: Vec::new(),
            link_registrations: true,
            merge_partials: true,
        }
    }

    pub fn types(&self) -> &BTreeMap<String, TypeRecord> {
        &self.types
    }

    pub fn registrations(&self) -> &[DiRegistration] {
        &self.registrations
    }

    /// Extract one file and register its records. Composition roots are
    /// also scanned for DI registrations.
    pub fn ingest_file(&mut self, file_path: &str, source: &str) {
        if self.link_registrations && di::is_composition_root(file_path) {
            self.registrations
                .extend(di::extract_di_registrations(source, file_path));
        }
        for record in self.extractor.extract(file_path, source) {
            self.insert(record);
        }
    }

    /// Extract many files concurrently, then register sequentially.
    pub fn ingest_files(&mut self, files: &[(String, String)]) {
        let extractor = self.extractor.as_ref();
        let link_registrations = self.link_registrations;

        let extracted: Vec<(Vec<TypeRecord>, Vec<DiRegistration>)> = files
            .par_iter()
            .map(|(file_path, source)| {
                let registrations = if link_registrations && di::is_composition_root(file_path) {
                    di::extract_di_registrations(source, file_path)
                } else {
                    Vec::new()
                };
                (extractor.extract(file_path, source), registrations)
            })
            .collect();

        for (records, registrations) in extracted {
            self.registrations.extend(registrations);
            for record in records {
                self.insert(record);
            }
        }
    }

    /// Register one record. Later partial fragments of an already-seen
    /// partial type are parked for the merge pass instead of replacing it.
    pub fn insert(&mut self, record: TypeRecord) {
        if record.is_partial {
            if let Some(existing) = self.types.get(&record.name) {
                if existing.is_partial && existing.namespace == record.namespace {
                    self.partial_backlog.push(record);
                    return;
                }
            }
        }
        self.types.insert(record.name.clone(), record);
    }

    /// Sequential aggregation: DI linking plus partial-declaration merge.
    pub fn aggregate(&mut self) {
        if self.link_registrations {
            self.link_di_registrations();
        }
        if self.merge_partials {
            self.merge_partial_types();
        }
    }

    /// Create synthetic dependency edges between registered interfaces and
    /// their implementations.
    pub fn link_di_registrations(&mut self) {
        for registration in &self.registrations {
            let both_known = self.types.contains_key(&registration.interface_type)
                && self.types.contains_key(&registration.implementation_type);
            if !both_known {
                continue;
            }
            if let Some(interface) = self.types.get_mut(&registration.interface_type) {
                interface
                    .dependents
                    .insert(registration.implementation_type.clone());
            }
            if let Some(implementation) = self.types.get_mut(&registration.implementation_type) {
                implementation
                    .dependencies
                    .insert(registration.interface_type.clone());
            }
        }
    }

    /// Merge parked partial fragments into their canonical records:
    /// members, annotations, and dependencies are unioned; lines of code
    /// and complexity are summed; every fragment path is recorded.
    pub fn merge_partial_types(&mut self) {
        for fragment in std::mem::take(&mut self.partial_backlog) {
            let Some(base) = self.types.get_mut(&fragment.name) else {
                self.types.insert(fragment.name.clone(), fragment);
                continue;
            };
            if base.partial_paths.is_empty() {
                base.partial_paths.push(base.file_path.clone());
            }
            base.partial_paths.push(fragment.file_path.clone());
            base.members.extend(fragment.members);
            base.annotations.extend(fragment.annotations);
            base.dependencies.extend(fragment.dependencies);
            base.lines_of_code += fragment.lines_of_code;
            base.cyclomatic_complexity += fragment.cyclomatic_complexity;
        }
    }

    /// Instability index for a namespace: efferent / (efferent + afferent)
    /// coupling over unioned dependency and dependent name sets. 0.0 when
    /// both are empty.
    pub fn instability(&self, namespace: &str) -> f64 {
        instability_of(&self.types, namespace)
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn instability_of(types: &BTreeMap<String, TypeRecord>, namespace: &str) -> f64 {
    let mut efferent = std::collections::BTreeSet::new();
    let mut afferent = std::collections::BTreeSet::new();

    for record in types.values().filter(|t| t.namespace == namespace) {
        efferent.extend(record.dependencies.iter().cloned());
        afferent.extend(record.dependents.iter().cloned());
    }

    let ce = efferent.len();
    let ca = afferent.len();
    if ce + ca == 0 {
        return 0.0;
    }

    let index = ce as f64 / (ce + ca) as f64;
    (index * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiLifetime, Member, MemberKind, TypeKind};

    fn record(name: &str, namespace: &str) -> TypeRecord {
        TypeRecord::new(name, namespace, format!("{name}.cs"), TypeKind::Class)
    }

    fn member(name: &str) -> Member {
        Member::new(name, MemberKind::Field)
    }

    #[test]
    fn test_partial_fragments_merge() {
        let mut session = AnalysisSession::new();

        let mut first = record("Big", "App");
        first.is_partial = true;
        first.members = vec![member("_a"), member("_b")];
        first.lines_of_code = 30;
        first.cyclomatic_complexity = 4;

        let mut second = record("Big", "App");
        second.file_path = "Big.Generated.cs".to_string();
        second.is_partial = true;
        second.members = vec![member("_c"), member("_d")];
        second.lines_of_code = 20;
        second.cyclomatic_complexity = 3;

        session.insert(first);
        session.insert(second);
        session.aggregate();

        assert_eq!(session.types().len(), 1);
        let merged = &session.types()["Big"];
        assert_eq!(merged.members.len(), 4);
        assert_eq!(merged.lines_of_code, 50);
        assert_eq!(merged.cyclomatic_complexity, 7);
        assert_eq!(merged.partial_paths.len(), 2);
        assert!(merged.partial_paths.contains(&"Big.Generated.cs".to_string()));
    }

    #[test]
    fn test_non_partial_same_name_replaces() {
        let mut session = AnalysisSession::new();
        session.insert(record("Order", "App"));
        let mut newer = record("Order", "App");
        newer.lines_of_code = 99;
        session.insert(newer);

        assert_eq!(session.types().len(), 1);
        assert_eq!(session.types()["Order"].lines_of_code, 99);
    }

    #[test]
    fn test_di_linking_creates_edges() {
        let mut session = AnalysisSession::new();
        let mut interface = record("IOrderRepository", "App.Data");
        interface.kind = TypeKind::Interface;
        session.insert(interface);
        session.insert(record("OrderRepository", "App.Data"));
        session.registrations.push(DiRegistration {
            interface_type: "IOrderRepository".to_string(),
            implementation_type: "OrderRepository".to_string(),
            lifetime: DiLifetime::Scoped,
            location: "Program.cs:10".to_string(),
        });

        session.aggregate();

        assert!(session.types()["OrderRepository"]
            .dependencies
            .contains("IOrderRepository"));
        assert!(session.types()["IOrderRepository"]
            .dependents
            .contains("OrderRepository"));
    }

    #[test]
    fn test_di_linking_skips_unknown_types() {
        let mut session = AnalysisSession::new();
        session.insert(record("OrderRepository", "App.Data"));
        session.registrations.push(DiRegistration {
            interface_type: "IMissing".to_string(),
            implementation_type: "OrderRepository".to_string(),
            lifetime: DiLifetime::Transient,
            location: "Program.cs:3".to_string(),
        });

        session.aggregate();

        assert!(session.types()["OrderRepository"].dependencies.is_empty());
    }

    #[test]
    fn test_instability_index() {
        let mut session = AnalysisSession::new();
        let mut unstable = record("Caller", "App.Web");
        unstable.dependencies.insert("Helper".to_string());
        session.insert(unstable);

        let mut stable = record("Core", "App.Domain");
        stable.dependents.insert("Caller".to_string());
        session.insert(stable);

        assert_eq!(session.instability("App.Web"), 1.0);
        assert_eq!(session.instability("App.Domain"), 0.0);
        assert_eq!(session.instability("App.Missing"), 0.0);
    }

    #[test]
    fn test_ingest_files_runs_extraction_and_di() {
        let files = vec![
            (
                "Orders/OrderRepository.cs".to_string(),
                "namespace App.Data;\n\npublic class OrderRepository\n{\n    private readonly DbContext _db;\n}\n"
                    .to_string(),
            ),
            (
                "Program.cs".to_string(),
                "services.AddScoped<IOrderRepository, OrderRepository>();\n".to_string(),
            ),
        ];

        let mut session = AnalysisSession::new();
        session.ingest_files(&files);
        session.aggregate();

        assert!(session.types().contains_key("OrderRepository"));
        assert_eq!(session.registrations().len(), 1);
    }
}
