pub mod audit;
pub mod config;
pub mod extract;
pub mod model;
pub mod patterns;
pub mod scanner;
pub mod session;

pub use audit::{audit, AuditEngine, AuditMetrics, AuditResult, RuleError};
pub use config::{Config, ConfigError};
pub use extract::{extract, HeuristicExtractor, TypeExtractor};
pub use model::{
    Annotation, AsyncFinding, AuditRule, DiLifetime, DiRegistration, Member, MemberKind, Role,
    Severity, TypeKind, TypeRecord, Violation,
};
pub use patterns::{detect_patterns, DesignPattern, PatternMatch, PatternThresholds};
pub use scanner::{find_block_end, find_block_end_in_lines, BlockScan, BraceMode, ScanStatus};
pub use session::AnalysisSession;
