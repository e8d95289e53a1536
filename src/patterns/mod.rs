//! Design-pattern detection over C# source text.
//!
//! Every detector is a pure function of the source slice and type name:
//! a fixed list of textual indicators is checked independently, and the
//! pattern is reported when enough of them are present. Confidence is the
//! fraction of indicators found, so it never decreases when an indicator
//! is added. Safe to call concurrently across types.

mod architectural;
mod behavioral;
mod creational;
mod structural;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Catalogue of recognized design patterns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DesignPattern {
    Singleton,
    Factory,
    Builder,
    Decorator,
    Adapter,
    Facade,
    Proxy,
    Observer,
    Strategy,
    Command,
    ChainOfResponsibility,
    State,
    Repository,
    UnitOfWork,
    Cqrs,
    EventSourcing,
    PubSub,
}

impl DesignPattern {
    pub fn name(&self) -> &'static str {
        match self {
            DesignPattern::Singleton => "Singleton",
            DesignPattern::Factory => "Factory",
            DesignPattern::Builder => "Builder",
            DesignPattern::Decorator => "Decorator",
            DesignPattern::Adapter => "Adapter",
            DesignPattern::Facade => "Facade",
            DesignPattern::Proxy => "Proxy",
            DesignPattern::Observer => "Observer",
            DesignPattern::Strategy => "Strategy",
            DesignPattern::Command => "Command",
            DesignPattern::ChainOfResponsibility => "Chain of Responsibility",
            DesignPattern::State => "State",
            DesignPattern::Repository => "Repository",
            DesignPattern::UnitOfWork => "Unit of Work",
            DesignPattern::Cqrs => "CQRS",
            DesignPattern::EventSourcing => "Event Sourcing",
            DesignPattern::PubSub => "Pub/Sub",
        }
    }
}

/// A detected pattern with its supporting evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern: DesignPattern,
    /// Fraction of the pattern's indicators found, in [0.0, 1.0].
    pub confidence: f64,
    pub indicators: Vec<String>,
    pub description: String,
}

/// Confidence tiers shared across patterns of similar reliability.
/// Empirically chosen defaults; tunable rather than load-bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for PatternThresholds {
    fn default() -> Self {
        Self {
            high: 0.6,
            medium: 0.5,
            low: 0.4,
        }
    }
}

/// Detect design patterns in a declaration's source text, sorted by
/// descending confidence.
pub fn detect_patterns(code: &str, type_name: &str) -> Vec<PatternMatch> {
    detect_patterns_with(code, type_name, &PatternThresholds::default())
}

pub fn detect_patterns_with(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Vec<PatternMatch> {
    let mut matches = Vec::new();

    matches.extend(creational::detect_singleton(code, type_name, thresholds));
    matches.extend(creational::detect_factory(code, type_name, thresholds));
    matches.extend(creational::detect_builder(code, type_name, thresholds));

    matches.extend(structural::detect_decorator(code, type_name, thresholds));
    matches.extend(structural::detect_adapter(code, type_name, thresholds));
    matches.extend(structural::detect_facade(code, type_name, thresholds));
    matches.extend(structural::detect_proxy(code, type_name, thresholds));

    matches.extend(behavioral::detect_observer(code, type_name, thresholds));
    matches.extend(behavioral::detect_strategy(code, type_name, thresholds));
    matches.extend(behavioral::detect_command(code, type_name, thresholds));
    matches.extend(behavioral::detect_chain_of_responsibility(
        code, type_name, thresholds,
    ));
    matches.extend(behavioral::detect_state(code, type_name, thresholds));

    matches.extend(architectural::detect_repository(code, type_name, thresholds));
    matches.extend(architectural::detect_unit_of_work(code, type_name, thresholds));
    matches.extend(architectural::detect_cqrs(code, type_name, thresholds));
    matches.extend(architectural::detect_event_sourcing(code, type_name, thresholds));
    matches.extend(architectural::detect_pubsub(code, type_name, thresholds));

    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    matches
}

/// Build a match when the indicator count clears the pattern's threshold.
fn score(
    pattern: DesignPattern,
    indicators: Vec<String>,
    max_indicators: usize,
    threshold: f64,
    type_name: &str,
) -> Option<PatternMatch> {
    if indicators.is_empty() {
        return None;
    }

    let confidence = indicators.len() as f64 / max_indicators as f64;
    if confidence < threshold {
        return None;
    }

    Some(PatternMatch {
        pattern,
        confidence,
        indicators,
        description: format!("{} pattern detected in {}", pattern.name(), type_name),
    })
}

/// Match a pattern that embeds the (escaped) type name, built per call.
fn typed_match(pattern: String, code: &str) -> bool {
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(code),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLETON_SOURCE: &str = r#"
public class Config
{
    private static readonly Config _instance = new Config();
    private Config() { }
    public static Config Instance => _instance;
}
"#;

    #[test]
    fn test_singleton_full_confidence() {
        let matches = detect_patterns(SINGLETON_SOURCE, "Config");
        let singleton = matches
            .iter()
            .find(|m| m.pattern == DesignPattern::Singleton)
            .expect("singleton should be detected");
        assert!((singleton.confidence - 1.0).abs() < f64::EPSILON);
        assert_eq!(singleton.indicators.len(), 3);
    }

    #[test]
    fn test_confidence_monotonic_in_indicators() {
        // Two indicators: static Instance member and private constructor.
        let partial = r#"
public class Config
{
    private static readonly Config Instance = new Config();
    private Config() { }
}
"#;
        let low = detect_patterns(partial, "Config")
            .into_iter()
            .find(|m| m.pattern == DesignPattern::Singleton)
            .map(|m| m.confidence)
            .unwrap_or(0.0);
        let high = detect_patterns(SINGLETON_SOURCE, "Config")
            .into_iter()
            .find(|m| m.pattern == DesignPattern::Singleton)
            .map(|m| m.confidence)
            .unwrap_or(0.0);
        assert!(high >= low);
    }

    #[test]
    fn test_below_threshold_not_reported() {
        // A single builder indicator (1/3 = 0.33 < 0.6) must not report.
        let code = "public Widget Build() { return _w; }";
        let matches = detect_patterns(code, "Widget");
        assert!(
            !matches.iter().any(|m| m.pattern == DesignPattern::Builder),
            "one indicator should stay below the builder threshold"
        );
    }

    #[test]
    fn test_builder_detected() {
        let code = r#"
public class RequestBuilder
{
    public RequestBuilder WithHeader(string h) { _h = h; return this; }
    public RequestBuilder WithBody(string b) { _b = b; return this; }
    public Request Build() { return new Request(_h, _b); }
}
"#;
        let matches = detect_patterns(code, "RequestBuilder");
        let builder = matches
            .iter()
            .find(|m| m.pattern == DesignPattern::Builder)
            .expect("builder should be detected");
        assert!((builder.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_results_sorted_by_confidence() {
        let code = r#"
public class OrderRepository
{
    private static readonly OrderRepository _instance = new OrderRepository();
    private OrderRepository() { }
    public static OrderRepository Instance => _instance;
    public Order GetById(int id) { return _db.Find(id); }
    private DbContext _db;
}
"#;
        let matches = detect_patterns(code, "OrderRepository");
        assert!(matches.len() >= 2);
        for pair in matches.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_empty_source_detects_nothing() {
        assert!(detect_patterns("", "Empty").is_empty());
    }
}
