use super::{score, typed_match, DesignPattern, PatternMatch, PatternThresholds};
use regex::Regex;
use std::sync::LazyLock;

const DECORATOR_INDICATORS: usize = 3;
const ADAPTER_INDICATORS: usize = 3;
const FACADE_INDICATORS: usize = 2;
const PROXY_INDICATORS: usize = 2;

static DELEGATING_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:public|protected)\s+\w+\s+\w+\s*\([^)]*\)\s*\{[^}]*\w+\.\w+\(")
        .expect("delegating method pattern")
});
static MULTIPLE_INTERFACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*\w+\s*,\s*\w+").expect("interface list pattern"));
static WRAPPED_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"private\s+(?:readonly\s+)?\w+\s+\w+;").expect("wrapped field pattern")
});
static SIMPLE_PUBLIC_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+(?:async\s+)?(?:Task<)?[\w\[\]]+\s+\w+\s*\([^)]*\)\s*\{[^}]{0,100}?\}")
        .expect("simple method pattern")
});
static SAME_INTERFACE_WRAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)private\s+(?:readonly\s+)?I\w+\s+\w+;.*public\s+class\s+\w+\s*:\s*I\w+")
        .expect("same interface pattern")
});
static ACCESS_CONTROL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)if\s*\([^)]*\w+\s*==\s*null\)|lock\s*\(|IsAuthorized|Permission")
        .expect("access control pattern")
});

pub(super) fn detect_decorator(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if typed_match(
        format!(
            r"(?s)private\s+(?:readonly\s+)?I\w+\s+\w+;.*public\s+class\s+{}",
            regex::escape(type_name)
        ),
        code,
    ) {
        indicators.push("Wraps interface type".to_string());
    }
    if DELEGATING_METHOD.is_match(code) {
        indicators.push("Delegates to wrapped object".to_string());
    }
    if typed_match(
        format!(r"public\s+{}\s*\(\s*I\w+\s+", regex::escape(type_name)),
        code,
    ) {
        indicators.push("Takes interface in constructor".to_string());
    }

    score(
        DesignPattern::Decorator,
        indicators,
        DECORATOR_INDICATORS,
        thresholds.medium,
        type_name,
    )
}

pub(super) fn detect_adapter(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if MULTIPLE_INTERFACES.is_match(code) {
        indicators.push("Implements multiple interfaces".to_string());
    }
    if WRAPPED_FIELD.is_match(code) {
        indicators.push("Wraps incompatible type".to_string());
    }
    if type_name.contains("Adapter") || type_name.contains("Wrapper") {
        indicators.push("Adapter/Wrapper in name".to_string());
    }

    score(
        DesignPattern::Adapter,
        indicators,
        ADAPTER_INDICATORS,
        thresholds.low,
        type_name,
    )
}

pub(super) fn detect_facade(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    let private_deps = WRAPPED_FIELD.find_iter(code).count();
    if private_deps >= 3 {
        indicators.push(format!("Multiple dependencies ({private_deps})"));
    }
    let simple_methods = SIMPLE_PUBLIC_METHOD.find_iter(code).count();
    if simple_methods >= 2 {
        indicators.push("Simple public interface".to_string());
    }

    score(
        DesignPattern::Facade,
        indicators,
        FACADE_INDICATORS,
        thresholds.high,
        type_name,
    )
}

pub(super) fn detect_proxy(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if SAME_INTERFACE_WRAP.is_match(code) {
        indicators.push("Implements same interface as wrapped object".to_string());
    }
    if ACCESS_CONTROL.is_match(code) {
        indicators.push("Access control or lazy loading".to_string());
    }

    score(
        DesignPattern::Proxy,
        indicators,
        PROXY_INDICATORS,
        thresholds.medium,
        type_name,
    )
}
