use super::{score, typed_match, DesignPattern, PatternMatch, PatternThresholds};
use regex::Regex;
use std::sync::LazyLock;

const SINGLETON_INDICATORS: usize = 3;
const FACTORY_INDICATORS: usize = 3;
const BUILDER_INDICATORS: usize = 3;

static STATIC_INSTANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"static\s+(?:readonly\s+)?.*\s+Instance").expect("static instance pattern")
});
static CREATE_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+static\s+(?:abstract\s+)?(?:new\s+)?(\w+)\s+Create")
        .expect("create method pattern")
});
static RETURNS_INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"I\w+\s+Create|I\w+\s+Make|I\w+\s+Build").expect("interface return pattern")
});
static SWITCH_ON_KIND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)switch\s*\(.*type.*\)|switch\s*\(.*kind.*\)").expect("switch pattern")
});
static WITH_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"public\s+\w+\s+With\w+\s*\(").expect("with method pattern"));
static BUILD_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"public\s+\w+\s+Build\s*\(\s*\)").expect("build method pattern"));
static RETURN_THIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"return\s+this;").expect("return this pattern"));

pub(super) fn detect_singleton(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if STATIC_INSTANCE.is_match(code) {
        indicators.push("Static Instance property".to_string());
    }
    if typed_match(
        format!(r"private\s+{}\s*\(", regex::escape(type_name)),
        code,
    ) {
        indicators.push("Private constructor".to_string());
    }
    if typed_match(
        format!(
            r"public\s+static\s+{}\s+(?:Instance|Current|Default)",
            regex::escape(type_name)
        ),
        code,
    ) {
        indicators.push("Public static property".to_string());
    }

    score(
        DesignPattern::Singleton,
        indicators,
        SINGLETON_INDICATORS,
        thresholds.high,
        type_name,
    )
}

pub(super) fn detect_factory(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if CREATE_METHOD.is_match(code) {
        indicators.push("Static Create method".to_string());
    }
    if RETURNS_INTERFACE.is_match(code) {
        indicators.push("Returns interface type".to_string());
    }
    if SWITCH_ON_KIND.is_match(code) {
        indicators.push("Switch on type/kind".to_string());
    }

    score(
        DesignPattern::Factory,
        indicators,
        FACTORY_INDICATORS,
        thresholds.medium,
        type_name,
    )
}

pub(super) fn detect_builder(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if WITH_METHOD.is_match(code) {
        indicators.push("With* fluent methods".to_string());
    }
    if BUILD_METHOD.is_match(code) {
        indicators.push("Build method".to_string());
    }
    if RETURN_THIS.is_match(code) {
        indicators.push("Returns this for chaining".to_string());
    }

    score(
        DesignPattern::Builder,
        indicators,
        BUILDER_INDICATORS,
        thresholds.high,
        type_name,
    )
}
