use super::{score, DesignPattern, PatternMatch, PatternThresholds};
use regex::Regex;
use std::sync::LazyLock;

const OBSERVER_INDICATORS: usize = 3;
const STRATEGY_INDICATORS: usize = 3;
const COMMAND_INDICATORS: usize = 3;
const CHAIN_INDICATORS: usize = 3;
const STATE_INDICATORS: usize = 3;

static EVENT_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"event\s+\w+\s+\w+;|EventHandler\s+\w+").expect("event definition pattern")
});
static EVENT_RAISING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+\?\.Invoke\(|OnChanged\(|RaiseEvent\(|PropertyChanged\?\.Invoke\(")
        .expect("event raising pattern")
});
static OBSERVER_INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"IObserver|IObservable|INotifyPropertyChanged").expect("observer interface pattern")
});
static STRATEGY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"private\s+(?:readonly\s+)?I\w+Strategy\s+").expect("strategy field pattern")
});
static STRATEGY_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+Strategy\.\w+\(|\w+\.Execute\(").expect("strategy call pattern")
});
static STRATEGY_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Strategy\s*=|SetStrategy|ChangeStrategy").expect("strategy assignment pattern")
});
static EXECUTE_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+(?:async\s+)?(?:Task<)?[\w\[\]]*\s+Execute\s*\(")
        .expect("execute method pattern")
});
static UNDO_REDO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:public|protected)\s+(?:async\s+)?(?:Task<)?[\w\[\]]*\s+Undo\s*\(|Redo\s*\(")
        .expect("undo redo pattern")
});
static COMMAND_QUEUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Queue.*Command|List.*Command|command.*history").expect("command queue pattern")
});
static NEXT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"private\s+(?:readonly\s+)?\w+\s+\w*[Nn]ext|_successor|_next")
        .expect("next handler pattern")
});
static HANDLE_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+(?:abstract\s+)?(?:async\s+)?(?:Task<)?[\w\[\]]*\s+Handle\s*\(")
        .expect("handle method pattern")
});
static CALL_NEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+[Nn]ext\.\w+\(|\w+_successor\.\w+\(").expect("call next pattern")
});
static STATE_INTERFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"IState|I\w+State\s+").expect("state interface pattern"));
static STATE_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_state\s*=|CurrentState\s*=|SetState\(").expect("state assignment pattern")
});
static STATE_DELEGATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_state\.\w+\(|CurrentState\.\w+\(").expect("state delegation pattern")
});

pub(super) fn detect_observer(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if EVENT_DEFINITION.is_match(code) {
        indicators.push("Event definition".to_string());
    }
    if EVENT_RAISING.is_match(code) {
        indicators.push("Event raising".to_string());
    }
    if OBSERVER_INTERFACE.is_match(code) {
        indicators.push("Standard observer interface".to_string());
    }

    score(
        DesignPattern::Observer,
        indicators,
        OBSERVER_INDICATORS,
        thresholds.medium,
        type_name,
    )
}

pub(super) fn detect_strategy(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if STRATEGY_FIELD.is_match(code) {
        indicators.push("Strategy interface".to_string());
    }
    if STRATEGY_CALL.is_match(code) {
        indicators.push("Executes strategy".to_string());
    }
    if STRATEGY_ASSIGNMENT.is_match(code) {
        indicators.push("Strategy assignment".to_string());
    }

    score(
        DesignPattern::Strategy,
        indicators,
        STRATEGY_INDICATORS,
        thresholds.medium,
        type_name,
    )
}

pub(super) fn detect_command(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if EXECUTE_METHOD.is_match(code) {
        indicators.push("Execute method".to_string());
    }
    if UNDO_REDO.is_match(code) {
        indicators.push("Undo/Redo support".to_string());
    }
    if COMMAND_QUEUE.is_match(code) {
        indicators.push("Command queue/history".to_string());
    }

    score(
        DesignPattern::Command,
        indicators,
        COMMAND_INDICATORS,
        thresholds.medium,
        type_name,
    )
}

pub(super) fn detect_chain_of_responsibility(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if NEXT_HANDLER.is_match(code) {
        indicators.push("Next handler reference".to_string());
    }
    if HANDLE_METHOD.is_match(code) {
        indicators.push("Handle method".to_string());
    }
    if CALL_NEXT.is_match(code) {
        indicators.push("Delegates to next handler".to_string());
    }

    score(
        DesignPattern::ChainOfResponsibility,
        indicators,
        CHAIN_INDICATORS,
        thresholds.medium,
        type_name,
    )
}

pub(super) fn detect_state(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if STATE_INTERFACE.is_match(code) {
        indicators.push("State interface".to_string());
    }
    if STATE_ASSIGNMENT.is_match(code) {
        indicators.push("State assignment".to_string());
    }
    if STATE_DELEGATION.is_match(code) {
        indicators.push("Delegates to state".to_string());
    }

    score(
        DesignPattern::State,
        indicators,
        STATE_INDICATORS,
        thresholds.medium,
        type_name,
    )
}
