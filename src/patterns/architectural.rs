use super::{score, DesignPattern, PatternMatch, PatternThresholds};
use regex::Regex;
use std::sync::LazyLock;

const REPOSITORY_INDICATORS: usize = 3;
const UNIT_OF_WORK_INDICATORS: usize = 3;
const CQRS_INDICATORS: usize = 3;
const EVENT_SOURCING_INDICATORS: usize = 3;
const PUBSUB_INDICATORS: usize = 3;

static CRUD_METHODS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+.*Get\w+\s*\(|FindBy\w+\s*\(|Add\s*\(|Remove\s*\(|Update\s*\(")
        .expect("crud methods pattern")
});
static DATA_ACCESS_TYPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"IRepository|IDataAccess|DbContext|DbSet").expect("data access pattern")
});
static MULTIPLE_REPOSITORIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)I\w+Repository\s+\w+;.*I\w+Repository\s+\w+;")
        .expect("multiple repositories pattern")
});
static COMMIT_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+(?:async\s+)?(?:Task<)?[\w\[\]]*\s+(?:SaveChanges|Commit|Complete)\s*\(")
        .expect("commit method pattern")
});
static TRANSACTION_HANDLING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"using\s*\(.*Transaction|BeginTransaction|RollbackAsync")
        .expect("transaction pattern")
});
static COMMAND_QUERY_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ICommand|IQuery|Command\s+class|Query\s+class").expect("command query pattern")
});
static HANDLER_INTERFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ICommandHandler|IQueryHandler|Handle\s*\(").expect("handler interface pattern")
});
static EVENT_STORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"EventStore|AppendEvent|GetEvents|EventStream").expect("event store pattern")
});
static EVENT_CLASSES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"class\s+\w+Event|: Event|DomainEvent").expect("event classes pattern")
});
static EVENT_REPLAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Replay|Rebuild|Reconstruct").expect("event replay pattern"));
static PUBSUB_INTERFACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"IPublisher|ISubscriber|Subscribe|Publish").expect("pubsub interfaces pattern")
});
static EVENT_BROKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"EventBroker|MessageBroker|EventBus").expect("event broker pattern")
});
static ASYNC_EVENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"async\s+Task.*Event|await.*Event").expect("async events pattern")
});

pub(super) fn detect_repository(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if CRUD_METHODS.is_match(code) {
        indicators.push("CRUD methods".to_string());
    }
    if DATA_ACCESS_TYPES.is_match(code) {
        indicators.push("Data access pattern".to_string());
    }
    if type_name.contains("Repository") || type_name.contains("DAO") {
        indicators.push("Repository/DAO in name".to_string());
    }

    score(
        DesignPattern::Repository,
        indicators,
        REPOSITORY_INDICATORS,
        thresholds.high,
        type_name,
    )
}

pub(super) fn detect_unit_of_work(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if MULTIPLE_REPOSITORIES.is_match(code) {
        indicators.push("Multiple repositories".to_string());
    }
    if COMMIT_METHOD.is_match(code) {
        indicators.push("SaveChanges/Commit method".to_string());
    }
    if TRANSACTION_HANDLING.is_match(code) {
        indicators.push("Transaction handling".to_string());
    }

    score(
        DesignPattern::UnitOfWork,
        indicators,
        UNIT_OF_WORK_INDICATORS,
        thresholds.medium,
        type_name,
    )
}

pub(super) fn detect_cqrs(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if COMMAND_QUERY_SPLIT.is_match(code) {
        indicators.push("Command/Query separation".to_string());
    }
    if HANDLER_INTERFACE.is_match(code) {
        indicators.push("Handler interface".to_string());
    }
    if type_name.contains("Command") && type_name.contains("Query") {
        indicators.push("CQRS in name".to_string());
    }

    score(
        DesignPattern::Cqrs,
        indicators,
        CQRS_INDICATORS,
        thresholds.low,
        type_name,
    )
}

pub(super) fn detect_event_sourcing(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if EVENT_STORE.is_match(code) {
        indicators.push("Event store".to_string());
    }
    if EVENT_CLASSES.is_match(code) {
        indicators.push("Event classes".to_string());
    }
    if EVENT_REPLAY.is_match(code) {
        indicators.push("Event replay".to_string());
    }

    score(
        DesignPattern::EventSourcing,
        indicators,
        EVENT_SOURCING_INDICATORS,
        thresholds.medium,
        type_name,
    )
}

pub(super) fn detect_pubsub(
    code: &str,
    type_name: &str,
    thresholds: &PatternThresholds,
) -> Option<PatternMatch> {
    let mut indicators = Vec::new();

    if PUBSUB_INTERFACES.is_match(code) {
        indicators.push("Pub/Sub interfaces".to_string());
    }
    if EVENT_BROKER.is_match(code) {
        indicators.push("Event broker".to_string());
    }
    if ASYNC_EVENTS.is_match(code) {
        indicators.push("Async event handling".to_string());
    }

    score(
        DesignPattern::PubSub,
        indicators,
        PUBSUB_INDICATORS,
        thresholds.low,
        type_name,
    )
}
