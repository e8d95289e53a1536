use crate::model::AsyncFinding;
use regex::Regex;
use std::sync::LazyLock;

/// Blocking-call anti-patterns, each with a fixed diagnostic.
static BLOCKING_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (
            r"\.Result\b",
            "Using .Result blocks the thread (async-over-sync)",
        ),
        (
            r"\.Wait\(\)",
            "Using .Wait() blocks the thread (async-over-sync)",
        ),
        (
            r"\.GetAwaiter\(\)\.GetResult\(\)",
            "Using GetResult() blocks the thread",
        ),
        (
            r"Task\.Run\([^)]*\)\.Wait\(\)",
            "Task.Run().Wait() is async-over-sync anti-pattern",
        ),
        (
            r"Task\.WaitAll\(",
            "Task.WaitAll() blocks the thread, prefer await Task.WhenAll()",
        ),
        (
            r"Task\.WaitAny\(",
            "Task.WaitAny() blocks the thread, prefer await Task.WhenAny()",
        ),
    ]
    .into_iter()
    .map(|(pattern, message)| (Regex::new(pattern).expect("blocking pattern"), message))
    .collect()
});

static PUBLIC_ASYNC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:public|internal)\s+async").expect("public async pattern"));
static ASYNC_VOID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"async\s+void\s+\w+\s*\([^)]*\)").expect("async void pattern"));
static ASYNC_TASK_PARAMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"async\s+Task[^(]*\(([^)]*)").expect("async task params pattern"));

/// Line-by-line scan for blocking calls on async results, plus
/// best-practice warnings on public/internal async method declarations.
pub(crate) fn scan_async_safety(text: &str) -> Vec<AsyncFinding> {
    let mut findings = Vec::new();

    for (line_number, line) in text.lines().enumerate() {
        let line_number = line_number + 1;

        for (pattern, message) in BLOCKING_PATTERNS.iter() {
            if pattern.is_match(line) {
                findings.push(AsyncFinding {
                    line: line_number,
                    message: (*message).to_string(),
                });
            }
        }

        if PUBLIC_ASYNC_RE.is_match(line) {
            if ASYNC_VOID_RE.is_match(line) {
                findings.push(AsyncFinding {
                    line: line_number,
                    message: "Best practice: async void should only be used for event handlers"
                        .to_string(),
                });
            }

            if let Some(caps) = ASYNC_TASK_PARAMS_RE.captures(line) {
                if !caps[1].contains("CancellationToken") {
                    findings.push(AsyncFinding {
                        line: line_number,
                        message:
                            "Best practice: Async method should accept CancellationToken parameter"
                                .to_string(),
                    });
                }
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_and_wait_flagged() {
        let text = "var x = task.Result;\ntask.Wait();\n";
        let findings = scan_async_safety(text);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].line, 1);
        assert!(findings[0].message.contains(".Result"));
        assert_eq!(findings[1].line, 2);
        assert!(findings[1].message.contains(".Wait()"));
    }

    #[test]
    fn test_wait_all_and_get_awaiter_flagged() {
        let text = "Task.WaitAll(tasks);\nvar r = t.GetAwaiter().GetResult();\n";
        let findings = scan_async_safety(text);
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_missing_cancellation_token_warned() {
        let text = "public async Task<Order> Load(int id)\n";
        let findings = scan_async_safety(text);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("CancellationToken"));
    }

    #[test]
    fn test_cancellation_token_present_is_clean() {
        let text = "public async Task<Order> Load(int id, CancellationToken ct)\n";
        assert!(scan_async_safety(text).is_empty());
    }

    #[test]
    fn test_async_void_warned_for_public_methods_only() {
        let public = "public async void Fire(object sender)\n";
        let findings = scan_async_safety(public);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("async void"));

        let private = "private async void Fire(object sender)\n";
        assert!(scan_async_safety(private).is_empty());
    }

    #[test]
    fn test_clean_async_code() {
        let text = "public async Task Run(CancellationToken ct)\n{\n    await Step(ct);\n}\n";
        assert!(scan_async_safety(text).is_empty());
    }
}
