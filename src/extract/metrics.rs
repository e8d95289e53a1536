//! Cohesion and complexity metrics over declaration text.

use crate::model::{Member, MemberKind};
use crate::scanner::{self, BraceMode, DEFAULT_SCAN_LIMIT};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static IF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bif\b").expect("if pattern"));
static ELSE_IF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\belse\s+if\b").expect("else if pattern"));
static WHILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bwhile\b").expect("while pattern"));
static FOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bfor\b").expect("for pattern"));
static FOREACH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bforeach\b").expect("foreach pattern"));
static CASE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bcase\b").expect("case pattern"));
static CATCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bcatch\b").expect("catch pattern"));

/// Lines that carry code: non-blank and not a whole-line comment.
pub(crate) fn lines_of_code(text: &str) -> usize {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("//")
        })
        .count()
}

/// Lack of Cohesion in Methods: the fraction of method-field access
/// opportunities not realized. 0.0 when there are no non-static methods or
/// no non-static fields (no evidence of poor cohesion). Records each
/// method's observed field accesses on the member as a side effect.
pub(crate) fn lack_of_cohesion(members: &mut [Member], text: &str) -> f64 {
    if text.trim().is_empty() {
        warn!("empty text in cohesion calculation");
        return 0.0;
    }
    if members.is_empty() {
        return 0.0;
    }

    let field_names: Vec<String> = members
        .iter()
        .filter(|m| {
            matches!(m.kind, MemberKind::Field | MemberKind::Property) && !m.is_static
        })
        .map(|m| m.name.clone())
        .collect();
    let method_count = members
        .iter()
        .filter(|m| m.kind == MemberKind::Method && !m.is_static)
        .count();

    if method_count == 0 || field_names.is_empty() {
        return 0.0;
    }

    let mut total_accesses = 0usize;
    for member in members
        .iter_mut()
        .filter(|m| m.kind == MemberKind::Method && !m.is_static)
    {
        let Some(region) = method_region(text, &member.name) else {
            continue;
        };
        for field in &field_names {
            if field_accessed(region, field) {
                total_accesses += 1;
                member.accessed_fields.insert(field.clone());
            }
        }
    }

    let max_accesses = method_count * field_names.len();
    let lcom = 1.0 - total_accesses as f64 / max_accesses as f64;
    (lcom * 1000.0).round() / 1000.0
}

/// Slice of `text` covering the named method's body, located by header
/// match plus brace scan.
fn method_region<'a>(text: &'a str, method_name: &str) -> Option<&'a str> {
    let pattern = format!(
        r"(?:public|private|protected|internal)?\s*(?:async\s+)?(?:Task<?)?\w+>?\s+{}\s*\(",
        regex::escape(method_name)
    );
    let re = Regex::new(&pattern).ok()?;
    let start = re.find(text)?.start();

    let scan = scanner::find_block_end(text, start, BraceMode::WaitForOpening, DEFAULT_SCAN_LIMIT);
    if !scan.is_closed() {
        warn!(
            method = method_name,
            reason = %scan.reason().unwrap_or_default(),
            "method body scan failed; using fallback region"
        );
    }
    Some(&text[start..scan.end.min(text.len())])
}

/// Whether a field (or its underscore-normalized name) is referenced in the
/// region as a whole word.
fn field_accessed(region: &str, field: &str) -> bool {
    let normalized = field.trim_start_matches('_');
    for name in [field, normalized] {
        if name.is_empty() {
            continue;
        }
        if let Ok(re) = Regex::new(&format!(r"\b{}\b", regex::escape(name))) {
            if re.is_match(region) {
                return true;
            }
        }
    }
    false
}

/// Decision-point count starting from a base of 1. Comments and literal
/// contents are stripped first so keywords inside them are not counted.
/// An `else if` counts once, as its own decision; `??` is never mistaken
/// for a ternary.
pub(crate) fn cyclomatic_complexity(text: &str) -> usize {
    let cleaned = strip_comments_and_strings(text);

    let if_total = IF_RE.find_iter(&cleaned).count();
    let else_ifs = ELSE_IF_RE.find_iter(&cleaned).count();
    let plain_ifs = if_total.saturating_sub(else_ifs);

    1 + plain_ifs
        + else_ifs
        + WHILE_RE.find_iter(&cleaned).count()
        + FOR_RE.find_iter(&cleaned).count()
        + FOREACH_RE.find_iter(&cleaned).count()
        + CASE_RE.find_iter(&cleaned).count()
        + CATCH_RE.find_iter(&cleaned).count()
        + cleaned.matches("&&").count()
        + cleaned.matches("||").count()
        + ternary_count(&cleaned)
}

/// Count `?` occurrences that are not part of a `??` null-coalescing pair.
fn ternary_count(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'?' {
            if i + 1 < bytes.len() && bytes[i + 1] == b'?' {
                i += 2;
                continue;
            }
            count += 1;
        }
        i += 1;
    }
    count
}

/// Remove comment text and string/char literal contents with a state
/// machine, preserving line structure for line comments.
pub(crate) fn strip_comments_and_strings(text: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str,
        VerbatimStr,
        Char,
    }

    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut state = State::Code;
    let mut i = 0;
    let length = bytes.len();

    while i < length {
        let c = bytes[i];
        let next = if i + 1 < length { bytes[i + 1] } else { 0 };

        match state {
            State::Code => {
                if c == b'/' && next == b'/' {
                    state = State::LineComment;
                    i += 2;
                } else if c == b'/' && next == b'*' {
                    state = State::BlockComment;
                    i += 2;
                } else if c == b'@' && next == b'"' {
                    state = State::VerbatimStr;
                    i += 2;
                } else if c == b'"' {
                    state = State::Str;
                    i += 1;
                } else if c == b'\'' {
                    state = State::Char;
                    i += 1;
                } else {
                    out.push(c);
                    i += 1;
                }
            }
            State::LineComment => {
                if c == b'\n' {
                    state = State::Code;
                    out.push(b'\n');
                }
                i += 1;
            }
            State::BlockComment => {
                if c == b'*' && next == b'/' {
                    state = State::Code;
                    i += 2;
                } else {
                    i += 1;
                }
            }
            State::Str => {
                if c == b'\\' && next != 0 {
                    i += 2;
                } else if c == b'"' {
                    state = State::Code;
                    i += 1;
                } else {
                    i += 1;
                }
            }
            State::VerbatimStr => {
                if c == b'"' {
                    if next == b'"' {
                        i += 2;
                    } else {
                        state = State::Code;
                        i += 1;
                    }
                } else {
                    i += 1;
                }
            }
            State::Char => {
                if c == b'\\' && next != 0 {
                    i += 2;
                } else if c == b'\'' {
                    state = State::Code;
                    i += 1;
                } else {
                    i += 1;
                }
            }
        }
    }

    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Member;

    fn field(name: &str) -> Member {
        Member::new(name, MemberKind::Field)
    }

    fn method(name: &str) -> Member {
        Member::new(name, MemberKind::Method)
    }

    #[test]
    fn test_complexity_of_straight_line_code_is_one() {
        let text = "public int Add(int a, int b)\n{\n    return a + b;\n}\n";
        assert_eq!(cyclomatic_complexity(text), 1);
    }

    #[test]
    fn test_complexity_counts_each_decision_once() {
        // One if/else-if pair, one &&, one for: 1 + 1 + 1 + 1 + 1.
        let text = r#"
public void Run(int a, int b)
{
    if (a > 0 && b > 0)
    {
        Work();
    }
    else if (a < 0)
    {
        Other();
    }
    for (int i = 0; i < a; i++)
    {
        Step(i);
    }
}
"#;
        assert_eq!(cyclomatic_complexity(text), 5);
    }

    #[test]
    fn test_complexity_ignores_keywords_in_strings_and_comments() {
        let text = r#"
public void Log()
{
    // if this happens, catch it
    var msg = "if (x) { while (true) }";
    Emit(msg);
}
"#;
        assert_eq!(cyclomatic_complexity(text), 1);
    }

    #[test]
    fn test_null_coalescing_is_not_a_ternary() {
        let text = "var x = a ?? b;\n";
        assert_eq!(cyclomatic_complexity(text), 1);
        let ternary = "var y = flag ? a : b;\n";
        assert_eq!(cyclomatic_complexity(ternary), 2);
    }

    #[test]
    fn test_lcom_zero_without_methods_or_fields() {
        let mut only_fields = vec![field("_a"), field("_b")];
        assert_eq!(lack_of_cohesion(&mut only_fields, "private int _a;"), 0.0);

        let mut only_methods = vec![method("Run")];
        assert_eq!(
            lack_of_cohesion(&mut only_methods, "public void Run() { }"),
            0.0
        );
    }

    #[test]
    fn test_lcom_full_access_is_zero() {
        let text = r#"
    private int _a;
    public void Use()
    {
        Emit(_a);
    }
"#;
        let mut members = vec![field("_a"), method("Use")];
        let lcom = lack_of_cohesion(&mut members, text);
        assert_eq!(lcom, 0.0);
        assert!(members
            .iter()
            .find(|m| m.name == "Use")
            .unwrap()
            .accessed_fields
            .contains("_a"));
    }

    #[test]
    fn test_lcom_no_access_is_one() {
        let text = r#"
    private int _a;
    public void Idle()
    {
        Emit(42);
    }
"#;
        let mut members = vec![field("_a"), method("Idle")];
        assert_eq!(lack_of_cohesion(&mut members, text), 1.0);
    }

    #[test]
    fn test_lcom_half_access() {
        let text = r#"
    private int _a;
    private int _b;
    public void UseA()
    {
        Emit(_a);
    }
    public void UseB()
    {
        Emit(_b);
    }
"#;
        let mut members = vec![field("_a"), field("_b"), method("UseA"), method("UseB")];
        // 2 hits out of 2 methods x 2 fields.
        assert_eq!(lack_of_cohesion(&mut members, text), 0.5);
    }

    #[test]
    fn test_lcom_invariant_under_member_order() {
        let text = r#"
    private int _a;
    private int _b;
    public void UseA()
    {
        Emit(_a);
    }
    public void UseB()
    {
        Emit(_b);
    }
"#;
        let mut forward = vec![field("_a"), field("_b"), method("UseA"), method("UseB")];
        let mut reversed = vec![method("UseB"), method("UseA"), field("_b"), field("_a")];
        assert_eq!(
            lack_of_cohesion(&mut forward, text),
            lack_of_cohesion(&mut reversed, text)
        );
    }

    #[test]
    fn test_static_members_excluded_from_lcom() {
        let text = r#"
    private static int _shared;
    public void Run()
    {
        Emit(_shared);
    }
"#;
        let mut shared = field("_shared");
        shared.is_static = true;
        let mut members = vec![shared, method("Run")];
        assert_eq!(lack_of_cohesion(&mut members, text), 0.0);
    }

    #[test]
    fn test_strip_removes_literal_contents() {
        let stripped = strip_comments_and_strings("var s = \"if (x)\"; // catch\nnext");
        assert!(!stripped.contains("if (x)"));
        assert!(!stripped.contains("catch"));
        assert!(stripped.contains("next"));
    }

    #[test]
    fn test_loc_skips_blanks_and_comments() {
        let text = "int a;\n\n// comment\nint b;\n";
        assert_eq!(lines_of_code(text), 2);
    }
}
