//! Brace-block scanning over C# source text.
//!
//! Locates the closing `}` of a brace-delimited block while skipping
//! comments, string literals (regular and verbatim), and char literals.
//! Scanning always produces a usable end position: malformed input degrades
//! to a bounded fallback offset instead of an error.

/// Default safety ceiling on scan iterations.
pub const DEFAULT_SCAN_LIMIT: usize = 500_000;

/// Lookahead window used as the fallback end position when no closing
/// brace is found in character-indexed input.
const FALLBACK_WINDOW: usize = 5_000;

/// When to start counting braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceMode {
    /// Count from the first brace encountered.
    Immediate,
    /// Skip arbitrary text until the first `{`, then count.
    WaitForOpening,
}

/// How a scan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    /// The matching closing brace was found.
    Closed,
    /// The iteration ceiling was hit before the block closed.
    IterationLimit(usize),
    /// Input ended before the block closed.
    EndOfInput,
}

/// Result of a block scan. `end` is a byte offset one past the closing
/// brace for character-indexed input, or a line index for line-indexed
/// input. On failure it holds the bounded fallback position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockScan {
    pub end: usize,
    pub status: ScanStatus,
}

impl BlockScan {
    pub fn is_closed(&self) -> bool {
        self.status == ScanStatus::Closed
    }

    /// Human-readable failure reason, `None` on success.
    pub fn reason(&self) -> Option<String> {
        match &self.status {
            ScanStatus::Closed => None,
            ScanStatus::IterationLimit(limit) => {
                Some(format!("exceeded max iterations ({limit})"))
            }
            ScanStatus::EndOfInput => {
                Some("end of input reached without finding closing brace".to_string())
            }
        }
    }
}

/// Find the end of a brace-delimited block starting at byte offset `start`.
///
/// Braces inside `//` and `/* */` comments, `"..."` and `@"..."` strings,
/// and `'...'` char literals are ignored. In a verbatim string a doubled
/// quote is an escaped quote; in a regular string a preceding backslash
/// escapes the quote.
pub fn find_block_end(
    content: &str,
    start: usize,
    mode: BraceMode,
    max_iterations: usize,
) -> BlockScan {
    let bytes = content.as_bytes();
    let length = bytes.len();
    let mut depth: i64 = 0;
    let mut counting = mode == BraceMode::Immediate;
    let mut i = start;
    let mut iterations = 0usize;

    while i < length && iterations < max_iterations {
        iterations += 1;
        let c = bytes[i];
        let next = if i + 1 < length { bytes[i + 1] } else { 0 };

        // Single-line comment
        if c == b'/' && next == b'/' {
            while i < length && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        // Block comment
        if c == b'/' && next == b'*' {
            i += 2;
            while i + 1 < length {
                if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                    i += 2;
                    break;
                }
                i += 1;
            }
            continue;
        }

        // String literal (regular or verbatim)
        if c == b'"' {
            let verbatim = i > 0 && bytes[i - 1] == b'@';
            i += 1;
            while i < length {
                if bytes[i] == b'"' {
                    // Verbatim: "" is an escaped quote
                    if verbatim && i + 1 < length && bytes[i + 1] == b'"' {
                        i += 2;
                        continue;
                    }
                    // Regular: \" is an escaped quote
                    if !verbatim && bytes[i - 1] == b'\\' {
                        i += 1;
                        continue;
                    }
                    i += 1;
                    break;
                }
                i += 1;
            }
            continue;
        }

        // Char literal
        if c == b'\'' {
            i += 1;
            while i < length {
                if bytes[i] == b'\'' && bytes[i - 1] != b'\\' {
                    i += 1;
                    break;
                }
                i += 1;
            }
            continue;
        }

        if c == b'{' {
            if mode == BraceMode::WaitForOpening {
                counting = true;
            }
            depth += 1;
        } else if c == b'}' {
            depth -= 1;
            if counting && depth == 0 {
                return BlockScan {
                    end: i + 1,
                    status: ScanStatus::Closed,
                };
            }
        }

        i += 1;
    }

    let fallback = clamp_boundary(content, (start + FALLBACK_WINDOW).min(length));
    let status = if iterations >= max_iterations {
        ScanStatus::IterationLimit(max_iterations)
    } else {
        ScanStatus::EndOfInput
    };
    BlockScan {
        end: fallback,
        status,
    }
}

/// Line-indexed variant: `start_line` names the line to scan from, and a
/// successful result carries the line index of the closing brace.
pub fn find_block_end_in_lines(
    lines: &[&str],
    start_line: usize,
    mode: BraceMode,
    max_iterations: usize,
) -> BlockScan {
    let mut boundaries = Vec::with_capacity(lines.len() + 1);
    boundaries.push(0usize);
    let mut pos = 0usize;
    for line in lines {
        pos += line.len() + 1;
        boundaries.push(pos);
    }

    let joined = lines.join("\n");
    let start = boundaries.get(start_line).copied().unwrap_or(0);
    let scan = find_block_end(&joined, start, mode, max_iterations);

    match scan.status {
        ScanStatus::Closed => {
            // `end` is one past the closing brace; map the brace offset
            // back to the line that contains it.
            let brace = scan.end.saturating_sub(1);
            let line = boundaries.partition_point(|&b| b <= brace).saturating_sub(1);
            BlockScan {
                end: line,
                status: ScanStatus::Closed,
            }
        }
        status => BlockScan {
            end: lines.len().saturating_sub(1),
            status,
        },
    }
}

/// Walk a byte offset back to the nearest UTF-8 character boundary so the
/// fallback position is always sliceable.
fn clamp_boundary(content: &str, mut offset: usize) -> usize {
    while offset > 0 && !content.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(content: &str, start: usize, mode: BraceMode) -> BlockScan {
        find_block_end(content, start, mode, DEFAULT_SCAN_LIMIT)
    }

    #[test]
    fn test_finds_matching_brace() {
        let code = "{ int x = 1; }";
        let result = scan(code, 0, BraceMode::Immediate);
        assert!(result.is_closed());
        assert_eq!(&code[result.end - 1..result.end], "}");
        assert_eq!(result.end, code.len());
    }

    #[test]
    fn test_nested_braces() {
        let code = "{ if (x) { y(); } else { z(); } }";
        let result = scan(code, 0, BraceMode::Immediate);
        assert!(result.is_closed());
        assert_eq!(result.end, code.len());
    }

    #[test]
    fn test_wait_for_opening_skips_header() {
        let code = "public void Run(int x)\n{\n    Do();\n}";
        let result = scan(code, 0, BraceMode::WaitForOpening);
        assert!(result.is_closed());
        assert_eq!(result.end, code.len());
    }

    #[test]
    fn test_brace_in_string_ignored() {
        let code = r#"{ var s = "closing } brace"; }"#;
        let result = scan(code, 0, BraceMode::Immediate);
        assert!(result.is_closed());
        assert_eq!(result.end, code.len());
    }

    #[test]
    fn test_brace_in_verbatim_string_ignored() {
        let code = r#"{ var path = @"C:\data\{folder}"; }"#;
        let result = scan(code, 0, BraceMode::Immediate);
        assert!(result.is_closed());
        assert_eq!(result.end, code.len());
    }

    #[test]
    fn test_verbatim_doubled_quote_is_escape() {
        let code = r#"{ var s = @"say ""hi"" { not counted"; }"#;
        let result = scan(code, 0, BraceMode::Immediate);
        assert!(result.is_closed());
        assert_eq!(result.end, code.len());
    }

    #[test]
    fn test_escaped_quote_in_regular_string() {
        let code = r#"{ var s = "quote \" then { brace"; }"#;
        let result = scan(code, 0, BraceMode::Immediate);
        assert!(result.is_closed());
        assert_eq!(result.end, code.len());
    }

    #[test]
    fn test_brace_in_char_literal_ignored() {
        let code = "{ char c = '{'; char d = '}'; }";
        let result = scan(code, 0, BraceMode::Immediate);
        assert!(result.is_closed());
        assert_eq!(result.end, code.len());
    }

    #[test]
    fn test_brace_in_comments_ignored() {
        let code = "{\n    // ignore }\n    /* and } this */\n}";
        let result = scan(code, 0, BraceMode::Immediate);
        assert!(result.is_closed());
        assert_eq!(result.end, code.len());
    }

    #[test]
    fn test_unterminated_block_falls_back() {
        let code = "{ int x = 1;";
        let result = scan(code, 0, BraceMode::Immediate);
        assert!(!result.is_closed());
        assert_eq!(result.status, ScanStatus::EndOfInput);
        assert_eq!(result.end, code.len());
        assert!(result.reason().is_some());
    }

    #[test]
    fn test_iteration_ceiling_is_distinct_failure() {
        let code = "{ ".repeat(100);
        let result = find_block_end(&code, 0, BraceMode::Immediate, 10);
        assert_eq!(result.status, ScanStatus::IterationLimit(10));
        assert!(result.reason().unwrap().contains("max iterations"));
    }

    #[test]
    fn test_fallback_is_bounded_window() {
        let mut code = String::from("{ ");
        code.push_str(&"x".repeat(20_000));
        let result = scan(&code, 0, BraceMode::Immediate);
        assert!(!result.is_closed());
        assert_eq!(result.end, 5_000);
    }

    #[test]
    fn test_line_indexed_success_returns_line_number() {
        let lines = vec!["void Run()", "{", "    Do();", "}", "int after;"];
        let result = find_block_end_in_lines(&lines, 0, BraceMode::WaitForOpening, DEFAULT_SCAN_LIMIT);
        assert!(result.is_closed());
        assert_eq!(result.end, 3);
    }

    #[test]
    fn test_line_indexed_failure_returns_last_line() {
        let lines = vec!["void Run()", "{", "    Do();"];
        let result = find_block_end_in_lines(&lines, 0, BraceMode::WaitForOpening, DEFAULT_SCAN_LIMIT);
        assert!(!result.is_closed());
        assert_eq!(result.end, 2);
    }
}
