//! Regex-based declaration splitting.
//!
//! Finds `class`/`interface`/`struct`/`record`/`enum` headers and closes
//! each block with the scanner. Approximate by design: an external,
//! AST-accurate chunk supplier can replace the whole extractor through the
//! [`crate::extract::TypeExtractor`] seam.

use crate::model::TypeKind;
use crate::scanner::{self, BraceMode, DEFAULT_SCAN_LIMIT};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:\[[^\]\r\n]*\]\s*)*(?:(?:public|private|protected|internal|static|sealed|abstract|partial|readonly|ref)\s+)*(class|interface|struct|record|enum)\s+([A-Za-z_]\w*)",
    )
    .expect("declaration pattern")
});

/// One declaration's slice of a source file.
pub(crate) struct Declaration {
    pub name: String,
    pub kind: TypeKind,
    /// Zero-based line index where the declaration (or its attributes) starts.
    pub start_line: usize,
    pub text: String,
}

pub(crate) fn split_declarations(source: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();

    for caps in DECL_RE.captures_iter(source) {
        let Some(kind) = TypeKind::from_keyword(&caps[1]) else {
            continue;
        };
        let name = caps[2].to_string();
        let header_start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let start_line = source[..header_start].matches('\n').count();
        let end = declaration_end(source, header_start, &name);

        declarations.push(Declaration {
            name,
            kind,
            start_line,
            text: source[header_start..end].to_string(),
        });
    }

    declarations
}

/// End offset of the declaration starting at `start`: the matching closing
/// brace, or the terminating semicolon for body-less declarations
/// (positional records, forward-style stubs).
fn declaration_end(source: &str, start: usize, name: &str) -> usize {
    let rest = &source[start..];
    let brace = rest.find('{');
    let semi = rest.find(';');

    match (brace, semi) {
        (None, Some(s)) => start + s + 1,
        (Some(b), Some(s)) if s < b => start + s + 1,
        _ => {
            let scan =
                scanner::find_block_end(source, start, BraceMode::WaitForOpening, DEFAULT_SCAN_LIMIT);
            if !scan.is_closed() {
                warn!(
                    type_name = name,
                    reason = %scan.reason().unwrap_or_default(),
                    "declaration block did not close; using fallback end"
                );
            }
            scan.end
        }
    }
}
