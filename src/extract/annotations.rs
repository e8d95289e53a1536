use crate::model::Annotation;
use regex::Regex;
use std::sync::LazyLock;

/// Window of lines searched around a declaration for attributes.
const SEARCH_LINES_BEFORE: usize = 10;
const SEARCH_LINES_AFTER: usize = 5;

static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[(\w+)(?:\(([^)]*)\))?\]").expect("annotation pattern"));

/// Extract `[Name]` / `[Name(args)]` attributes near the declaration line.
pub(crate) fn extract_annotations(source: &str, decl_line: usize) -> Vec<Annotation> {
    let lines: Vec<&str> = source.lines().collect();
    let start = decl_line.saturating_sub(SEARCH_LINES_BEFORE);
    let end = (decl_line + SEARCH_LINES_AFTER).min(lines.len());

    let mut annotations = Vec::new();
    for (i, line) in lines.iter().enumerate().take(end).skip(start) {
        if let Some(caps) = ANNOTATION_RE.captures(line) {
            let arguments = caps
                .get(2)
                .map(|args| {
                    args.as_str()
                        .split(',')
                        .map(|a| a.trim().to_string())
                        .collect()
                })
                .unwrap_or_default();
            annotations.push(Annotation {
                name: caps[1].to_string(),
                arguments,
                line: i + 1,
            });
        }
    }

    annotations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_plain_and_parameterized_attributes() {
        let source = "[ApiController]\n[Route(\"api/items\", Name = \"items\")]\npublic class ItemsController\n{\n}\n";
        let annotations = extract_annotations(source, 2);

        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].name, "ApiController");
        assert!(annotations[0].arguments.is_empty());
        assert_eq!(annotations[0].line, 1);
        assert_eq!(annotations[1].name, "Route");
        assert_eq!(
            annotations[1].arguments,
            vec!["\"api/items\"", "Name = \"items\""]
        );
    }

    #[test]
    fn test_window_excludes_distant_attributes() {
        let mut source = String::from("[Obsolete]\n");
        source.push_str(&"// filler\n".repeat(15));
        source.push_str("public class Far\n{\n}\n");
        let annotations = extract_annotations(&source, 16);
        assert!(annotations.is_empty());
    }

    #[test]
    fn test_no_attributes() {
        let annotations = extract_annotations("public class Bare\n{\n}\n", 0);
        assert!(annotations.is_empty());
    }
}
