use crate::model::{Member, MemberKind};
use regex::Regex;
use std::sync::LazyLock;

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:private|public|protected|internal)\s+(?:readonly\s+)?(?:static\s+)?(\w+)\s+(\w+)\s*[;=]",
    )
    .expect("field pattern")
});
static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:public|private|protected|internal)\s+(?:static\s+)?(\w+)\s+(\w+)\s*\{")
        .expect("property pattern")
});
static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:public|private|protected|internal)\s+(?:static\s+)?(?:async\s+)?(?:Task<)?(\w+)>?\s+(\w+)\s*\(",
    )
    .expect("method pattern")
});

/// Extract fields, properties, and methods for cohesion analysis.
pub(crate) fn extract_members(text: &str) -> Vec<Member> {
    let mut members = Vec::new();

    for caps in FIELD_RE.captures_iter(text) {
        members.push(member(&caps, MemberKind::Field));
    }
    for caps in PROPERTY_RE.captures_iter(text) {
        members.push(member(&caps, MemberKind::Property));
    }
    for caps in METHOD_RE.captures_iter(text) {
        members.push(member(&caps, MemberKind::Method));
    }

    members
}

fn member(caps: &regex::Captures<'_>, kind: MemberKind) -> Member {
    let mut m = Member::new(&caps[2], kind);
    m.declared_type = Some(caps[1].to_string());
    m.is_static = caps[0].contains("static");
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
    private readonly int _count;
    private static string _shared = "x";
    public string Name { get; set; }
    public int Total()
    {
        return _count;
    }
    public static void Reset()
    {
    }
"#;

    #[test]
    fn test_extracts_fields_properties_methods() {
        let members = extract_members(SOURCE);

        let count = members.iter().find(|m| m.name == "_count").unwrap();
        assert_eq!(count.kind, MemberKind::Field);
        assert_eq!(count.declared_type.as_deref(), Some("int"));
        assert!(!count.is_static);

        let shared = members.iter().find(|m| m.name == "_shared").unwrap();
        assert!(shared.is_static);

        let name = members.iter().find(|m| m.name == "Name").unwrap();
        assert_eq!(name.kind, MemberKind::Property);

        let total = members.iter().find(|m| m.name == "Total").unwrap();
        assert_eq!(total.kind, MemberKind::Method);

        let reset = members.iter().find(|m| m.name == "Reset").unwrap();
        assert!(reset.is_static);
    }

    #[test]
    fn test_async_task_method_captured() {
        let members = extract_members("public async Task<Order> Load(int id)\n{\n}\n");
        let load = members.iter().find(|m| m.name == "Load").unwrap();
        assert_eq!(load.kind, MemberKind::Method);
        assert_eq!(load.declared_type.as_deref(), Some("Order"));
    }

    #[test]
    fn test_no_members_in_plain_text() {
        assert!(extract_members("int x = 1;").is_empty());
    }
}
