//! Diagram type detection.

/// Type of a Mermaid diagram, derived from its leading keyword.
///
/// Front matter (`---` blocks), `%%` comments and directives are skipped.
/// Keywords are normalised to a short lowercase name: `graph` and
/// `flowchart` both give `flowchart`, `sequenceDiagram` gives `sequence`,
/// `stateDiagram-v2` gives `state`. Unknown keywords are lowercased as is;
/// an empty source gives `unknown`.
#[must_use]
pub fn diagram_type(source: &str) -> String {
    let mut lines = source.lines().map(str::trim).filter(|l| !l.is_empty());
    let mut in_front_matter = false;

    let keyword = loop {
        let Some(line) = lines.next() else {
            return "unknown".to_owned();
        };
        if line == "---" {
            in_front_matter = !in_front_matter;
            continue;
        }
        if in_front_matter || line.starts_with("%%") {
            continue;
        }
        break line
            .split(|c: char| c.is_whitespace() || c == ';' || c == ':')
            .next()
            .unwrap_or_default();
    };

    let normalized = match keyword {
        "graph" | "flowchart" | "flowchart-elk" => "flowchart",
        "sequenceDiagram" => "sequence",
        "classDiagram" | "classDiagram-v2" => "class",
        "stateDiagram" | "stateDiagram-v2" => "state",
        "erDiagram" => "er",
        "gitGraph" => "git",
        "requirementDiagram" => "requirement",
        "journey" => "journey",
        other => return other.to_lowercase(),
    };
    normalized.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(diagram_type("graph TD\n  A --> B"), "flowchart");
        assert_eq!(diagram_type("flowchart LR; A-->B"), "flowchart");
        assert_eq!(diagram_type("sequenceDiagram\nA->>B: hi"), "sequence");
        assert_eq!(diagram_type("stateDiagram-v2\n[*] --> S"), "state");
        assert_eq!(diagram_type("pie title Pets"), "pie");
        assert_eq!(diagram_type("gantt\ntitle T"), "gantt");
    }

    #[test]
    fn test_skips_front_matter_and_comments() {
        let source = "---\ntitle: Flow\n---\n%% a comment\n%%{init: {}}%%\nclassDiagram\nA <|-- B";
        assert_eq!(diagram_type(source), "class");
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(diagram_type("\n  \n"), "unknown");
    }
}
