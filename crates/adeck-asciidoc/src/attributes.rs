//! Block attribute line parsing (`[source,js,linenums]`, `[#id.role%opt]`).

use crate::ast::BlockMeta;

/// Merge the content of a `[...]` attribute line into `meta`.
pub(crate) fn parse_attribute_line(content: &str, meta: &mut BlockMeta) {
    let mut position = 0;
    for entry in split_entries(content) {
        let entry = entry.trim();
        if let Some((key, value)) = named_entry(entry) {
            let value = unquote(value.trim());
            match key {
                "id" => meta.id = Some(value.to_owned()),
                "role" => meta.roles.extend(value.split_whitespace().map(str::to_owned)),
                "options" | "opts" => meta.options.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_owned),
                ),
                _ => {
                    meta.attributes.insert(key.to_owned(), value.to_owned());
                }
            }
            continue;
        }

        position += 1;
        if position == 1 {
            parse_shorthand(entry, meta);
        }
        if !entry.is_empty() {
            meta.attributes
                .insert(position.to_string(), unquote(entry).to_owned());
        }
    }
}

/// Parse an anchor line body (`id` or `id,reftext` from `[[...]]`).
pub(crate) fn parse_anchor(content: &str, meta: &mut BlockMeta) {
    let id = content.split(',').next().unwrap_or_default().trim();
    if !id.is_empty() {
        meta.id = Some(id.to_owned());
    }
}

/// `style#id.role1.role2%option`
fn parse_shorthand(entry: &str, meta: &mut BlockMeta) {
    let split = entry.find(['#', '.', '%']).unwrap_or(entry.len());
    let style = &entry[..split];
    if !style.is_empty() {
        meta.style = Some(style.to_owned());
    }

    let mut rest = &entry[split..];
    while let Some(marker) = rest.chars().next() {
        let body = &rest[1..];
        let end = body.find(['#', '.', '%']).unwrap_or(body.len());
        let value = &body[..end];
        if !value.is_empty() {
            match marker {
                '#' => meta.id = Some(value.to_owned()),
                '.' => meta.roles.push(value.to_owned()),
                _ => meta.options.push(value.to_owned()),
            }
        }
        rest = &body[end..];
    }
}

fn named_entry(entry: &str) -> Option<(&str, &str)> {
    let (key, value) = entry.split_once('=')?;
    let key = key.trim();
    let is_name = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    is_name.then_some((key, value))
}

fn split_entries(content: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut quote = None;
    let mut start = 0;
    for (i, c) in content.char_indices() {
        match (c, quote) {
            ('"' | '\'', None) => quote = Some(c),
            (c, Some(q)) if c == q => quote = None,
            (',', None) => {
                entries.push(&content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&content[start..]);
    entries
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn meta(line: &str) -> BlockMeta {
        let mut meta = BlockMeta::default();
        parse_attribute_line(line, &mut meta);
        meta
    }

    #[test]
    fn test_source_with_language_and_linenums() {
        let meta = meta("source,javascript,linenums");
        assert_eq!(meta.style.as_deref(), Some("source"));
        assert_eq!(meta.attribute("2"), Some("javascript"));
        assert_eq!(meta.attribute("3"), Some("linenums"));
    }

    #[test]
    fn test_shorthands() {
        let meta = meta("source#hello.wide.dim%keep-markup,html");
        assert_eq!(meta.style.as_deref(), Some("source"));
        assert_eq!(meta.id.as_deref(), Some("hello"));
        assert_eq!(meta.roles, vec!["wide", "dim"]);
        assert_eq!(meta.options, vec!["keep-markup"]);
        assert_eq!(meta.attribute("2"), Some("html"));
    }

    #[test]
    fn test_role_only() {
        let meta = meta(".columns");
        assert_eq!(meta.style, None);
        assert_eq!(meta.roles, vec!["columns"]);
    }

    #[test]
    fn test_named_attributes() {
        let meta = meta("graph, id=flow, role=\"big wide\", options=\"a,b\", title='x, y'");
        assert_eq!(meta.style.as_deref(), Some("graph"));
        assert_eq!(meta.id.as_deref(), Some("flow"));
        assert_eq!(meta.roles, vec!["big", "wide"]);
        assert_eq!(meta.options, vec!["a", "b"]);
        assert_eq!(meta.attribute("title"), Some("x, y"));
    }

    #[test]
    fn test_anchor() {
        let mut meta = BlockMeta::default();
        parse_anchor("intro,Introduction", &mut meta);
        assert_eq!(meta.id.as_deref(), Some("intro"));
    }
}
