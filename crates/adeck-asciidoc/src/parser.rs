//! Line-oriented block parser.
//!
//! The parser walks the source one line at a time. Metadata lines (block
//! attributes, anchors, titles, comments and attribute entries) accumulate
//! into a [`BlockMeta`] that is attached to the next block. Delimited blocks
//! are read until their closing delimiter; compound ones recurse.

use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::ast::{
    Block, BlockKind, BlockMeta, Document, List, ListItem, Listing, Section, Table,
};
use crate::attributes::{parse_anchor, parse_attribute_line};
use crate::extension::{ProcessResult, Registry};
use crate::inline::InlineContext;

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(={2,6})\s+(\S.*)$").unwrap());
static ATTRIBUTE_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:(!?)([A-Za-z0-9_][A-Za-z0-9_-]*)(!?):(?:\s+(.*))?$").unwrap()
});
static ANCHOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[\[([^\[\]]+)\]\]$").unwrap());
static ATTRIBUTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\[].*)?\]$").unwrap());
static BLOCK_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\.([^\s.].*)$").unwrap());
static BLOCK_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^image::([^\[\s]+)\[(.*)\]$").unwrap());
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\*{1,5}|-|\.{1,5}|\d+\.)\s+(\S.*)$").unwrap());
static DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-{4,}|\.{4,}|\*{4,}|={4,}|_{4,}|\+{4,}|--|\|===)$").unwrap()
});

/// Parse a whole document.
pub(crate) fn parse_document(text: &str, registry: &mut Registry<'_>) -> Document {
    let mut parser = Parser {
        lines: text.lines().collect(),
        pos: 0,
        attributes: IndexMap::new(),
        inline: InlineContext {
            registry,
            images: Vec::new(),
        },
        next_code_id: 0,
        section_ids: HashSet::new(),
    };

    let title = parser.header();
    let mut blocks = parser.blocks(0, None);

    if title.is_some()
        && let Some(first_section) = blocks
            .iter()
            .position(|b| matches!(b.kind, BlockKind::Section(_)))
        && first_section > 0
    {
        let preamble: Vec<Block> = blocks.drain(..first_section).collect();
        blocks.insert(
            0,
            Block {
                meta: BlockMeta::default(),
                kind: BlockKind::Preamble(preamble),
            },
        );
    }

    Document {
        title,
        attributes: parser.attributes,
        blocks,
        images: parser.inline.images,
    }
}

struct Parser<'t, 'r, 'a> {
    lines: Vec<&'t str>,
    pos: usize,
    attributes: IndexMap<String, String>,
    inline: InlineContext<'r, 'a>,
    next_code_id: usize,
    section_ids: HashSet<String>,
}

impl<'t> Parser<'t, '_, '_> {
    fn peek(&self) -> Option<&'t str> {
        self.lines.get(self.pos).copied().map(str::trim_end)
    }

    fn convert(&mut self, text: &str) -> String {
        self.inline.convert(text, &self.attributes)
    }

    fn skip_blank(&mut self) {
        while self.peek().is_some_and(str::is_empty) {
            self.pos += 1;
        }
    }

    /// Read `= Title`, the optional author and revision lines and the header
    /// attribute entries.
    fn header(&mut self) -> Option<String> {
        loop {
            self.skip_blank();
            let line = self.peek()?;
            if self.skip_comment(line) || self.attribute_entry(line) {
                continue;
            }
            break;
        }

        let title = self.peek()?.strip_prefix("= ")?.trim().to_owned();
        self.pos += 1;

        let mut byline = 0;
        while let Some(line) = self.peek() {
            if line.is_empty() {
                break;
            }
            if self.skip_comment(line) || self.attribute_entry(line) {
                continue;
            }
            if byline < 2 && !line.starts_with(':') {
                byline += 1;
                self.pos += 1;
                continue;
            }
            break;
        }

        Some(self.convert(&title))
    }

    /// Consume a comment line or block.
    fn skip_comment(&mut self, line: &str) -> bool {
        if is_comment_delimiter(line) {
            self.pos += 1;
            while let Some(inner) = self.peek() {
                self.pos += 1;
                if inner == line {
                    break;
                }
            }
            return true;
        }
        if line.starts_with("//") {
            self.pos += 1;
            return true;
        }
        false
    }

    /// Consume a `:name: value` or `:name!:` entry.
    fn attribute_entry(&mut self, line: &str) -> bool {
        let Some(caps) = ATTRIBUTE_ENTRY.captures(line) else {
            return false;
        };
        let name = caps[2].to_owned();
        if !caps[1].is_empty() || !caps[3].is_empty() {
            self.attributes.shift_remove(&name);
        } else {
            let value = caps.get(4).map_or("", |m| m.as_str().trim());
            self.attributes.insert(name, value.to_owned());
        }
        self.pos += 1;
        true
    }

    /// Parse blocks until a heading at `level` or above, or until `closing`.
    fn blocks(&mut self, level: usize, closing: Option<&str>) -> Vec<Block> {
        let mut blocks = Vec::new();
        loop {
            self.skip_blank();
            let mark = self.pos;
            let meta = self.meta();
            let Some(line) = self.peek() else {
                if let Some(closing) = closing {
                    tracing::warn!(delimiter = closing, "Unterminated delimited block");
                }
                break;
            };

            if closing == Some(line) {
                self.pos += 1;
                break;
            }

            if closing.is_none()
                && let Some(caps) = HEADING.captures(line)
            {
                let section_level = caps[1].len() - 1;
                if section_level <= level {
                    self.pos = mark;
                    break;
                }
                let title = caps[2].trim().to_owned();
                self.pos += 1;
                blocks.push(self.section(section_level, &title, meta));
                continue;
            }

            if let Some(block) = self.block(line, meta, closing) {
                blocks.push(block);
            }
        }
        blocks
    }

    /// Collect metadata lines above a block.
    fn meta(&mut self) -> BlockMeta {
        let mut meta = BlockMeta::default();
        while let Some(line) = self.peek() {
            if line.is_empty() {
                self.pos += 1;
                continue;
            }
            if self.skip_comment(line) || self.attribute_entry(line) {
                continue;
            }
            if let Some(caps) = ANCHOR.captures(line) {
                parse_anchor(&caps[1], &mut meta);
            } else if let Some(caps) = ATTRIBUTE_LINE.captures(line) {
                parse_attribute_line(caps.get(1).map_or("", |m| m.as_str()), &mut meta);
            } else if let Some(caps) = BLOCK_TITLE.captures(line) {
                let title = caps[1].to_owned();
                meta.title = Some(self.convert(&title));
            } else {
                break;
            }
            self.pos += 1;
        }
        meta
    }

    fn block(&mut self, line: &'t str, meta: BlockMeta, closing: Option<&str>) -> Option<Block> {
        if line == "'''" {
            self.pos += 1;
            return Some(Block {
                meta,
                kind: BlockKind::ThematicBreak,
            });
        }
        if line == "<<<" {
            self.pos += 1;
            return None;
        }
        if let Some(caps) = BLOCK_IMAGE.captures(line) {
            self.pos += 1;
            let image = self
                .inline
                .register_image(&caps[1], &caps[2], &self.attributes);
            return Some(Block {
                meta,
                kind: BlockKind::Image(image.index),
            });
        }
        if DELIMITER.is_match(line) {
            return self.delimited(line, meta);
        }
        if let Some(caps) = LIST_ITEM.captures(line) {
            let marker = normalize_marker(&caps[1]);
            let list = self.list(&marker, &mut Vec::new());
            return Some(Block {
                meta,
                kind: BlockKind::List(list),
            });
        }
        if line.starts_with([' ', '\t']) {
            let text = self.literal_paragraph();
            return Some(Block {
                meta,
                kind: BlockKind::Literal(text),
            });
        }
        Some(self.paragraph(meta, closing))
    }

    fn delimited(&mut self, delimiter: &'t str, meta: BlockMeta) -> Option<Block> {
        self.pos += 1;
        let style = meta.style.clone();
        let is_notes = style.as_deref() == Some("notes") || meta.roles.iter().any(|r| r == "notes");

        let kind = match delimiter.as_bytes()[0] {
            b'-' if delimiter.len() >= 4 => return self.verbatim(delimiter, meta, false),
            b'.' => return self.verbatim(delimiter, meta, true),
            b'+' => BlockKind::Pass(self.raw_until(delimiter)),
            b'|' => BlockKind::Table(self.table(&meta)),
            b'*' if is_notes => BlockKind::Notes(self.blocks(0, Some(delimiter))),
            b'*' => BlockKind::Sidebar(self.blocks(0, Some(delimiter))),
            b'=' => BlockKind::Example(self.blocks(0, Some(delimiter))),
            b'_' => BlockKind::Quote {
                blocks: self.blocks(0, Some(delimiter)),
                attribution: meta.attribute("2").map(str::to_owned),
            },
            _ if is_notes => BlockKind::Notes(self.blocks(0, Some(delimiter))),
            _ if style.as_deref() == Some("quote") => BlockKind::Quote {
                blocks: self.blocks(0, Some(delimiter)),
                attribution: meta.attribute("2").map(str::to_owned),
            },
            _ => BlockKind::Open(self.blocks(0, Some(delimiter))),
        };
        Some(Block { meta, kind })
    }

    /// Listing (`----`) or literal (`....`) block, offered to a block
    /// processor first when it carries a custom style.
    fn verbatim(&mut self, delimiter: &str, meta: BlockMeta, literal: bool) -> Option<Block> {
        let source = self.raw_until(delimiter);
        let style = meta.style.clone();
        let style = style.as_deref();

        if let Some(style) = style
            && !matches!(style, "source" | "listing" | "literal")
        {
            match self.inline.registry.process_block(
                style,
                &meta.attributes,
                meta.id.as_deref(),
                &source,
            ) {
                ProcessResult::Placeholder(html) | ProcessResult::Inline(html) => {
                    return Some(Block {
                        meta,
                        kind: BlockKind::Raw(html),
                    });
                }
                ProcessResult::Drop => return None,
                ProcessResult::PassThrough => {}
            }
        }

        if (literal && style != Some("source")) || style == Some("literal") {
            return Some(Block {
                meta,
                kind: BlockKind::Literal(source),
            });
        }

        let language = match style {
            Some("source") => meta
                .attribute("2")
                .or_else(|| self.attributes.get("source-language").map(String::as_str)),
            None => meta.attribute("2"),
            Some(_) => None,
        }
        .filter(|language| !language.is_empty())
        .map(str::to_owned);
        let linenums = meta.has_option("linenums")
            || meta.attribute("3") == Some("linenums")
            || meta.attributes.contains_key("linenums");
        let keep_markup = meta.has_option("keep-markup");

        let code_id = self.next_code_id;
        self.next_code_id += 1;
        Some(Block {
            meta,
            kind: BlockKind::Listing(Listing {
                code_id,
                source,
                language,
                keep_markup,
                linenums,
            }),
        })
    }

    /// Lines up to `delimiter`, joined verbatim. Consumes the delimiter.
    fn raw_until(&mut self, delimiter: &str) -> String {
        let mut lines = Vec::new();
        while let Some(line) = self.lines.get(self.pos) {
            self.pos += 1;
            if line.trim_end() == delimiter {
                return lines.join("\n");
            }
            lines.push(*line);
        }
        tracing::warn!(delimiter, "Unterminated delimited block");
        lines.join("\n")
    }

    fn section(&mut self, level: usize, title: &str, meta: BlockMeta) -> Block {
        let id = match &meta.id {
            Some(id) => id.clone(),
            None => self.section_id(title),
        };
        let title = self.convert(title);
        let blocks = self.blocks(level, None);
        Block {
            meta,
            kind: BlockKind::Section(Section {
                level,
                title,
                id,
                blocks,
            }),
        }
    }

    /// `_lowercase_words` id with a numeric suffix on collision.
    fn section_id(&mut self, title: &str) -> String {
        let mut base = String::from("_");
        for c in title.chars().flat_map(char::to_lowercase) {
            if c.is_alphanumeric() {
                base.push(c);
            } else if !base.ends_with('_') {
                base.push('_');
            }
        }
        while base.len() > 1 && base.ends_with('_') {
            base.pop();
        }

        let mut id = base.clone();
        let mut counter = 2;
        while !self.section_ids.insert(id.clone()) {
            id = format!("{base}_{counter}");
            counter += 1;
        }
        id
    }

    fn paragraph(&mut self, meta: BlockMeta, closing: Option<&str>) -> Block {
        let mut lines = Vec::new();
        while let Some(line) = self.peek() {
            if line.is_empty() || closing == Some(line) {
                break;
            }
            if !lines.is_empty() && (DELIMITER.is_match(line) || BLOCK_IMAGE.is_match(line)) {
                break;
            }
            lines.push(line);
            self.pos += 1;
        }
        let text = self.convert(&lines.join("\n"));
        let paragraph = Block {
            meta: BlockMeta::default(),
            kind: BlockKind::Paragraph(text),
        };

        let style = meta.style.clone();
        match style.as_deref() {
            Some("notes") => Block {
                meta,
                kind: BlockKind::Notes(vec![paragraph]),
            },
            Some("quote") => {
                let attribution = meta.attribute("2").map(str::to_owned);
                Block {
                    meta,
                    kind: BlockKind::Quote {
                        blocks: vec![paragraph],
                        attribution,
                    },
                }
            }
            _ if meta.roles.iter().any(|r| r == "notes") => Block {
                meta,
                kind: BlockKind::Notes(vec![paragraph]),
            },
            _ => Block {
                meta,
                kind: paragraph.kind,
            },
        }
    }

    /// Indented paragraph, with the common indentation removed.
    fn literal_paragraph(&mut self) -> String {
        let mut lines = Vec::new();
        while let Some(line) = self.peek() {
            if line.is_empty() {
                break;
            }
            lines.push(line);
            self.pos += 1;
        }
        let indent = lines
            .iter()
            .map(|line| line.len() - line.trim_start().len())
            .min()
            .unwrap_or(0);
        lines
            .iter()
            .map(|line| &line[indent.min(line.len())..])
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Items sharing `marker`; other markers nest unless an enclosing list
    /// already uses them.
    fn list(&mut self, marker: &str, parents: &mut Vec<String>) -> List {
        let ordered = marker.starts_with('.') || marker == "1.";
        let mut items: Vec<ListItem> = Vec::new();

        while let Some(line) = self.peek() {
            if line.is_empty() {
                let next = (self.pos..self.lines.len())
                    .find(|&i| !self.lines[i].trim_end().is_empty());
                match next {
                    Some(i) if LIST_ITEM.is_match(self.lines[i]) => {
                        self.pos = i;
                        continue;
                    }
                    _ => break,
                }
            }

            let Some(caps) = LIST_ITEM.captures(line) else {
                break;
            };
            let item_marker = normalize_marker(&caps[1]);

            if item_marker == marker {
                self.pos += 1;
                let text = self.item_text(&caps[2]);
                let text = self.convert(&text);
                let blocks = self.item_attachments();
                items.push(ListItem { text, blocks });
            } else if parents.iter().any(|p| *p == item_marker) || items.is_empty() {
                break;
            } else {
                parents.push(marker.to_owned());
                let nested = self.list(&item_marker, parents);
                parents.pop();
                if let Some(last) = items.last_mut() {
                    last.blocks.push(Block {
                        meta: BlockMeta::default(),
                        kind: BlockKind::List(nested),
                    });
                }
            }
        }

        List { ordered, items }
    }

    /// Item text including wrapped continuation lines.
    fn item_text(&mut self, first: &str) -> String {
        let mut text = first.to_owned();
        while let Some(line) = self.peek() {
            if line.is_empty()
                || line == "+"
                || LIST_ITEM.is_match(line)
                || DELIMITER.is_match(line)
                || ATTRIBUTE_LINE.is_match(line)
            {
                break;
            }
            text.push('\n');
            text.push_str(line.trim_start());
            self.pos += 1;
        }
        text
    }

    /// Blocks attached to an item with a `+` continuation line.
    fn item_attachments(&mut self) -> Vec<Block> {
        let mut blocks = Vec::new();
        while self.peek() == Some("+") {
            self.pos += 1;
            let meta = self.meta();
            let Some(line) = self.peek() else {
                break;
            };
            if let Some(block) = self.block(line, meta, None) {
                blocks.push(block);
            }
        }
        blocks
    }

    fn table(&mut self, meta: &BlockMeta) -> Table {
        let raw = self.raw_until("|===");
        let lines: Vec<&str> = raw.lines().map(str::trim_end).collect();

        let mut cells: Vec<String> = Vec::new();
        let mut first_row_len = None;
        let mut implicit_header = false;
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            if let Some(body) = line.strip_prefix('|') {
                let row: Vec<&str> = body.split('|').map(str::trim).collect();
                if first_row_len.is_none() {
                    first_row_len = Some(row.len());
                    implicit_header = lines.get(i + 1).is_some_and(|next| next.is_empty());
                }
                cells.extend(row.into_iter().map(str::to_owned));
            } else if let Some(last) = cells.last_mut() {
                last.push('\n');
                last.push_str(line.trim());
            }
        }

        let columns = meta
            .attribute("cols")
            .map(column_count)
            .or(first_row_len)
            .unwrap_or(1)
            .max(1);
        let mut rows: Vec<Vec<String>> = cells
            .chunks(columns)
            .map(|row| row.iter().map(|cell| self.convert(cell)).collect())
            .collect();

        let has_header =
            meta.has_option("header") || (implicit_header && !meta.has_option("noheader"));
        let header = if has_header && !rows.is_empty() {
            Some(rows.remove(0))
        } else {
            None
        };
        Table { header, rows }
    }
}

fn is_comment_delimiter(line: &str) -> bool {
    line.len() >= 4 && line.bytes().all(|b| b == b'/')
}

fn normalize_marker(marker: &str) -> String {
    if marker.starts_with(|c: char| c.is_ascii_digit()) {
        "1.".to_owned()
    } else {
        marker.to_owned()
    }
}

/// `3`, `"1,2,1"` or `"2*"` style column specs.
fn column_count(cols: &str) -> usize {
    let cols = cols.trim();
    if let Ok(count) = cols.parse::<usize>() {
        return count;
    }
    cols.split(',')
        .map(|spec| {
            spec.split_once('*')
                .and_then(|(n, _)| n.trim().parse::<usize>().ok())
                .unwrap_or(1)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::BlockProcessor;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Document {
        parse_document(text, &mut Registry::new())
    }

    fn section(block: &Block) -> &Section {
        match &block.kind {
            BlockKind::Section(section) => section,
            other => panic!("expected section, got {other:?}"),
        }
    }

    #[test]
    fn test_header_and_attributes() {
        let doc = parse("= Demo Deck\nJane Doe\n:theme: light\n:fragment-lists: true\n\n== One\n");
        assert_eq!(doc.title.as_deref(), Some("Demo Deck"));
        assert_eq!(doc.attribute("theme"), Some("light"));
        assert_eq!(doc.attribute("fragment-lists"), Some("true"));
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn test_attribute_unset() {
        let doc = parse(":a: 1\n:b: 2\n:a!:\n= T\n");
        assert_eq!(doc.attribute("a"), None);
        assert_eq!(doc.attribute("b"), Some("2"));
    }

    #[test]
    fn test_preamble_and_nested_sections() {
        let doc = parse(
            "= Title\n\nIntro text.\n\n== First\n\nBody.\n\n=== Sub A\n\nA.\n\n=== Sub B\n\n== Second\n",
        );
        assert_eq!(doc.blocks.len(), 3);
        assert!(matches!(&doc.blocks[0].kind, BlockKind::Preamble(blocks) if blocks.len() == 1));

        let first = section(&doc.blocks[1]);
        assert_eq!(first.level, 1);
        assert_eq!(first.id, "_first");
        assert_eq!(first.blocks.len(), 3);
        assert_eq!(section(&first.blocks[1]).title, "Sub A");
        assert_eq!(section(&first.blocks[2]).level, 2);

        assert_eq!(section(&doc.blocks[2]).title, "Second");
    }

    #[test]
    fn test_no_preamble_without_title() {
        let doc = parse("Loose.\n\n== One\n");
        assert!(matches!(doc.blocks[0].kind, BlockKind::Paragraph(_)));
    }

    #[test]
    fn test_section_meta_and_duplicate_ids() {
        let doc = parse("= T\n\n[.columns#cols]\n== Same\n\n== Same\n\n== Same\n");
        let first = &doc.blocks[0];
        assert_eq!(first.meta.roles, vec!["columns"]);
        assert_eq!(section(first).id, "cols");
        assert_eq!(section(&doc.blocks[1]).id, "_same");
        assert_eq!(section(&doc.blocks[2]).id, "_same_2");
    }

    #[test]
    fn test_source_listing() {
        let doc = parse(
            ":source-language: rust\n= T\n\n[source,javascript,linenums]\n----\nlet a = 1;\n\nlet b = 2;\n----\n\n[source%keep-markup]\n----\n<b>bold</b>\n----\n",
        );
        let listings = doc.listings();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].code_id, 0);
        assert_eq!(listings[0].language.as_deref(), Some("javascript"));
        assert_eq!(listings[0].source, "let a = 1;\n\nlet b = 2;");
        assert!(listings[0].linenums);
        assert_eq!(listings[1].code_id, 1);
        assert_eq!(listings[1].language.as_deref(), Some("rust"));
        assert!(listings[1].keep_markup);
    }

    #[test]
    fn test_comments_are_skipped() {
        let doc = parse("// note\nText\n\n////\nhidden\n\n== not a section\n////\n");
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].kind, BlockKind::Paragraph("Text".to_owned()));
    }

    #[test]
    fn test_nested_lists_with_continuation() {
        let doc = parse("* one\n** one.a\n** one.b\n* two\ncontinued\n+\n----\ncode\n----\n. first\n");
        let BlockKind::List(list) = &doc.blocks[0].kind else {
            panic!("expected list");
        };
        assert!(!list.ordered);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[1].text, "two\ncontinued");
        assert!(matches!(list.items[1].blocks[0].kind, BlockKind::Listing(_)));

        let BlockKind::List(nested) = &list.items[0].blocks[0].kind else {
            panic!("expected nested list");
        };
        assert_eq!(nested.items.len(), 2);
        assert_eq!(nested.items[1].text, "one.b");
    }

    #[test]
    fn test_blank_lines_between_items() {
        let doc = parse("* a\n\n* b\n\nAfter.\n");
        let BlockKind::List(list) = &doc.blocks[0].kind else {
            panic!("expected list");
        };
        assert_eq!(list.items.len(), 2);
        assert!(matches!(doc.blocks[1].kind, BlockKind::Paragraph(_)));
    }

    #[test]
    fn test_table_with_implicit_header() {
        let doc = parse("|===\n|Name |Value\n\n|a |1\n|b\n|2\n|===\n");
        let BlockKind::Table(table) = &doc.blocks[0].kind else {
            panic!("expected table");
        };
        assert_eq!(
            table.header,
            Some(vec!["Name".to_owned(), "Value".to_owned()])
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["b".to_owned(), "2".to_owned()]);
    }

    #[test]
    fn test_table_cols_without_header() {
        let doc = parse("[cols=\"1,1,1\"]\n|===\n|a |b |c\n|d |e |f\n|===\n");
        let BlockKind::Table(table) = &doc.blocks[0].kind else {
            panic!("expected table");
        };
        assert_eq!(table.header, None);
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_notes_containers() {
        let doc = parse("[.notes]\n--\nSay hi.\n--\n\n[notes]\n****\nMore.\n****\n\n[.notes]\nShort.\n");
        assert_eq!(doc.blocks.len(), 3);
        for block in &doc.blocks {
            assert!(matches!(block.kind, BlockKind::Notes(_)), "{block:?}");
        }
    }

    #[test]
    fn test_images_track_imagesdir() {
        let doc = parse(":imagesdir: img\n\nimage::diagram.svg[Diagram,200]\n\n:imagesdir: pics\n\nSee image:logo.png[].\n");
        assert_eq!(doc.images.len(), 2);
        assert_eq!(doc.images[0].images_dir.as_deref(), Some("img"));
        assert_eq!(doc.images[0].alt, "Diagram");
        assert_eq!(doc.images[0].width.as_deref(), Some("200"));
        assert_eq!(doc.images[1].images_dir.as_deref(), Some("pics"));
        assert!(matches!(doc.blocks[0].kind, BlockKind::Image(0)));
    }

    struct Upper {
        seen: Vec<(Option<String>, usize)>,
    }

    impl BlockProcessor for Upper {
        fn style(&self) -> &str {
            "upper"
        }

        fn process(
            &mut self,
            attributes: &IndexMap<String, String>,
            id: Option<&str>,
            source: &str,
            index: usize,
        ) -> ProcessResult {
            self.seen.push((id.map(str::to_owned), index));
            if attributes.contains_key("drop") {
                return ProcessResult::Drop;
            }
            ProcessResult::Placeholder(format!("<p>{}</p>", source.to_uppercase()))
        }
    }

    #[test]
    fn test_block_processor() {
        let mut upper = Upper { seen: Vec::new() };
        let doc = {
            let mut registry = Registry::new();
            registry.block_processor(&mut upper);
            parse_document(
                "[upper,id=first]\n----\nabc\n----\n\n[upper,drop=yes]\n----\nx\n----\n\n[upper]\n....\ndef\n....\n",
                &mut registry,
            )
        };
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].kind, BlockKind::Raw("<p>ABC</p>".to_owned()));
        assert_eq!(doc.blocks[1].kind, BlockKind::Raw("<p>DEF</p>".to_owned()));
        assert_eq!(
            upper.seen,
            vec![(Some("first".to_owned()), 0), (None, 1), (None, 2)]
        );
    }
}
