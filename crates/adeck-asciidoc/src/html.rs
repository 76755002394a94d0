//! HTML conversion of the document tree.
//!
//! Output follows the usual Asciidoc HTML conventions (`div.sect1`,
//! `div.paragraph`, `div.listingblock` ...) so that stylesheets written for
//! them keep working. Sections nest: a level-2 section is rendered inside
//! the body of its level-1 parent.

use std::fmt::Write;

use crate::ast::{Block, BlockKind, BlockMeta, Document, List, Listing, Section, Table};

/// Render a sequence of blocks.
pub fn render_blocks(blocks: &[Block], document: &Document) -> String {
    let mut out = String::new();
    for block in blocks {
        write_block(&mut out, block, document);
    }
    out
}

/// Render one block.
pub fn render_block(block: &Block, document: &Document) -> String {
    let mut out = String::new();
    write_block(&mut out, block, document);
    out
}

fn write_block(out: &mut String, block: &Block, document: &Document) {
    let meta = &block.meta;
    match &block.kind {
        BlockKind::Preamble(blocks) => {
            out.push_str("<div id=\"preamble\"><div class=\"sectionbody\">");
            write_blocks(out, blocks, document);
            out.push_str("</div></div>");
        }
        BlockKind::Section(section) => write_section(out, meta, section, document),
        BlockKind::Paragraph(text) => {
            open_div(out, "paragraph", meta);
            write_title(out, meta);
            let _ = write!(out, "<p>{text}</p></div>");
        }
        BlockKind::Listing(listing) => write_listing(out, meta, listing),
        BlockKind::Literal(text) => {
            open_div(out, "literalblock", meta);
            write_title(out, meta);
            let _ = write!(
                out,
                "<div class=\"content\"><pre>{}</pre></div></div>",
                html_escape::encode_text(text)
            );
        }
        BlockKind::List(list) => write_list(out, meta, list, document),
        BlockKind::Table(table) => write_table(out, meta, table),
        BlockKind::Image(index) => {
            open_div(out, "imageblock", meta);
            out.push_str("<div class=\"content\">");
            if let Some(image) = document.images.get(*index) {
                let _ = write!(
                    out,
                    "<img src=\"{}\" alt=\"{}\"",
                    html_escape::encode_double_quoted_attribute(&image.target),
                    html_escape::encode_double_quoted_attribute(&image.alt)
                );
                if let Some(width) = &image.width {
                    let _ = write!(
                        out,
                        " width=\"{}\"",
                        html_escape::encode_double_quoted_attribute(width)
                    );
                }
                if let Some(height) = &image.height {
                    let _ = write!(
                        out,
                        " height=\"{}\"",
                        html_escape::encode_double_quoted_attribute(height)
                    );
                }
                let _ = write!(out, " data-image-index=\"{}\">", image.index);
            }
            out.push_str("</div>");
            write_title(out, meta);
            out.push_str("</div>");
        }
        BlockKind::Sidebar(blocks) => {
            open_div(out, "sidebarblock", meta);
            out.push_str("<div class=\"content\">");
            write_title(out, meta);
            write_blocks(out, blocks, document);
            out.push_str("</div></div>");
        }
        BlockKind::Notes(blocks) => {
            out.push_str("<div class=\"notes\">");
            write_blocks(out, blocks, document);
            out.push_str("</div>");
        }
        BlockKind::Example(blocks) => write_compound(out, "exampleblock", meta, blocks, document),
        BlockKind::Open(blocks) => write_compound(out, "openblock", meta, blocks, document),
        BlockKind::Quote {
            blocks,
            attribution,
        } => {
            open_div(out, "quoteblock", meta);
            write_title(out, meta);
            out.push_str("<blockquote>");
            write_blocks(out, blocks, document);
            out.push_str("</blockquote>");
            if let Some(attribution) = attribution {
                let _ = write!(
                    out,
                    "<div class=\"attribution\">&#8212; {}</div>",
                    html_escape::encode_text(attribution)
                );
            }
            out.push_str("</div>");
        }
        BlockKind::Pass(html) | BlockKind::Raw(html) => out.push_str(html),
        BlockKind::ThematicBreak => out.push_str("<hr>"),
    }
}

fn write_blocks(out: &mut String, blocks: &[Block], document: &Document) {
    for block in blocks {
        write_block(out, block, document);
    }
}

fn write_section(out: &mut String, meta: &BlockMeta, section: &Section, document: &Document) {
    let level = section.level.clamp(1, 5);
    let _ = write!(
        out,
        "<div class=\"sect{level}{}\" id=\"{}\"",
        role_suffix(meta),
        html_escape::encode_double_quoted_attribute(&section.id)
    );
    write_data_attributes(out, meta);
    let _ = write!(out, "><h{0}>{1}</h{0}>", level + 1, section.title);
    if level == 1 {
        out.push_str("<div class=\"sectionbody\">");
        write_blocks(out, &section.blocks, document);
        out.push_str("</div>");
    } else {
        write_blocks(out, &section.blocks, document);
    }
    out.push_str("</div>");
}

fn write_listing(out: &mut String, meta: &BlockMeta, listing: &Listing) {
    open_div(out, "listingblock", meta);
    write_title(out, meta);
    out.push_str("<div class=\"content\">");
    match &listing.language {
        Some(language) => {
            let language = html_escape::encode_double_quoted_attribute(language);
            let _ = write!(
                out,
                "<pre class=\"highlight\"><code class=\"language-{language}\" \
                 data-lang=\"{language}\" data-code-id=\"{}\"",
                listing.code_id
            );
        }
        None => {
            let _ = write!(out, "<pre><code data-code-id=\"{}\"", listing.code_id);
        }
    }
    if listing.linenums {
        out.push_str(" data-linenums=\"true\"");
    }
    let _ = write!(
        out,
        ">{}</code></pre></div></div>",
        html_escape::encode_text(&listing.source)
    );
}

fn write_list(out: &mut String, meta: &BlockMeta, list: &List, document: &Document) {
    let (class, tag) = if list.ordered {
        ("olist", "ol")
    } else {
        ("ulist", "ul")
    };
    open_div(out, class, meta);
    write_title(out, meta);
    let _ = write!(out, "<{tag}>");
    for item in &list.items {
        let _ = write!(out, "<li><p>{}</p>", item.text);
        write_blocks(out, &item.blocks, document);
        out.push_str("</li>");
    }
    let _ = write!(out, "</{tag}></div>");
}

fn write_table(out: &mut String, meta: &BlockMeta, table: &Table) {
    out.push_str("<table");
    if let Some(id) = &meta.id {
        let _ = write!(
            out,
            " id=\"{}\"",
            html_escape::encode_double_quoted_attribute(id)
        );
    }
    let _ = write!(out, " class=\"tableblock{}\">", role_suffix(meta));
    if let Some(title) = &meta.title {
        let _ = write!(out, "<caption class=\"title\">{title}</caption>");
    }
    if let Some(header) = &table.header {
        out.push_str("<thead><tr>");
        for cell in header {
            let _ = write!(out, "<th class=\"tableblock\">{cell}</th>");
        }
        out.push_str("</tr></thead>");
    }
    out.push_str("<tbody>");
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(
                out,
                "<td class=\"tableblock\"><p class=\"tableblock\">{cell}</p></td>"
            );
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}

fn write_compound(
    out: &mut String,
    class: &str,
    meta: &BlockMeta,
    blocks: &[Block],
    document: &Document,
) {
    open_div(out, class, meta);
    write_title(out, meta);
    out.push_str("<div class=\"content\">");
    write_blocks(out, blocks, document);
    out.push_str("</div></div>");
}

fn open_div(out: &mut String, class: &str, meta: &BlockMeta) {
    out.push_str("<div");
    if let Some(id) = &meta.id {
        let _ = write!(
            out,
            " id=\"{}\"",
            html_escape::encode_double_quoted_attribute(id)
        );
    }
    let _ = write!(out, " class=\"{class}{}\"", role_suffix(meta));
    write_data_attributes(out, meta);
    out.push('>');
}

fn write_data_attributes(out: &mut String, meta: &BlockMeta) {
    for (name, value) in &meta.attributes {
        if name.starts_with("data-") {
            let _ = write!(
                out,
                " {name}=\"{}\"",
                html_escape::encode_double_quoted_attribute(value)
            );
        }
    }
}

fn write_title(out: &mut String, meta: &BlockMeta) {
    if let Some(title) = &meta.title {
        let _ = write!(out, "<div class=\"title\">{title}</div>");
    }
}

fn role_suffix(meta: &BlockMeta) -> String {
    meta.roles.iter().fold(String::new(), |mut acc, role| {
        acc.push(' ');
        acc.push_str(&html_escape::encode_double_quoted_attribute(role));
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Registry, parse};
    use pretty_assertions::assert_eq;

    fn render(text: &str) -> String {
        let doc = parse(text, &mut Registry::new());
        render_blocks(&doc.blocks, &doc)
    }

    #[test]
    fn test_paragraph_with_role_and_title() {
        assert_eq!(
            render("[.lead]\n.Intro\nHello *world*"),
            "<div class=\"paragraph lead\"><div class=\"title\">Intro</div>\
             <p>Hello <strong>world</strong></p></div>"
        );
    }

    #[test]
    fn test_sections_nest() {
        assert_eq!(
            render("== One\n\n=== Two\n\nText\n"),
            "<div class=\"sect1\" id=\"_one\"><h2>One</h2><div class=\"sectionbody\">\
             <div class=\"sect2\" id=\"_two\"><h3>Two</h3>\
             <div class=\"paragraph\"><p>Text</p></div></div></div></div>"
        );
    }

    #[test]
    fn test_section_data_attributes() {
        let html = render("[.center,data-transition=zoom]\n== Slide\n");
        assert_eq!(
            html,
            "<div class=\"sect1 center\" id=\"_slide\" data-transition=\"zoom\"><h2>Slide</h2>\
             <div class=\"sectionbody\"></div></div>"
        );
    }

    #[test]
    fn test_listing_markup() {
        assert_eq!(
            render("[source,js,linenums]\n----\nif (a < b) {}\n----\n"),
            "<div class=\"listingblock\"><div class=\"content\">\
             <pre class=\"highlight\"><code class=\"language-js\" data-lang=\"js\" \
             data-code-id=\"0\" data-linenums=\"true\">if (a &lt; b) {}</code></pre></div></div>"
        );
        assert_eq!(
            render("----\nplain\n----\n"),
            "<div class=\"listingblock\"><div class=\"content\">\
             <pre><code data-code-id=\"0\">plain</code></pre></div></div>"
        );
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            render("* a\n** b\n"),
            "<div class=\"ulist\"><ul><li><p>a</p><div class=\"ulist\"><ul><li><p>b</p></li>\
             </ul></div></li></ul></div>"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            render("[%header]\n|===\n|H\n|c\n|===\n"),
            "<table class=\"tableblock\"><thead><tr><th class=\"tableblock\">H</th></tr></thead>\
             <tbody><tr><td class=\"tableblock\"><p class=\"tableblock\">c</p></td></tr></tbody>\
             </table>"
        );
    }

    #[test]
    fn test_block_image() {
        assert_eq!(
            render(".Caption\nimage::images/chart.png[Chart,300,200]\n"),
            "<div class=\"imageblock\"><div class=\"content\"><img src=\"images/chart.png\" \
             alt=\"Chart\" width=\"300\" height=\"200\" data-image-index=\"0\"></div>\
             <div class=\"title\">Caption</div></div>"
        );
    }

    #[test]
    fn test_notes_and_quote() {
        assert_eq!(
            render("[notes]\n****\nSecret\n****\n\n[quote,Ada]\n____\nWords\n____\n"),
            "<div class=\"notes\"><div class=\"paragraph\"><p>Secret</p></div></div>\
             <div class=\"quoteblock\"><blockquote><div class=\"paragraph\"><p>Words</p></div>\
             </blockquote><div class=\"attribution\">&#8212; Ada</div></div>"
        );
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(render("++++\n<video src=\"a.mp4\"></video>\n++++\n"), "<video src=\"a.mp4\"></video>");
    }
}
