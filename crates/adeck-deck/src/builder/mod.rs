//! Base DOM construction.
//!
//! Turns the parsed document into the deck skeleton every pipeline stage
//! works on. Steps run in this order:
//!
//! 1. favicon
//! 2. page title and title slide (with the preamble)
//! 3. one slide per section, with vertical stacks for nested sections
//! 4. images inlined as CSS backgrounds
//! 5. emojis inlined as CSS backgrounds
//! 6. `keep-markup` listings restored to their raw source
//! 7. speaker notes turned into `<aside>`

mod images;

use adeck_asciidoc::{Block, BlockKind, render_block, render_blocks};
use adeck_cache::CacheBucket;
use adeck_dom::{ArenaDom, Dom, InsertPosition};
use rayon::prelude::*;

use crate::deck::Deck;
use crate::embed::{EmbeddableImage, background_rule, svg_data_uri};
use crate::error::BuildError;
use crate::extensions::{EmojiEntry, EmojiSource};
use crate::services::BuildContext;

const SKELETON: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title></title></head>\
<body><div class=\"reveal\"><div class=\"slides\"></div></div></body></html>";

/// Build the DOM of `deck`, ready for the transformation pipeline.
pub fn build_dom(deck: &Deck, context: &BuildContext<'_>) -> Result<ArenaDom, BuildError> {
    let mut dom = base_dom(deck)?;
    images::embed_images(&mut dom, deck)?;
    embed_emojis(&mut dom, deck, context)?;
    restore_markup(&mut dom, deck)?;
    extract_notes(&mut dom)?;
    Ok(dom)
}

/// Skeleton with favicon, title and slides.
pub(crate) fn base_dom(deck: &Deck) -> Result<ArenaDom, BuildError> {
    let mut dom = ArenaDom::parse(SKELETON);
    insert_favicon(&mut dom, deck)?;
    insert_title(&mut dom, deck)?;
    insert_sections(&mut dom, deck)?;
    Ok(dom)
}

fn insert_favicon(dom: &mut dyn Dom, deck: &Deck) -> Result<(), BuildError> {
    let Some(path) = &deck.configuration.favicon else {
        return Ok(());
    };
    match EmbeddableImage::load(path, String::new()) {
        Ok(icon) => {
            let html = format!(
                "<link rel=\"icon\" type=\"{}\" href=\"{}\">",
                icon.mime,
                html_escape::encode_double_quoted_attribute(&icon.data_uri)
            );
            dom.insert_html("head", InsertPosition::AfterBegin, &html)?;
        }
        Err(e) => {
            tracing::warn!(favicon = %path.display(), error = %e, "Cannot embed favicon");
        }
    }
    Ok(())
}

fn insert_title(dom: &mut dyn Dom, deck: &Deck) -> Result<(), BuildError> {
    let document = &deck.document;
    let page_title = match (&deck.configuration.page_title, &document.title) {
        (Some(title), _) => title.clone(),
        (None, Some(title)) => plain_text(title),
        (None, None) => String::new(),
    };
    let title = dom.require("head > title")?;
    dom.set_text(title, &page_title);

    let preamble = match document.blocks.first() {
        Some(Block {
            kind: BlockKind::Preamble(blocks),
            ..
        }) => Some(render_blocks(blocks, document)),
        _ => None,
    };
    if document.title.is_none() && preamble.is_none() {
        return Ok(());
    }

    let mut html = String::from("<section class=\"title-slide\">");
    if let Some(title) = &document.title {
        html.push_str("<h1>");
        html.push_str(title);
        html.push_str("</h1>");
    }
    if let Some(preamble) = preamble {
        html.push_str(&preamble);
    }
    html.push_str("</section>");
    dom.insert_html(".slides", InsertPosition::BeforeEnd, &html)?;
    Ok(())
}

fn insert_sections(dom: &mut dyn Dom, deck: &Deck) -> Result<(), BuildError> {
    let document = &deck.document;
    let slides = dom.require(".slides")?;
    let mut loose = String::new();

    for block in &document.blocks {
        match &block.kind {
            BlockKind::Preamble(_) => {}
            BlockKind::Section(_) => {
                flush_loose(dom, slides, &mut loose)?;
                dom.insert_html_at(slides, InsertPosition::BeforeEnd, &render_block(block, document))?;
            }
            _ => loose.push_str(&render_block(block, document)),
        }
    }
    flush_loose(dom, slides, &mut loose)?;

    stack_nested_sections(dom)?;
    for level in 1..=5 {
        for node in dom.select_all(&format!("div.sect{level}"))? {
            dom.change_tag(node, "section")?;
        }
    }
    Ok(())
}

/// Blocks outside any section share one slide.
fn flush_loose(
    dom: &mut dyn Dom,
    slides: adeck_dom::NodeId,
    loose: &mut String,
) -> Result<(), BuildError> {
    if loose.is_empty() {
        return Ok(());
    }
    let html = format!("<section>{loose}</section>");
    dom.insert_html_at(slides, InsertPosition::BeforeEnd, &html)?;
    loose.clear();
    Ok(())
}

/// A level-1 section with level-2 children becomes a vertical stack: the
/// level-1 slide followed by each level-2 slide, under one `<section>`.
fn stack_nested_sections(dom: &mut dyn Dom) -> Result<(), BuildError> {
    for parent in dom.select_all(".slides > div.sect1")? {
        let nested = dom.select_within(parent, "div.sect2")?;
        if nested.is_empty() {
            continue;
        }
        let stack = dom.create_element("section")?;
        dom.add_class(stack, "stack");
        dom.insert_before(parent, stack)?;
        dom.append_child(stack, parent);
        for child in nested {
            dom.append_child(stack, child);
        }
    }
    Ok(())
}

fn embed_emojis(
    dom: &mut dyn Dom,
    deck: &Deck,
    context: &BuildContext<'_>,
) -> Result<(), BuildError> {
    if deck.emojis.is_empty() {
        return Ok(());
    }
    let bucket = context.cache.bucket("emojis");
    let bucket: &dyn CacheBucket = bucket.as_ref();
    let source: &dyn EmojiSource = context.services.emoji_source.as_ref();

    let entries: Vec<&EmojiEntry> = deck.emojis.values().collect();
    let fetched: Vec<(&EmojiEntry, Option<&str>)> = entries
        .par_iter()
        .map(|entry| (*entry, entry.fetcher.fetch(bucket, source)))
        .collect();

    let mut rules = String::new();
    let mut embedded: Vec<&EmojiEntry> = Vec::new();
    for (entry, svg) in &fetched {
        let Some(svg) = svg else {
            continue;
        };
        match adeck_diagrams::svg::strip_root_dimensions(svg) {
            Ok(svg) => {
                rules.push_str(&background_rule(&entry.css_class, &svg_data_uri(&svg)));
                embedded.push(*entry);
            }
            Err(e) => tracing::warn!(emoji = %entry.name, error = %e, "Cannot embed emoji"),
        }
    }
    if !rules.is_empty() {
        dom.insert_inline_style(&rules, InsertPosition::BeforeEnd)?;
    }

    for placeholder in dom.select_all("img.emoji-placeholder")? {
        let name = dom.attribute(placeholder, "data-emoji").unwrap_or_default();
        let html = match embedded.iter().find(|entry| entry.name == name) {
            Some(entry) => format!(
                "<span class=\"emoji {}\" role=\"img\" aria-label=\":{}:\"></span>",
                entry.css_class,
                html_escape::encode_double_quoted_attribute(&name)
            ),
            None => format!(":{}:", html_escape::encode_text(&name)),
        };
        dom.replace_with_html(placeholder, &html)?;
    }
    Ok(())
}

/// Listings with the `keep-markup` option get their unescaped source back.
fn restore_markup(dom: &mut dyn Dom, deck: &Deck) -> Result<(), BuildError> {
    for listing in deck.document.listings() {
        if !listing.keep_markup {
            continue;
        }
        let selector = format!("code[data-code-id=\"{}\"]", listing.code_id);
        for code in dom.select_all(&selector)? {
            dom.set_inner_html(code, &listing.source)?;
        }
    }
    Ok(())
}

fn extract_notes(dom: &mut dyn Dom) -> Result<(), BuildError> {
    for notes in dom.select_all("div.notes")? {
        dom.change_tag(notes, "aside")?;
    }
    Ok(())
}

fn plain_text(html: &str) -> String {
    let dom = ArenaDom::parse(html);
    dom.text_content(dom.document())
}
