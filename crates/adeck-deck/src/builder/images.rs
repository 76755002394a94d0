//! Image embedding.

use std::collections::HashSet;
use std::path::PathBuf;

use adeck_asciidoc::ImageRef;
use adeck_dom::{Dom, InsertPosition};
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::deck::Deck;
use crate::embed::{EmbeddableImage, css_class_name, file_stem};
use crate::error::BuildError;

/// Inline every local image as a CSS background.
///
/// One class per distinct file; the wrapper of each `<img>` becomes a
/// `<span class="image img-…">`. Missing files are logged and their images
/// left as they are.
pub(crate) fn embed_images(dom: &mut dyn Dom, deck: &Deck) -> Result<(), BuildError> {
    let mut by_path: IndexMap<PathBuf, Option<EmbeddableImage>> = IndexMap::new();
    let mut classes = HashSet::new();
    let mut rules = String::new();
    let mut rasters = Vec::new();

    for image in &deck.document.images {
        if is_remote(&image.target) {
            continue;
        }
        let path = resolve(deck, image);
        let embedded = match by_path.entry(path) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let class = unique_class(&file_stem(entry.key()), &mut classes);
                let loaded = match EmbeddableImage::load(entry.key(), class) {
                    Ok(loaded) => {
                        rules.push_str(&loaded.css_rule());
                        if loaded.is_legacy_raster() {
                            rasters.push(loaded.name.clone());
                        }
                        Some(loaded)
                    }
                    Err(e) => {
                        tracing::error!(
                            image = %entry.key().display(),
                            error = %e,
                            "Cannot embed image"
                        );
                        None
                    }
                };
                entry.insert(loaded)
            }
        };
        let Some(embedded) = embedded else {
            continue;
        };

        let html = image_span(embedded, image);
        for img in dom.select_all(&format!("img[data-image-index=\"{}\"]", image.index))? {
            let wrapper = dom
                .parent(img)
                .filter(|parent| dom.has_class(*parent, "image") || dom.has_class(*parent, "content"))
                .unwrap_or(img);
            dom.replace_with_html(wrapper, &html)?;
        }
    }

    if !rasters.is_empty() {
        tracing::warn!(
            count = rasters.len(),
            images = %rasters.join(", "),
            "PNG, JPEG, GIF and BMP images are embedded as base64; SVG or WebP versions keep the deck small"
        );
    }
    if !rules.is_empty() {
        dom.insert_inline_style(&rules, InsertPosition::BeforeEnd)?;
    }
    Ok(())
}

fn is_remote(target: &str) -> bool {
    target.contains("://") || target.starts_with("data:")
}

fn resolve(deck: &Deck, image: &ImageRef) -> PathBuf {
    let mut path = deck.input_folder.clone();
    if let Some(dir) = image.images_dir.as_deref().filter(|d| !d.is_empty()) {
        path.push(dir);
    }
    path.push(&image.target);
    path
}

fn unique_class(stem: &str, taken: &mut HashSet<String>) -> String {
    let base = css_class_name("img", stem);
    let mut class = base.clone();
    let mut n = 2;
    while !taken.insert(class.clone()) {
        class = format!("{base}-{n}");
        n += 1;
    }
    class
}

fn image_span(embedded: &EmbeddableImage, image: &ImageRef) -> String {
    let mut style = String::new();
    for (property, value) in [("width", &image.width), ("height", &image.height)] {
        if let Some(value) = value {
            let value = if value.chars().all(|c| c.is_ascii_digit()) {
                format!("{value}px")
            } else {
                value.clone()
            };
            style.push_str(&format!("{property}:{value};"));
        }
    }
    let style = if style.is_empty() {
        String::new()
    } else {
        format!(" style=\"{}\"", html_escape::encode_double_quoted_attribute(&style))
    };
    format!(
        "<span class=\"image {}\" role=\"img\" aria-label=\"{}\"{style}></span>",
        embedded.css_class,
        html_escape::encode_double_quoted_attribute(&image.alt)
    )
}
